//! Key events forwarded by device monitors

use crate::device::DeviceId;
use std::time::Instant;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

impl KeyEventType {
    /// Map an `EV_KEY` value. Autorepeat (2) yields `None`.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyEventType::Release),
            1 => Some(KeyEventType::Press),
            _ => None,
        }
    }
}

/// A key transition read from one device
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Device the key belongs to
    pub device: DeviceId,
    /// Linux key code (`KEY_*`)
    pub code: u16,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// When the event was read
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(device: DeviceId, code: u16, event_type: KeyEventType, timestamp: Instant) -> Self {
        Self {
            device,
            code,
            event_type,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_values() {
        assert_eq!(KeyEventType::from_value(0), Some(KeyEventType::Release));
        assert_eq!(KeyEventType::from_value(1), Some(KeyEventType::Press));
        assert_eq!(KeyEventType::from_value(2), None);
    }
}
