//! Per-device key monitoring
//!
//! The detection core only spawns and cancels monitors; what a monitor does
//! with the keys it reads is up to the [`KeyDetect`] implementation.

mod event;
#[cfg(target_os = "linux")]
mod evdev_monitor;

pub use event::{KeyEvent, KeyEventType};
#[cfg(target_os = "linux")]
pub use evdev_monitor::EvdevKeyMonitor;

use crate::cancel::CancelToken;
use crate::device::DeviceId;

/// Body of a monitoring task, run on its own thread for one device.
///
/// Implementations must check `cancel` between blocking reads; a monitor that
/// never returns holds up registry drain and process shutdown.
pub trait KeyDetect: Send + Sync + 'static {
    fn detect(&self, device: &DeviceId, cancel: &CancelToken);
}
