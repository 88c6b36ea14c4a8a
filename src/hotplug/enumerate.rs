//! Startup scan for keyboards that were plugged in before we started

use crate::device::{DeviceId, DeviceInventory};
use crate::keyboard::KeyDetect;
use crate::registry::TaskRegistry;
use log::{info, warn};
use std::sync::Arc;

/// Keyboard-capable devices currently present, in ascending index order.
///
/// An unreadable inventory is logged and treated as empty.
pub fn keyboard_devices(inventory: &impl DeviceInventory) -> Vec<DeviceId> {
    let mut devices = match inventory.list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            warn!("Cannot list input devices: {}", e);
            return Vec::new();
        }
    };
    devices.retain(|id| inventory.is_keyboard(id));
    devices.sort_by_key(|id| (id.index(), id.clone()));
    devices
}

/// Start a monitor for every keyboard already present. Returns how many
/// monitors were started.
pub fn enumerate_existing(
    inventory: &impl DeviceInventory,
    registry: &TaskRegistry,
    detector: &Arc<dyn KeyDetect>,
) -> usize {
    let mut started = 0;
    for id in keyboard_devices(inventory) {
        match registry.start(&id, detector) {
            Ok(true) => started += 1,
            Ok(false) => {}
            Err(e) => warn!("{}", e),
        }
    }
    info!("Found {} keyboard(s) at startup", started);
    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CapabilityBits, EV_KEY, EV_REL, EV_REP, EV_SYN};
    use std::collections::BTreeMap;
    use std::io;

    struct Fake(BTreeMap<&'static str, CapabilityBits>);

    impl DeviceInventory for Fake {
        fn list_devices(&self) -> io::Result<Vec<DeviceId>> {
            Ok(self.0.keys().map(|k| DeviceId::from(*k)).collect())
        }

        fn ev_capabilities(&self, id: &DeviceId) -> io::Result<CapabilityBits> {
            self.0
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    struct Broken;

    impl DeviceInventory for Broken {
        fn list_devices(&self) -> io::Result<Vec<DeviceId>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn ev_capabilities(&self, _id: &DeviceId) -> io::Result<CapabilityBits> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    #[test]
    fn keyboards_sorted_numerically() {
        let kbd = CapabilityBits::from_bits(&[EV_SYN, EV_KEY, EV_REP]);
        let mouse = CapabilityBits::from_bits(&[EV_SYN, EV_KEY, EV_REL]);
        let inventory = Fake(BTreeMap::from([
            ("10", kbd.clone()),
            ("2", kbd.clone()),
            ("3", mouse),
            ("9", kbd),
        ]));

        let ids = keyboard_devices(&inventory);
        assert_eq!(
            ids,
            vec![DeviceId::from("2"), DeviceId::from("9"), DeviceId::from("10")]
        );
    }

    #[test]
    fn broken_inventory_is_empty() {
        assert!(keyboard_devices(&Broken).is_empty());
    }
}
