//! Sources of device inventory and capability descriptors

use super::classify::{is_keyboard_caps, CapabilityBits};
use super::DeviceId;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where the detection core learns which input devices exist and what they
/// can do. Production uses [`SysfsInventory`]; tests substitute fakes.
pub trait DeviceInventory {
    /// All input event devices currently registered, in no particular order
    fn list_devices(&self) -> io::Result<Vec<DeviceId>>;

    /// Event-type capability bitmap of one device
    fn ev_capabilities(&self, id: &DeviceId) -> io::Result<CapabilityBits>;

    /// Best-effort keyboard test. Any failure to read or parse the
    /// descriptor means "not a keyboard".
    fn is_keyboard(&self, id: &DeviceId) -> bool {
        if id.is_empty() {
            return false;
        }
        match self.ev_capabilities(id) {
            Ok(caps) => is_keyboard_caps(&caps),
            Err(e) => {
                debug!("Cannot read capabilities of event{}: {}", id, e);
                false
            }
        }
    }
}

/// Reads `/sys/class/input` (or another directory with the same layout)
#[derive(Debug, Clone)]
pub struct SysfsInventory {
    class_dir: PathBuf,
}

impl SysfsInventory {
    pub fn new(class_dir: impl Into<PathBuf>) -> Self {
        Self {
            class_dir: class_dir.into(),
        }
    }

    pub fn class_dir(&self) -> &Path {
        &self.class_dir
    }

    fn ev_path(&self, id: &DeviceId) -> PathBuf {
        self.class_dir
            .join(id.node_name())
            .join("device/capabilities/ev")
    }
}

impl Default for SysfsInventory {
    fn default() -> Self {
        Self::new("/sys/class/input")
    }
}

impl DeviceInventory for SysfsInventory {
    fn list_devices(&self) -> io::Result<Vec<DeviceId>> {
        let mut devices = Vec::new();
        for entry in fs::read_dir(&self.class_dir)?.flatten() {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(DeviceId::from_node_name) {
                devices.push(id);
            }
        }
        Ok(devices)
    }

    fn ev_capabilities(&self, id: &DeviceId) -> io::Result<CapabilityBits> {
        let text = fs::read_to_string(self.ev_path(id))?;
        CapabilityBits::parse(&text).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed capability bitmap {:?}", text.trim()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_class_dir(tag: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("keysound-sysfs-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_device(class_dir: &Path, node: &str, ev: &str) {
        let caps = class_dir.join(node).join("device/capabilities");
        fs::create_dir_all(&caps).unwrap();
        fs::write(caps.join("ev"), format!("{}\n", ev)).unwrap();
    }

    #[test]
    fn lists_only_event_nodes() {
        let dir = temp_class_dir("list");
        add_device(&dir, "event0", "3");
        add_device(&dir, "event7", "120013");
        fs::create_dir_all(dir.join("input7")).unwrap();
        fs::create_dir_all(dir.join("mouse0")).unwrap();

        let inventory = SysfsInventory::new(&dir);
        let mut ids = inventory.list_devices().unwrap();
        ids.sort();
        assert_eq!(ids, vec![DeviceId::from("0"), DeviceId::from("7")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn classifies_from_ev_file() {
        let dir = temp_class_dir("classify");
        add_device(&dir, "event2", "120013");
        add_device(&dir, "event3", "17");
        add_device(&dir, "event4", "not hex");

        let inventory = SysfsInventory::new(&dir);
        assert!(inventory.is_keyboard(&DeviceId::from("2")));
        assert!(!inventory.is_keyboard(&DeviceId::from("3")));
        assert!(!inventory.is_keyboard(&DeviceId::from("4")));
        // No descriptor at all
        assert!(!inventory.is_keyboard(&DeviceId::from("9")));
        assert!(!inventory.is_keyboard(&DeviceId::default()));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_class_dir_is_an_error() {
        let inventory = SysfsInventory::new("/nonexistent/sys/class/input");
        assert!(inventory.list_devices().is_err());
    }
}
