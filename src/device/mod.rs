//! Input device identity, hotplug payload parsing and classification

mod classify;
mod inventory;
mod uevent;

pub use classify::{
    is_keyboard_caps, CapabilityBits, EV_ABS, EV_KEY, EV_LED, EV_MSC, EV_REL, EV_REP, EV_SYN,
};
pub use inventory::{DeviceInventory, SysfsInventory};
pub use uevent::{extract_event_id, parse_notification, HotplugAction};

use std::fmt;
use std::path::{Path, PathBuf};

/// Kernel event index of an input device (`"3"` for `/dev/input/event3`).
///
/// Only meaningful while the device stays plugged in; the kernel may hand the
/// same index to a different device later. An empty id means "no device".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Node name shared by sysfs and devtmpfs, e.g. `event3`
    pub fn node_name(&self) -> String {
        format!("event{}", self.0)
    }

    /// Character device path under `dev_dir`
    pub fn devnode(&self, dev_dir: &Path) -> PathBuf {
        dev_dir.join(self.node_name())
    }

    /// Numeric index, used for stable ordering of enumerated devices
    pub fn index(&self) -> Option<u32> {
        self.0.parse().ok()
    }

    /// Parse a node name such as `event12` into its id
    pub fn from_node_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix("event")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self::new(digits))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
