//! Keyboard hotplug detection
//!
//! Startup enumeration seeds the [`TaskRegistry`](crate::registry::TaskRegistry);
//! the [`HotplugListener`] then keeps it in step with kernel add/remove
//! notifications until stopped.

mod detect;
mod enumerate;
mod listener;
#[cfg(target_os = "linux")]
mod netlink;

pub use enumerate::{enumerate_existing, keyboard_devices};
pub use listener::{HotplugListener, ListenerState};
#[cfg(target_os = "linux")]
pub use detect::device_detect;
pub use detect::detect_with;
#[cfg(target_os = "linux")]
pub use netlink::UeventSocket;

use crate::cancel::CancelToken;
use std::io;
use std::time::Duration;

/// A channel delivering raw hotplug notifications
pub trait UeventSource {
    /// Wait up to `timeout` for one notification and copy it into `buf`.
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn recv_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>>;
}

/// Ask a running detector to wind down. Callable from any thread; the
/// listener notices on its next poll timeout.
pub fn stop_detect(stop: &CancelToken) {
    stop.cancel();
}
