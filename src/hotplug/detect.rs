//! Process-level entry point: startup scan, listener, degraded mode

use super::{HotplugListener, UeventSource};
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::device::DeviceInventory;
use crate::error::DetectError;
use crate::keyboard::KeyDetect;
use crate::registry::TaskRegistry;
use log::warn;
use std::io;
use std::sync::Arc;
use std::thread;

#[cfg(target_os = "linux")]
use super::UeventSocket;
#[cfg(target_os = "linux")]
use crate::device::SysfsInventory;

/// Detect keyboards and monitor each one until `stop` is cancelled.
///
/// Runs the startup scan over sysfs, then listens on the kernel uevent
/// socket on the calling thread. See [`detect_with`].
#[cfg(target_os = "linux")]
pub fn device_detect(
    detector: Arc<dyn KeyDetect>,
    config: &Config,
    stop: &CancelToken,
) -> Result<(), DetectError> {
    let inventory = SysfsInventory::new(&config.devices.class_dir);
    detect_with(inventory, UeventSocket::open, detector, config, stop)
}

/// [`device_detect`] over any inventory and notification channel.
///
/// If `open` fails, keyboards found at startup stay monitored until `stop`,
/// after which they are drained and the channel error is returned.
pub fn detect_with<I, S, F>(
    inventory: I,
    open: F,
    detector: Arc<dyn KeyDetect>,
    config: &Config,
    stop: &CancelToken,
) -> Result<(), DetectError>
where
    I: DeviceInventory,
    S: UeventSource,
    F: FnOnce() -> io::Result<S>,
{
    let registry = Arc::new(TaskRegistry::new(stop.clone()));
    let mut listener = HotplugListener::new(
        inventory,
        Arc::clone(&registry),
        detector,
        stop.clone(),
        &config.detect,
    );

    listener.enumerate_existing();

    let result = listener.run(open);
    if result.is_err() {
        warn!(
            "Hotplug detection disabled, keeping {} startup keyboard(s)",
            registry.len()
        );
        while !stop.is_cancelled() {
            thread::sleep(config.poll_timeout());
        }
        registry.drain();
    }
    result
}
