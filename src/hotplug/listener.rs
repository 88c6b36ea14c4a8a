//! The hotplug poll loop

use super::enumerate::enumerate_existing;
use super::UeventSource;
use crate::cancel::CancelToken;
use crate::config::DetectConfig;
use crate::device::{parse_notification, DeviceInventory, HotplugAction};
use crate::error::DetectError;
use crate::keyboard::KeyDetect;
use crate::registry::TaskRegistry;
use log::{debug, error, info, warn};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Lifecycle of a [`HotplugListener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Channel not acquired (yet, or ever)
    Idle,
    /// Polling for notifications
    Listening,
    /// Stop observed, joining monitors
    Draining,
    /// All monitors joined
    Stopped,
}

/// Turns kernel hotplug notifications into registry updates.
///
/// Notifications are handled one at a time in delivery order on the thread
/// that calls [`run`](HotplugListener::run).
pub struct HotplugListener<I: DeviceInventory> {
    inventory: I,
    registry: Arc<TaskRegistry>,
    detector: Arc<dyn KeyDetect>,
    stop: CancelToken,
    poll_timeout: Duration,
    recv_buffer_size: usize,
    state: ListenerState,
}

impl<I: DeviceInventory> HotplugListener<I> {
    pub fn new(
        inventory: I,
        registry: Arc<TaskRegistry>,
        detector: Arc<dyn KeyDetect>,
        stop: CancelToken,
        config: &DetectConfig,
    ) -> Self {
        Self {
            inventory,
            registry,
            detector,
            stop,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
            recv_buffer_size: config.recv_buffer_size,
            state: ListenerState::Idle,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Seed the registry with keyboards already plugged in
    pub fn enumerate_existing(&self) -> usize {
        enumerate_existing(&self.inventory, &self.registry, &self.detector)
    }

    /// Apply one raw notification to the registry
    pub fn handle_notification(&self, buf: &[u8]) {
        let (action, id) = parse_notification(buf);
        if id.is_empty() {
            return;
        }

        match action {
            HotplugAction::Added => {
                if self.registry.exists(&id) {
                    debug!("event{} added but already monitored", id);
                    return;
                }
                if !self.inventory.is_keyboard(&id) {
                    debug!("event{} added, not a keyboard", id);
                    return;
                }
                if let Err(e) = self.registry.start(&id, &self.detector) {
                    warn!("{}", e);
                }
            }
            HotplugAction::Removed => {
                debug!("event{} removed", id);
                self.registry.stop(&id);
            }
            HotplugAction::Other => {}
        }
    }

    /// Open the channel with `open` and poll it until the stop token is
    /// cancelled, then close it and drain the registry.
    ///
    /// Failing to open the channel is the only error; the listener stays
    /// [`Idle`](ListenerState::Idle) and the registry is left untouched.
    pub fn run<S, F>(&mut self, open: F) -> Result<(), DetectError>
    where
        S: UeventSource,
        F: FnOnce() -> io::Result<S>,
    {
        let mut source = match open() {
            Ok(source) => source,
            Err(e) => {
                error!("Cannot open hotplug channel: {}", e);
                return Err(DetectError::Channel(e));
            }
        };

        self.state = ListenerState::Listening;
        info!("Listening for input hotplug events");

        let mut buf = vec![0u8; self.recv_buffer_size];
        while !self.stop.is_cancelled() {
            match source.recv_timeout(&mut buf, self.poll_timeout) {
                Ok(Some(n)) if n > 0 => self.handle_notification(&buf[..n]),
                Ok(_) => {}
                Err(e) => {
                    warn!("Hotplug receive failed: {}", e);
                    // Keep a persistent error from spinning the loop
                    thread::sleep(self.poll_timeout);
                }
            }
        }

        self.state = ListenerState::Draining;
        drop(source);
        info!("Hotplug listener stopping");
        self.registry.drain();
        self.state = ListenerState::Stopped;
        Ok(())
    }
}
