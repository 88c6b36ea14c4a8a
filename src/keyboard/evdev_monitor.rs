//! evdev-backed key monitor for Linux
//!
//! Opens `/dev/input/eventN` non-blocking and waits on it with a bounded
//! timeout so the cancel token is checked between reads.

use super::{KeyDetect, KeyEvent, KeyEventType};
use crate::cancel::CancelToken;
use crate::device::DeviceId;
use evdev::{Device, EventType};
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags};
use std::collections::HashSet;
use std::io;
use std::os::unix::io::{AsRawFd, BorrowedFd};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Forwards key presses and releases of each monitored device over a channel
pub struct EvdevKeyMonitor {
    dev_dir: PathBuf,
    read_timeout: Duration,
    event_tx: mpsc::Sender<KeyEvent>,
}

impl EvdevKeyMonitor {
    pub fn new(
        dev_dir: impl Into<PathBuf>,
        read_timeout: Duration,
        event_tx: mpsc::Sender<KeyEvent>,
    ) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            read_timeout,
            event_tx,
        }
    }

    fn open(path: &Path) -> io::Result<Device> {
        let device = Device::open(path)?;
        let fd = device.as_raw_fd();
        let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
        fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
        Ok(device)
    }

    /// Wait until the device is readable or the timeout passes
    fn wait_readable(&self, device: &Device) -> nix::Result<bool> {
        // SAFETY: the fd is owned by `device`, which outlives this call
        let fd = unsafe { BorrowedFd::borrow_raw(device.as_raw_fd()) };
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        let timeout_ms = u16::try_from(self.read_timeout.as_millis()).unwrap_or(u16::MAX);
        Ok(poll(&mut fds, timeout_ms)? > 0)
    }
}

impl KeyDetect for EvdevKeyMonitor {
    fn detect(&self, device_id: &DeviceId, cancel: &CancelToken) {
        let path = device_id.devnode(&self.dev_dir);
        let mut device = match Self::open(&path) {
            Ok(device) => device,
            Err(e) => {
                warn!("Cannot open {}: {}", path.display(), e);
                return;
            }
        };
        info!(
            "Monitoring {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );

        let mut pressed: HashSet<u16> = HashSet::new();

        while !cancel.is_cancelled() {
            match self.wait_readable(&device) {
                Ok(true) => {}
                Ok(false) | Err(Errno::EINTR) => continue,
                Err(e) => {
                    warn!("Polling {} failed: {}", path.display(), e);
                    break;
                }
            }

            let events = match device.fetch_events() {
                Ok(events) => events,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => {
                    // ENODEV once the device is unplugged
                    debug!("Stopped reading {}: {}", path.display(), e);
                    break;
                }
            };

            let now = Instant::now();
            for event in events {
                if event.event_type() != EventType::KEY {
                    continue;
                }
                let code = event.code();
                let Some(event_type) = filter_key(&mut pressed, code, event.value()) else {
                    continue;
                };
                let _ = self
                    .event_tx
                    .send(KeyEvent::new(device_id.clone(), code, event_type, now));
            }
        }

        debug!("Monitor for {} exiting", path.display());
    }
}

/// Turn an `EV_KEY` value into a transition worth reporting.
///
/// Autorepeat is skipped, as are presses of keys already down and releases
/// of keys never seen pressed. `pressed` tracks the keys currently down.
fn filter_key(pressed: &mut HashSet<u16>, code: u16, value: i32) -> Option<KeyEventType> {
    let event_type = KeyEventType::from_value(value)?;
    let changed = match event_type {
        KeyEventType::Press => pressed.insert(code),
        KeyEventType::Release => pressed.remove(&code),
    };
    changed.then_some(event_type)
}
