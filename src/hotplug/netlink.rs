//! Kernel uevent channel over a `NETLINK_KOBJECT_UEVENT` socket

use super::UeventSource;
use log::debug;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::socket::{
    bind, recv, socket, AddressFamily, MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType,
};
use std::io;
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::time::Duration;

/// Multicast group the kernel broadcasts raw uevents on
const KERNEL_UEVENT_GROUP: u32 = 1;

/// Raw kernel hotplug socket. Closed on drop.
pub struct UeventSocket {
    fd: OwnedFd,
}

impl UeventSocket {
    /// Open and bind the socket. Port id 0 lets the kernel assign one.
    pub fn open() -> io::Result<Self> {
        let fd = socket(
            AddressFamily::Netlink,
            SockType::Raw,
            SockFlag::SOCK_CLOEXEC,
            SockProtocol::NetlinkKObjectUEvent,
        )?;
        bind(fd.as_raw_fd(), &NetlinkAddr::new(0, KERNEL_UEVENT_GROUP))?;
        debug!("Kernel uevent socket bound (fd {})", fd.as_raw_fd());
        Ok(Self { fd })
    }
}

impl UeventSource for UeventSocket {
    fn recv_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        let mut fds = [PollFd::new(self.fd.as_fd(), PollFlags::POLLIN)];
        let timeout_ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);

        match poll(&mut fds, timeout_ms) {
            Ok(0) | Err(Errno::EINTR) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }

        if !has_events(fds[0].revents()) {
            return Ok(None);
        }

        match recv(self.fd.as_raw_fd(), buf, MsgFlags::MSG_DONTWAIT) {
            Ok(n) => Ok(Some(n)),
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Any reported condition, including POLLERR alone, needs a `recv` to
/// consume the datagram or clear the pending socket error.
fn has_events(revents: Option<PollFlags>) -> bool {
    revents.is_some_and(|r| !r.is_empty())
}
