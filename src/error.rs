//! Error types for hotplug detection

use crate::device::DeviceId;
use std::io;
use thiserror::Error;

/// Errors surfaced by the detection core.
///
/// Per-notification problems (malformed payloads, unknown actions, unreadable
/// capability files) never become errors; they are dropped inside the loop.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The kernel hotplug channel could not be opened
    #[error("Failed to open hotplug channel: {0}")]
    Channel(#[source] io::Error),
    /// A monitoring thread could not be spawned
    #[error("Failed to spawn monitor for event{id}: {source}")]
    Spawn {
        id: DeviceId,
        #[source]
        source: io::Error,
    },
}
