//! keysound - keyboard hotplug detection for key-driven audio
//!
//! Finds the keyboards attached to a Linux machine, follows them as they are
//! plugged and unplugged, and keeps exactly one monitoring thread per
//! keyboard for as long as it is connected.

pub mod cancel;
pub mod config;
pub mod device;
pub mod error;
pub mod hotplug;
pub mod keyboard;
pub mod registry;

pub use cancel::CancelToken;
pub use config::Config;
pub use error::DetectError;
pub use registry::TaskRegistry;
