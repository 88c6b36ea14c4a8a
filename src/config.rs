//! Configuration management for keysound
//!
//! Configuration is read from a platform-specific config file and falls back
//! to defaults when the file does not exist.
//!
//! ## Config File Location
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keysound/config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keysound::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Modify settings
//! config.detect.poll_timeout_ms = 50;
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Smallest receive buffer that still holds a uevent header
pub const MIN_RECV_BUFFER_SIZE: usize = 64;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("keysound");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hotplug listener settings
    #[serde(default)]
    pub detect: DetectConfig,
    /// Device inventory locations
    #[serde(default)]
    pub devices: DevicesConfig,
    /// Per-device monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Hotplug listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// How long one poll of the hotplug channel may block, in milliseconds.
    /// Bounds shutdown latency.
    pub poll_timeout_ms: u64,
    /// Receive buffer for one kernel notification. Longer datagrams are
    /// truncated, which is harmless since the header comes first.
    pub recv_buffer_size: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 100,
            recv_buffer_size: 512,
        }
    }
}

/// Device inventory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// sysfs input class directory
    pub class_dir: PathBuf,
    /// Directory holding the `eventN` character devices
    pub dev_dir: PathBuf,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            class_dir: PathBuf::from("/sys/class/input"),
            dev_dir: PathBuf::from("/dev/input"),
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Upper bound on one blocking device read, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or validated.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the listener and monitors cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detect.poll_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "detect.poll_timeout_ms must be positive".to_string(),
            ));
        }
        if self.detect.recv_buffer_size < MIN_RECV_BUFFER_SIZE {
            return Err(ConfigError::Invalid(format!(
                "detect.recv_buffer_size must be at least {}",
                MIN_RECV_BUFFER_SIZE
            )));
        }
        if self.monitor.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "monitor.read_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Hotplug poll timeout as Duration
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.detect.poll_timeout_ms)
    }

    /// Device read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.monitor.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path() -> PathBuf {
        env::temp_dir().join(format!("keysound-test-{}.toml", std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.detect.poll_timeout_ms, 100);
        assert_eq!(config.detect.recv_buffer_size, 512);
        assert_eq!(config.devices.class_dir, PathBuf::from("/sys/class/input"));
        assert_eq!(config.devices.dev_dir, PathBuf::from("/dev/input"));
        assert_eq!(config.monitor.read_timeout_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_timeouts() {
        let mut config = Config::default();
        config.detect.poll_timeout_ms = 250;
        assert_eq!(config.poll_timeout(), Duration::from_millis(250));
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path();

        let mut config = Config::default();
        config.detect.poll_timeout_ms = 40;
        config.devices.class_dir = PathBuf::from("/tmp/fake-sysfs");

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");

        assert_eq!(loaded.detect.poll_timeout_ms, 40);
        assert_eq!(loaded.devices.class_dir, PathBuf::from("/tmp/fake-sysfs"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_error() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[detect]\npoll_timeout_ms = 20\nrecv_buffer_size = 1024\n")
            .expect("Failed to deserialize");
        assert_eq!(config.detect.poll_timeout_ms, 20);
        assert_eq!(config.detect.recv_buffer_size, 1024);
        assert_eq!(config.monitor.read_timeout_ms, 100);
        assert_eq!(config.devices.dev_dir, PathBuf::from("/dev/input"));
    }

    #[test]
    fn config_partial_section_fills_missing_fields() {
        let config: Config = toml::from_str(
            "[detect]\npoll_timeout_ms = 50\n\n[devices]\ndev_dir = \"/tmp/input\"\n",
        )
        .expect("Failed to deserialize");
        assert_eq!(config.detect.poll_timeout_ms, 50);
        assert_eq!(config.detect.recv_buffer_size, 512);
        assert_eq!(config.devices.dev_dir, PathBuf::from("/tmp/input"));
        assert_eq!(config.devices.class_dir, PathBuf::from("/sys/class/input"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let mut config = Config::default();
        config.detect.poll_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_rejects_tiny_buffer() {
        let mut config = Config::default();
        config.detect.recv_buffer_size = 16;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("recv_buffer_size"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");

        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }
}
