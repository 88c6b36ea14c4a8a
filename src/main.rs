//! keysound - monitor every keyboard on the machine
//!
//! Runs until Ctrl+C. Key events are logged at info level; set `RUST_LOG`
//! to adjust verbosity. `--list-devices` prints the keyboards currently
//! present and exits.

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    linux::run()
}

#[cfg(not(target_os = "linux"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("keysound requires Linux input devices")
}

#[cfg(target_os = "linux")]
mod linux {
    use anyhow::{Context, Result};
    use keysound::{
        device::SysfsInventory,
        hotplug::{device_detect, keyboard_devices, stop_detect},
        keyboard::{EvdevKeyMonitor, KeyDetect, KeyEvent, KeyEventType},
        CancelToken, Config, DetectError,
    };
    use log::{info, warn};
    use std::{sync::mpsc, sync::Arc, thread};

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let config = Config::load().context("Failed to load config")?;

        if std::env::args().skip(1).any(|a| a == "--list-devices") {
            let inventory = SysfsInventory::new(&config.devices.class_dir);
            for id in keyboard_devices(&inventory) {
                println!("{}", id.devnode(&config.devices.dev_dir).display());
            }
            return Ok(());
        }

        let stop = CancelToken::new();
        {
            let stop = stop.clone();
            ctrlc::set_handler(move || stop_detect(&stop))
                .context("Failed to install Ctrl+C handler")?;
        }

        // Create key event channel
        let (event_tx, event_rx) = mpsc::channel::<KeyEvent>();
        let detector: Arc<dyn KeyDetect> = Arc::new(EvdevKeyMonitor::new(
            &config.devices.dev_dir,
            config.read_timeout(),
            event_tx,
        ));

        let hotplug = {
            let config = config.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("hotplug".to_string())
                .spawn(move || device_detect(detector, &config, &stop))
                .context("Failed to spawn hotplug thread")?
        };

        // Ends once the detector, and with it every sender, is dropped
        for event in event_rx {
            let verb = match event.event_type {
                KeyEventType::Press => "down",
                KeyEventType::Release => "up",
            };
            info!("event{}: key {} {}", event.device, event.code, verb);
        }

        match hotplug.join() {
            Ok(Ok(())) => {}
            Ok(Err(e @ DetectError::Channel(_))) => warn!("{}", e),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => anyhow::bail!("hotplug thread panicked"),
        }

        info!("keysound stopped");
        Ok(())
    }
}
