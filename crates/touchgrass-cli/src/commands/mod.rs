pub mod config;
pub mod dashboard;
pub mod device;
pub mod lock;
pub mod onboarding;
pub mod settings;
pub mod stats;
pub mod watch;

use std::sync::Arc;

use touchgrass_core::platform::{get_device_info, SystemDeviceInfo};
use touchgrass_core::storage::{open_preferences, MemoryPreferences};
use touchgrass_core::{App, Config, DeviceInfo, Event, SavingsModel, SharedStore, StatsService};

/// Everything a command needs: configuration, device and the opened store.
pub struct Context {
    pub config: Config,
    pub device: Option<DeviceInfo>,
    pub store: SharedStore,
}

impl Context {
    pub fn open(config: Config, ephemeral: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let device = get_device_info(&SystemDeviceInfo);
        let store: SharedStore = if ephemeral {
            Arc::new(MemoryPreferences::new())
        } else {
            open_preferences(&config.storage, device.as_ref())?
        };
        tracing::debug!(backend = %store.backend(), "preferences opened");
        Ok(Self {
            config,
            device,
            store,
        })
    }

    pub fn model(&self) -> SavingsModel {
        SavingsModel::from(&self.config.savings)
    }

    pub fn app(&self) -> App {
        App::open(self.store.clone(), self.model())
    }

    pub fn stats(&self) -> StatsService {
        StatsService::new(self.store.clone(), self.model())
    }
}

/// Print an event as one JSON line.
pub fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
