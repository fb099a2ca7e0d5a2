//! Home screen summary.

use serde::{Deserialize, Serialize};

use crate::settings::{EmergencyApp, Settings, MAX_EMERGENCY_APPS};
use crate::stats::UsageStats;

pub const NO_EMERGENCY_APPS: &str = "No emergency apps configured";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub protection_status: String,
    pub pin_entries: u8,
    /// "n/3"
    pub emergency_app_slots: String,
    pub emergency_apps: Vec<EmergencyApp>,
    pub stats: UsageStats,
    pub can_simulate_unlock: bool,
    pub simulate_label: String,
}

impl DashboardSummary {
    pub fn new(settings: &Settings, stats: UsageStats) -> Self {
        let enabled = settings.is_enabled();
        Self {
            protection_status: if enabled { "Active" } else { "Disabled" }.to_string(),
            pin_entries: settings.pin_retries(),
            emergency_app_slots: format!(
                "{}/{}",
                settings.emergency_apps().len(),
                MAX_EMERGENCY_APPS
            ),
            emergency_apps: settings.emergency_apps().to_vec(),
            stats,
            can_simulate_unlock: enabled,
            simulate_label: if enabled {
                "Simulate Unlock Experience"
            } else {
                "Enable Protection First"
            }
            .to_string(),
        }
    }

    /// Comma-separated app list, or the empty-state message.
    pub fn emergency_apps_line(&self) -> String {
        if self.emergency_apps.is_empty() {
            return NO_EMERGENCY_APPS.to_string();
        }
        self.emergency_apps
            .iter()
            .map(|app| app.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_dashboard() {
        let summary = DashboardSummary::new(&Settings::default(), UsageStats::zeroed());
        assert_eq!(summary.protection_status, "Active");
        assert_eq!(summary.pin_entries, 3);
        assert_eq!(summary.emergency_app_slots, "3/3");
        assert_eq!(summary.emergency_apps_line(), "Phone, Messages, Emergency");
        assert!(summary.can_simulate_unlock);
        assert_eq!(summary.simulate_label, "Simulate Unlock Experience");
    }

    #[test]
    fn disabled_dashboard_without_apps() {
        let mut settings = Settings::default();
        settings.set_enabled(false);
        for app in settings.emergency_apps().to_vec() {
            settings.toggle_emergency_app(app).unwrap();
        }

        let summary = DashboardSummary::new(&settings, UsageStats::zeroed());
        assert_eq!(summary.protection_status, "Disabled");
        assert_eq!(summary.emergency_app_slots, "0/3");
        assert_eq!(summary.emergency_apps_line(), NO_EMERGENCY_APPS);
        assert!(!summary.can_simulate_unlock);
        assert_eq!(summary.simulate_label, "Enable Protection First");
    }
}
