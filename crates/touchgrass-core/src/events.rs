use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::EmergencyApp;

/// Every state change in the system produces an Event.
/// The CLI prints them; a GUI shell would render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The app came to the foreground with protection enabled.
    AppActivated {
        at: DateTime<Utc>,
    },
    UnlockRecorded {
        unlock_attempts: u64,
        at: DateTime<Utc>,
    },
    MindfulPauseRecorded {
        pause_duration_secs: u64,
        minutes_saved: u64,
        total_time_saved: u64,
        at: DateTime<Utc>,
    },
    StatsReset {
        at: DateTime<Utc>,
    },
    /// The pause screen was shown.
    LockEngaged {
        entries_required: u8,
        at: DateTime<Utc>,
    },
    PinAccepted {
        entries_left: u8,
        at: DateTime<Utc>,
    },
    PinRejected {
        entries_left: u8,
        at: DateTime<Utc>,
    },
    Unlocked {
        pause_duration_secs: u64,
        at: DateTime<Utc>,
    },
    EmergencyAppLaunched {
        app: EmergencyApp,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        field: String,
        at: DateTime<Utc>,
    },
    PinChanged {
        at: DateTime<Utc>,
    },
    OnboardingCompleted {
        pin_retries: u8,
        at: DateTime<Utc>,
    },
}
