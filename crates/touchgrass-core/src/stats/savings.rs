//! Time-saved estimate for a mindful pause.
//!
//! ```text
//! minutes = round(pause_secs / 60 + average_session_min * mindfulness_reduction)
//! ```
//!
//! With the defaults (10 minute sessions, 30% reduction) every pause is
//! credited a flat 3 minutes on top of the pause itself.

use serde::{Deserialize, Serialize};

use crate::storage::SavingsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsModel {
    pub average_session_min: f64,
    pub mindfulness_reduction: f64,
}

impl Default for SavingsModel {
    fn default() -> Self {
        Self {
            average_session_min: 10.0,
            mindfulness_reduction: 0.3,
        }
    }
}

impl From<&SavingsConfig> for SavingsModel {
    fn from(config: &SavingsConfig) -> Self {
        Self {
            average_session_min: config.average_session_min,
            mindfulness_reduction: config.mindfulness_reduction,
        }
    }
}

impl SavingsModel {
    /// Minutes credited for one pause, rounded half away from zero.
    pub fn minutes_saved(&self, pause_duration_secs: u64) -> u64 {
        let from_pause = pause_duration_secs as f64 / 60.0;
        let from_mindfulness = self.average_session_min * self.mindfulness_reduction;
        let total = (from_pause + from_mindfulness).round();
        if total.is_finite() && total > 0.0 {
            total as u64
        } else {
            0
        }
    }
}
