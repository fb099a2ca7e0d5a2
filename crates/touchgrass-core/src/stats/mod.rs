//! Usage statistics.
//!
//! A single [`UsageStats`] record lives under [`STATS_KEY`]. Every
//! operation is load, modify, then write the whole record back; there are no
//! partial field updates, so the last successful write wins.

mod savings;

pub use savings::SavingsModel;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::Event;
use crate::storage::SharedStore;

pub const STATS_KEY: &str = "touchgrass_stats";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub unlock_attempts: u64,
    pub mindful_pauses: u64,
    /// Estimated minutes saved.
    pub time_saved: u64,
    pub last_updated: DateTime<Utc>,
}

impl UsageStats {
    /// The zeroed record, stamped now.
    pub fn zeroed() -> Self {
        Self {
            unlock_attempts: 0,
            mindful_pauses: 0,
            time_saved: 0,
            last_updated: Utc::now(),
        }
    }
}

impl Default for UsageStats {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// One completed pass through the pause screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockSession {
    pub timestamp: DateTime<Utc>,
    pub completed: bool,
    /// Seconds spent on the pause screen.
    pub pause_duration: u64,
}

/// Reads and writes the usage record in a preferences store.
#[derive(Clone)]
pub struct StatsService {
    store: SharedStore,
    model: SavingsModel,
}

impl StatsService {
    pub fn new(store: SharedStore, model: SavingsModel) -> Self {
        Self { store, model }
    }

    pub fn model(&self) -> &SavingsModel {
        &self.model
    }

    /// Current record. A missing, unreadable or corrupt record yields the
    /// zeroed record instead of an error.
    pub fn get_usage_stats(&self) -> UsageStats {
        let raw = match self.store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UsageStats::zeroed(),
            Err(e) => {
                tracing::warn!(error = %e, "error loading stats");
                return UsageStats::zeroed();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored stats are unreadable, starting from zero");
            UsageStats::zeroed()
        })
    }

    /// Replace the stored record with `stats`.
    ///
    /// # Errors
    /// Returns an error if serialization or the store write fails.
    pub fn save_usage_stats(&self, stats: &UsageStats) -> Result<(), CoreError> {
        let json = serde_json::to_string(stats)?;
        self.store.set(STATS_KEY, &json)?;
        tracing::debug!(
            unlock_attempts = stats.unlock_attempts,
            mindful_pauses = stats.mindful_pauses,
            time_saved = stats.time_saved,
            "stats saved"
        );
        Ok(())
    }

    /// Count one unlock.
    ///
    /// # Errors
    /// Returns an error if the updated record cannot be written.
    pub fn record_unlock_attempt(&self) -> Result<Event, CoreError> {
        let mut stats = self.get_usage_stats();
        stats.unlock_attempts = stats.unlock_attempts.saturating_add(1);
        stats.last_updated = Utc::now();
        self.save_usage_stats(&stats)?;

        Ok(Event::UnlockRecorded {
            unlock_attempts: stats.unlock_attempts,
            at: stats.last_updated,
        })
    }

    /// Count one completed pause and credit the estimated minutes saved.
    ///
    /// # Errors
    /// Returns an error if the updated record cannot be written.
    pub fn record_mindful_pause(&self, pause_duration_secs: u64) -> Result<Event, CoreError> {
        let mut stats = self.get_usage_stats();
        let minutes_saved = self.model.minutes_saved(pause_duration_secs);
        stats.mindful_pauses = stats.mindful_pauses.saturating_add(1);
        stats.time_saved = stats.time_saved.saturating_add(minutes_saved);
        stats.last_updated = Utc::now();
        self.save_usage_stats(&stats)?;

        tracing::info!(pause_duration_secs, minutes_saved, "mindful pause recorded");
        Ok(Event::MindfulPauseRecorded {
            pause_duration_secs,
            minutes_saved,
            total_time_saved: stats.time_saved,
            at: stats.last_updated,
        })
    }

    /// Record the pause of a finished session. Abandoned sessions only
    /// count as unlocks, which were recorded when the screen was shown.
    ///
    /// # Errors
    /// Returns an error if the updated record cannot be written.
    pub fn record_session(&self, session: &UnlockSession) -> Result<Option<Event>, CoreError> {
        if !session.completed {
            return Ok(None);
        }
        self.record_mindful_pause(session.pause_duration).map(Some)
    }

    /// Overwrite the record with zeros.
    ///
    /// # Errors
    /// Returns an error if the zeroed record cannot be written.
    pub fn reset_stats(&self) -> Result<Event, CoreError> {
        let stats = UsageStats::zeroed();
        self.save_usage_stats(&stats)?;
        Ok(Event::StatsReset {
            at: stats.last_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreferencesError;
    use crate::storage::{MemoryPreferences, PreferencesStore, StorageBackend};
    use std::sync::Arc;

    struct UnreadableStore;

    impl PreferencesStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PreferencesError> {
            Err(PreferencesError::Unavailable("keychain locked".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), PreferencesError> {
            Err(PreferencesError::Unavailable("keychain locked".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), PreferencesError> {
            Ok(())
        }

        fn backend(&self) -> StorageBackend {
            StorageBackend::Native
        }
    }

    fn service() -> (StatsService, SharedStore) {
        let store: SharedStore = Arc::new(MemoryPreferences::new());
        (StatsService::new(store.clone(), SavingsModel::default()), store)
    }

    #[test]
    fn empty_store_reads_zeroed_record() {
        let (stats, _) = service();
        let current = stats.get_usage_stats();
        assert_eq!(current.unlock_attempts, 0);
        assert_eq!(current.mindful_pauses, 0);
        assert_eq!(current.time_saved, 0);
    }

    #[test]
    fn unlock_attempts_accumulate() {
        let (stats, _) = service();
        stats.record_unlock_attempt().unwrap();
        let event = stats.record_unlock_attempt().unwrap();
        assert!(matches!(event, Event::UnlockRecorded { unlock_attempts: 2, .. }));
        assert_eq!(stats.get_usage_stats().unlock_attempts, 2);
    }

    #[test]
    fn mindful_pause_adds_flat_three_minutes_plus_pause() {
        let (stats, _) = service();
        stats.record_mindful_pause(0).unwrap();
        stats.record_mindful_pause(90).unwrap();
        let current = stats.get_usage_stats();
        assert_eq!(current.mindful_pauses, 2);
        // 0s -> round(3.0) = 3, 90s -> round(1.5 + 3.0) = 5
        assert_eq!(current.time_saved, 8);
        assert_eq!(current.unlock_attempts, 0);
    }

    #[test]
    fn pause_updates_timestamp() {
        let (stats, _) = service();
        let before = stats.get_usage_stats().last_updated;
        stats.record_mindful_pause(10).unwrap();
        assert!(stats.get_usage_stats().last_updated >= before);
    }

    #[test]
    fn reset_writes_zeroed_record() {
        let (stats, store) = service();
        stats.record_unlock_attempt().unwrap();
        stats.record_mindful_pause(30).unwrap();
        stats.reset_stats().unwrap();

        assert!(store.get(STATS_KEY).unwrap().is_some());
        let current = stats.get_usage_stats();
        assert_eq!(
            (current.unlock_attempts, current.mindful_pauses, current.time_saved),
            (0, 0, 0)
        );
    }

    #[test]
    fn corrupt_record_degrades_to_zero() {
        let (stats, store) = service();
        store.set(STATS_KEY, "{\"unlockAttempts\": \"many\"").unwrap();
        assert_eq!(stats.get_usage_stats().unlock_attempts, 0);

        stats.record_unlock_attempt().unwrap();
        assert_eq!(stats.get_usage_stats().unlock_attempts, 1);
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let (stats, store) = service();
        stats.record_unlock_attempt().unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["unlockAttempts"], 1);
        assert_eq!(raw["mindfulPauses"], 0);
        assert_eq!(raw["timeSaved"], 0);
        assert!(raw["lastUpdated"].is_string());
    }

    #[test]
    fn reads_record_written_by_mobile_build() {
        let (stats, store) = service();
        store
            .set(
                STATS_KEY,
                r#"{"unlockAttempts":12,"mindfulPauses":8,"timeSaved":24,"lastUpdated":"2024-05-01T09:30:00.000Z"}"#,
            )
            .unwrap();
        let current = stats.get_usage_stats();
        assert_eq!(current.unlock_attempts, 12);
        assert_eq!(current.mindful_pauses, 8);
        assert_eq!(current.time_saved, 24);
    }

    #[test]
    fn abandoned_session_is_not_a_pause() {
        let (stats, _) = service();
        let session = UnlockSession {
            timestamp: Utc::now(),
            completed: false,
            pause_duration: 40,
        };
        assert_eq!(stats.record_session(&session).unwrap(), None);
        assert_eq!(stats.get_usage_stats().mindful_pauses, 0);
    }

    #[test]
    fn store_read_failure_degrades_to_zero() {
        let stats = StatsService::new(Arc::new(UnreadableStore), SavingsModel::default());
        let current = stats.get_usage_stats();
        assert_eq!(
            (current.unlock_attempts, current.mindful_pauses, current.time_saved),
            (0, 0, 0)
        );
        assert!(stats.record_unlock_attempt().is_err());
    }

    #[test]
    fn saturated_counters_stay_at_max() {
        let (stats, store) = service();
        let max = u64::MAX;
        store
            .set(
                STATS_KEY,
                &format!(
                    r#"{{"unlockAttempts":{max},"mindfulPauses":{max},"timeSaved":{max},"lastUpdated":"2024-05-01T09:30:00Z"}}"#
                ),
            )
            .unwrap();

        stats.record_unlock_attempt().unwrap();
        let event = stats.record_mindful_pause(0).unwrap();
        assert!(matches!(
            event,
            Event::MindfulPauseRecorded { total_time_saved: u64::MAX, .. }
        ));

        let current = stats.get_usage_stats();
        assert_eq!(current.unlock_attempts, u64::MAX);
        assert_eq!(current.mindful_pauses, u64::MAX);
        assert_eq!(current.time_saved, u64::MAX);
    }
}
