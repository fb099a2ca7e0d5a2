//! App lifecycle hook.
//!
//! The host (a mobile shell, or the CLI's `watch` command) forwards
//! foreground/background changes. Each activation while protection is on
//! counts as an unlock and fires the single registered callback, which is
//! expected to show the pause screen.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::events::Event;
use crate::settings::Settings;
use crate::stats::StatsService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateChange {
    pub is_active: bool,
}

type UnlockCallback = Box<dyn FnMut() + Send>;

pub struct UnlockMonitor {
    stats: StatsService,
    enabled: bool,
    on_unlock: Option<UnlockCallback>,
}

impl UnlockMonitor {
    pub fn new(stats: StatsService) -> Self {
        Self {
            stats,
            enabled: false,
            on_unlock: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.on_unlock.is_some()
    }

    /// Register the unlock callback. Only the first call takes effect;
    /// returns whether this call did.
    pub fn initialize<F>(&mut self, settings: &Settings, on_unlock: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_initialized() {
            return false;
        }
        self.enabled = settings.is_enabled();
        self.on_unlock = Some(Box::new(on_unlock));
        tracing::debug!(enabled = self.enabled, "unlock monitor initialized");
        true
    }

    /// Pick up a changed protection switch.
    pub fn update_settings(&mut self, settings: &Settings) {
        self.enabled = settings.is_enabled();
    }

    /// React to one lifecycle change. Returns the events produced; empty
    /// when the change was ignored.
    ///
    /// # Errors
    /// Returns an error if the unlock attempt cannot be recorded. The
    /// callback still runs in that case.
    pub fn handle_app_state_change(
        &mut self,
        change: AppStateChange,
    ) -> Result<Vec<Event>, CoreError> {
        if !change.is_active || !self.enabled {
            return Ok(Vec::new());
        }
        let Some(on_unlock) = self.on_unlock.as_mut() else {
            return Ok(Vec::new());
        };

        tracing::info!("app activated - triggering mindful pause");
        let recorded = self.stats.record_unlock_attempt();
        on_unlock();

        let unlock = recorded?;
        Ok(vec![Event::AppActivated { at: Utc::now() }, unlock])
    }

    /// Consume lifecycle changes until the sender side closes. Recording
    /// failures are logged and do not stop the loop. Returns how many
    /// activations triggered a pause.
    pub async fn run(mut self, mut changes: mpsc::Receiver<AppStateChange>) -> u64 {
        let mut triggered = 0;
        while let Some(change) = changes.recv().await {
            match self.handle_app_state_change(change) {
                Ok(events) if !events.is_empty() => triggered += 1,
                Ok(_) => {}
                Err(e) => {
                    triggered += 1;
                    tracing::error!(error = %e, "error recording unlock attempt");
                }
            }
        }
        triggered
    }
}
