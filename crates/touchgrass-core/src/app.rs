//! Top-level view routing.
//!
//! ```text
//! Onboarding --(finished)--> Dashboard <--> Settings
//!                               |  ^
//!            (simulate unlock)  v  |  (unlocked)
//!                              Locked
//! ```
//!
//! Onboarding wins until setup is complete; an active lock screen wins over
//! any route.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardSummary;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::lock::LockScreen;
use crate::onboarding::{self, Advance, Onboarding};
use crate::settings::Settings;
use crate::stats::{SavingsModel, StatsService, UnlockSession};
use crate::storage::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Onboarding,
    Locked,
    Dashboard,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Settings,
}

impl Route {
    /// Resolve a path; anything unknown lands on the dashboard.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/settings" | "/configure" | "settings" | "configure" => Route::Settings,
            _ => Route::Dashboard,
        }
    }
}

pub struct App {
    store: SharedStore,
    stats: StatsService,
    settings: Settings,
    setup_complete: bool,
    route: Route,
    lock: Option<LockScreen>,
}

impl App {
    /// Load settings and the setup flag from `store`.
    pub fn open(store: SharedStore, model: SavingsModel) -> Self {
        let settings = Settings::load(store.as_ref());
        let setup_complete = onboarding::is_complete(store.as_ref());
        Self {
            stats: StatsService::new(store.clone(), model),
            store,
            settings,
            setup_complete,
            route: Route::Dashboard,
            lock: None,
        }
    }

    pub fn view(&self) -> View {
        if !self.setup_complete {
            View::Onboarding
        } else if self.lock.is_some() {
            View::Locked
        } else {
            match self.route {
                Route::Dashboard => View::Dashboard,
                Route::Settings => View::Settings,
            }
        }
    }

    pub fn navigate(&mut self, path: &str) -> View {
        self.route = Route::from_path(path);
        self.view()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    /// Press the primary onboarding button.
    ///
    /// # Errors
    /// Returns an error if finishing fails to persist.
    pub fn advance_onboarding(&mut self, flow: &mut Onboarding) -> Result<Advance, CoreError> {
        let advance = flow.next(&mut self.settings, self.store.as_ref())?;
        if matches!(advance, Advance::Completed(_)) {
            self.setup_complete = true;
            self.route = Route::Dashboard;
        }
        Ok(advance)
    }

    /// Apply a change to the settings and persist it immediately. Nothing
    /// is saved if `change` fails.
    ///
    /// # Errors
    /// Returns the validation error from `change` or a store error.
    pub fn update_settings<F>(&mut self, field: &str, change: F) -> Result<Event, CoreError>
    where
        F: FnOnce(&mut Settings) -> Result<(), ValidationError>,
    {
        let mut updated = self.settings.clone();
        change(&mut updated)?;
        updated.save(self.store.as_ref())?;
        self.settings = updated;
        Ok(Event::SettingsChanged {
            field: field.to_string(),
            at: Utc::now(),
        })
    }

    /// # Errors
    /// Returns an error if the defaults cannot be saved.
    pub fn reset_settings(&mut self) -> Result<Event, CoreError> {
        self.update_settings("all", |settings| {
            settings.reset_to_defaults();
            Ok(())
        })
    }

    /// Show the pause screen without counting an unlock (the lifecycle
    /// monitor already did).
    pub fn engage_lock(&mut self) -> Option<Event> {
        if !self.settings.is_enabled() {
            return None;
        }
        let lock = self.lock.get_or_insert_with(|| LockScreen::new(&self.settings));
        Some(lock.engaged_event())
    }

    /// The dashboard's "simulate unlock" button: count an unlock and show
    /// the pause screen. Does nothing while protection is disabled.
    ///
    /// # Errors
    /// Returns an error if the unlock attempt cannot be recorded.
    pub fn simulate_unlock(&mut self) -> Result<Vec<Event>, CoreError> {
        if !self.settings.is_enabled() {
            return Ok(Vec::new());
        }
        let recorded = self.stats.record_unlock_attempt()?;
        let mut events = vec![recorded];
        events.extend(self.engage_lock());
        Ok(events)
    }

    pub fn lock_screen(&self) -> Option<&LockScreen> {
        self.lock.as_ref()
    }

    pub fn lock_screen_mut(&mut self) -> Option<&mut LockScreen> {
        self.lock.as_mut()
    }

    /// Close an unlocked pause screen, crediting the pause. Returns `None`
    /// while the screen is still locked (or absent).
    ///
    /// # Errors
    /// Returns an error if the pause cannot be recorded; the screen is
    /// closed regardless.
    pub fn handle_unlock(&mut self) -> Result<Option<Event>, CoreError> {
        let Some(session) = self.lock.as_ref().and_then(LockScreen::session) else {
            return Ok(None);
        };
        self.lock = None;
        self.stats.record_session(&session)
    }

    /// Open an emergency app from the pause screen. The screen stays up and
    /// still needs the PIN afterwards.
    ///
    /// # Errors
    /// Fails when no screen is shown or the app is not configured.
    pub fn open_emergency_app(
        &self,
        app: crate::settings::EmergencyApp,
    ) -> Result<Event, CoreError> {
        let lock = self
            .lock
            .as_ref()
            .ok_or_else(|| ValidationError::InvalidState("pause screen is not shown".into()))?;
        Ok(lock.launch_emergency_app(app)?)
    }

    /// Close the pause screen without finishing it. The unlock stays
    /// counted but no pause is credited.
    pub fn abandon_lock(&mut self) -> Option<UnlockSession> {
        let session = self.lock.take()?.abandon();
        tracing::debug!(pause_duration = session.pause_duration, "pause abandoned");
        Some(session)
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::new(&self.settings, self.stats.get_usage_stats())
    }
}
