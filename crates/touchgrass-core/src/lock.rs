//! The mindful pause screen.
//!
//! ## State Transitions
//!
//! ```text
//! Locked --(correct PIN, entries_left > 1)--> Locked (entries_left - 1)
//! Locked --(wrong PIN)--------------------> Locked (error shown)
//! Locked --(correct PIN, last entry)------> Unlocked
//! Locked --(continue, no PIN required)----> Unlocked
//! ```
//!
//! Digits are buffered up to [`PIN_LENGTH`]; the fourth digit submits the
//! entry automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::settings::{EmergencyApp, Settings, PIN_LENGTH};
use crate::stats::UnlockSession;

pub const TITLE: &str = "Take a mindful moment";
pub const INCORRECT_PIN_MESSAGE: &str = "Incorrect PIN. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone)]
pub struct LockScreen {
    settings: Settings,
    entries_left: u8,
    input: String,
    show_error: bool,
    state: LockState,
    shown_at: DateTime<Utc>,
    unlocked_at: Option<DateTime<Utc>>,
}

impl LockScreen {
    /// Show the pause screen for the given settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            entries_left: settings.pin_retries(),
            input: String::with_capacity(PIN_LENGTH),
            show_error: false,
            state: LockState::Locked,
            shown_at: Utc::now(),
            unlocked_at: None,
        }
    }

    /// Backdate when the screen was shown.
    pub fn shown_at(mut self, at: DateTime<Utc>) -> Self {
        self.shown_at = at;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == LockState::Unlocked
    }

    pub fn entries_required(&self) -> u8 {
        self.settings.pin_retries()
    }

    pub fn entries_left(&self) -> u8 {
        self.entries_left
    }

    /// Number of buffered digits (the filled dots).
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn show_error(&self) -> bool {
        self.show_error
    }

    pub fn emergency_apps(&self) -> &[EmergencyApp] {
        self.settings.emergency_apps()
    }

    /// Whether the screen can be dismissed without a PIN.
    pub fn pin_required(&self) -> bool {
        self.entries_required() > 0
    }

    pub fn prompt(&self) -> String {
        match self.entries_left {
            0 => "Breathe, then continue when you're ready".to_string(),
            1 => "Enter your PIN 1 more time to continue".to_string(),
            n => format!("Enter your PIN {n} more times to continue"),
        }
    }

    /// Event announcing the screen.
    pub fn engaged_event(&self) -> Event {
        Event::LockEngaged {
            entries_required: self.entries_required(),
            at: self.shown_at,
        }
    }

    /// Whole seconds spent on the screen so far (or until unlock).
    pub fn pause_duration_secs(&self) -> u64 {
        let end = self.unlocked_at.unwrap_or_else(Utc::now);
        u64::try_from((end - self.shown_at).num_seconds()).unwrap_or(0)
    }

    /// The finished session, once unlocked.
    pub fn session(&self) -> Option<UnlockSession> {
        let unlocked_at = self.unlocked_at?;
        Some(UnlockSession {
            timestamp: unlocked_at,
            completed: true,
            pause_duration: self.pause_duration_secs(),
        })
    }

    /// The session as abandoned (the user walked away from the screen).
    pub fn abandon(&self) -> UnlockSession {
        UnlockSession {
            timestamp: Utc::now(),
            completed: false,
            pause_duration: self.pause_duration_secs(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Buffer one keypad digit. The fourth digit submits the entry.
    ///
    /// Returns `None` while buffering (or when the buffer is already full).
    ///
    /// # Errors
    /// Rejects non-digits and input after unlock.
    pub fn press_digit(&mut self, key: char) -> Result<Option<Event>, ValidationError> {
        self.ensure_locked()?;
        if !key.is_ascii_digit() {
            return Err(ValidationError::NotADigit(key));
        }
        if self.input.len() >= PIN_LENGTH {
            return Ok(None);
        }

        self.input.push(key);
        if self.input.len() == PIN_LENGTH {
            return Ok(Some(self.submit()));
        }
        Ok(None)
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Enter a whole PIN at once, discarding any buffered digits.
    ///
    /// # Errors
    /// Rejects anything but exactly four digits; state is then unchanged
    /// apart from the cleared buffer.
    pub fn enter_pin(&mut self, pin: &str) -> Result<Event, ValidationError> {
        self.ensure_locked()?;
        self.input.clear();
        if pin.len() != PIN_LENGTH {
            return Err(ValidationError::MalformedPin);
        }
        if let Some(bad) = pin.chars().find(|c| !c.is_ascii_digit()) {
            return Err(ValidationError::NotADigit(bad));
        }

        let mut last = None;
        for key in pin.chars() {
            last = self.press_digit(key)?;
        }
        last.ok_or(ValidationError::MalformedPin)
    }

    /// Dismiss the pause when no PIN entries are configured.
    ///
    /// # Errors
    /// Fails while PIN entries are still required.
    pub fn continue_without_pin(&mut self) -> Result<Event, ValidationError> {
        self.ensure_locked()?;
        if self.pin_required() {
            return Err(ValidationError::InvalidState(format!(
                "{} PIN entries still required",
                self.entries_left
            )));
        }
        Ok(self.unlock())
    }

    /// Hand off to one of the configured emergency apps.
    ///
    /// # Errors
    /// Fails for apps that are not configured.
    pub fn launch_emergency_app(&self, app: EmergencyApp) -> Result<Event, ValidationError> {
        if !self.settings.is_selected(app) {
            return Err(ValidationError::NotAnEmergencyApp(app.to_string()));
        }
        tracing::info!(%app, "opening emergency app");
        Ok(Event::EmergencyAppLaunched {
            app,
            at: Utc::now(),
        })
    }

    fn ensure_locked(&self) -> Result<(), ValidationError> {
        if self.is_unlocked() {
            return Err(ValidationError::InvalidState("screen already unlocked".into()));
        }
        Ok(())
    }

    fn submit(&mut self) -> Event {
        let accepted = self.settings.verify_pin(&self.input);
        self.input.clear();

        if !accepted {
            self.show_error = true;
            tracing::debug!(entries_left = self.entries_left, "PIN rejected");
            return Event::PinRejected {
                entries_left: self.entries_left,
                at: Utc::now(),
            };
        }

        self.show_error = false;
        self.entries_left = self.entries_left.saturating_sub(1);
        if self.entries_left == 0 {
            return self.unlock();
        }
        Event::PinAccepted {
            entries_left: self.entries_left,
            at: Utc::now(),
        }
    }

    fn unlock(&mut self) -> Event {
        let now = Utc::now();
        self.state = LockState::Unlocked;
        self.unlocked_at = Some(now);
        self.input.clear();
        let pause_duration_secs = self.pause_duration_secs();
        tracing::info!(pause_duration_secs, "unlocked after mindful pause");
        Event::Unlocked {
            pause_duration_secs,
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn screen(retries: u8) -> LockScreen {
        let mut settings = Settings::default();
        settings.set_pin_retries(retries).unwrap();
        LockScreen::new(&settings)
    }

    fn type_pin(lock: &mut LockScreen, pin: &str) -> Option<Event> {
        let mut last = None;
        for key in pin.chars() {
            last = lock.press_digit(key).unwrap();
        }
        last
    }

    #[test]
    fn three_correct_entries_unlock() {
        let mut lock = screen(3);
        assert_eq!(lock.prompt(), "Enter your PIN 3 more times to continue");

        assert!(matches!(
            type_pin(&mut lock, "1234"),
            Some(Event::PinAccepted { entries_left: 2, .. })
        ));
        assert!(matches!(
            type_pin(&mut lock, "1234"),
            Some(Event::PinAccepted { entries_left: 1, .. })
        ));
        assert_eq!(lock.prompt(), "Enter your PIN 1 more time to continue");
        assert!(matches!(type_pin(&mut lock, "1234"), Some(Event::Unlocked { .. })));
        assert!(lock.is_unlocked());
        assert!(lock.session().is_some());
    }

    #[test]
    fn wrong_pin_keeps_count_and_shows_error() {
        let mut lock = screen(2);
        assert!(matches!(
            type_pin(&mut lock, "9999"),
            Some(Event::PinRejected { entries_left: 2, .. })
        ));
        assert!(lock.show_error());
        assert_eq!(lock.input_len(), 0);
        assert_eq!(lock.entries_left(), 2);

        type_pin(&mut lock, "1234");
        assert!(!lock.show_error());
        assert_eq!(lock.entries_left(), 1);
    }

    #[test]
    fn buffer_caps_at_four_and_backspace_drops_last() {
        let mut lock = screen(3);
        lock.press_digit('1').unwrap();
        lock.press_digit('2').unwrap();
        lock.press_digit('9').unwrap();
        assert_eq!(lock.input_len(), 3);
        lock.backspace();
        assert_eq!(lock.input_len(), 2);
        lock.press_digit('3').unwrap();
        assert!(matches!(
            lock.press_digit('4').unwrap(),
            Some(Event::PinAccepted { .. })
        ));
        lock.backspace();
        assert_eq!(lock.input_len(), 0);
    }

    #[test]
    fn non_digit_is_rejected() {
        let mut lock = screen(1);
        assert_eq!(lock.press_digit('x'), Err(ValidationError::NotADigit('x')));
        assert_eq!(lock.input_len(), 0);
    }

    #[test]
    fn enter_pin_validates_shape() {
        let mut lock = screen(1);
        lock.press_digit('5').unwrap();
        assert_eq!(lock.enter_pin("12"), Err(ValidationError::MalformedPin));
        assert_eq!(lock.input_len(), 0);
        assert_eq!(lock.enter_pin("12a4"), Err(ValidationError::NotADigit('a')));
        assert!(matches!(lock.enter_pin("1234"), Ok(Event::Unlocked { .. })));
        assert!(lock.enter_pin("1234").is_err());
    }

    #[test]
    fn zero_retries_keeps_pause_without_pin() {
        let mut lock = screen(0);
        assert!(!lock.pin_required());
        assert_eq!(lock.prompt(), "Breathe, then continue when you're ready");
        assert!(matches!(lock.continue_without_pin(), Ok(Event::Unlocked { .. })));
    }

    #[test]
    fn continue_refused_while_pin_required() {
        let mut lock = screen(2);
        assert!(matches!(
            lock.continue_without_pin(),
            Err(ValidationError::InvalidState(_))
        ));
        assert!(!lock.is_unlocked());
    }

    #[test]
    fn pause_duration_measured_from_shown_at() {
        let mut lock = screen(1).shown_at(Utc::now() - Duration::seconds(45));
        lock.enter_pin("1234").unwrap();
        let session = lock.session().unwrap();
        assert!(session.completed);
        assert!((45..=47).contains(&session.pause_duration));
    }

    #[test]
    fn only_configured_emergency_apps_launch() {
        let lock = screen(3);
        assert!(matches!(
            lock.launch_emergency_app(EmergencyApp::Phone),
            Ok(Event::EmergencyAppLaunched { app: EmergencyApp::Phone, .. })
        ));
        assert_eq!(
            lock.launch_emergency_app(EmergencyApp::Camera),
            Err(ValidationError::NotAnEmergencyApp("Camera".into()))
        );
    }

    #[test]
    fn abandoned_session_is_incomplete() {
        let lock = screen(3);
        assert!(lock.session().is_none());
        assert!(!lock.abandon().completed);
    }
}
