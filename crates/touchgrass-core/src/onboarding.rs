//! First-run walkthrough.
//!
//! This module provides:
//! - The three onboarding steps and their copy
//! - Forward/back navigation with a "Get Started" finish
//! - An initial PIN entry count picked on the last step
//! - The persisted setup-complete flag

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::settings::Settings;
use crate::storage::PreferencesStore;

pub const SETUP_KEY: &str = "touchgrass-setup";
/// Entry counts offered during onboarding; the full 0..=10 range lives in
/// settings.
pub const ONBOARDING_RETRY_CHOICES: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    Permissions,
    Configure,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 3] = [
        OnboardingStep::Welcome,
        OnboardingStep::Permissions,
        OnboardingStep::Configure,
    ];

    pub fn title(self) -> &'static str {
        match self {
            OnboardingStep::Welcome => "Welcome to TouchGrass",
            OnboardingStep::Permissions => "Permissions Required",
            OnboardingStep::Configure => "Configure Your Experience",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OnboardingStep::Welcome => {
                "Take control of your phone usage with mindful unlock prompts"
            }
            OnboardingStep::Permissions => "We need these permissions to help you stay mindful",
            OnboardingStep::Configure => "Customize how TouchGrass works for you",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            OnboardingStep::Welcome => {
                "TouchGrass helps you break the habit of mindless phone checking by adding \
                 intentional friction to your unlock process."
            }
            OnboardingStep::Permissions => {
                "Device administration shows the pause after unlock; usage access counts \
                 unlocks. Your privacy is protected - no data leaves your device."
            }
            OnboardingStep::Configure => {
                "How many times should you re-enter your PIN after unlocking? \
                 You can change this later in settings."
            }
        }
    }
}

/// Outcome of pressing the primary button.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(OnboardingStep),
    Completed(Event),
}

#[derive(Debug, Clone)]
pub struct Onboarding {
    current: usize,
    pin_retries: u8,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new()
    }
}

impl Onboarding {
    pub fn new() -> Self {
        Self {
            current: 0,
            pin_retries: crate::settings::DEFAULT_PIN_RETRIES,
        }
    }

    pub fn current_step(&self) -> OnboardingStep {
        OnboardingStep::ALL[self.current]
    }

    pub fn step_index(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        OnboardingStep::ALL.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == OnboardingStep::ALL.len()
    }

    pub fn primary_label(&self) -> &'static str {
        if self.is_last_step() {
            "Get Started"
        } else {
            "Continue"
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn pin_retries(&self) -> u8 {
        self.pin_retries
    }

    /// Pick the initial entry count on the Configure step.
    ///
    /// # Errors
    /// Rejects counts outside 1..=5.
    pub fn choose_pin_retries(&mut self, retries: u8) -> Result<(), ValidationError> {
        if !ONBOARDING_RETRY_CHOICES.contains(&retries) {
            return Err(ValidationError::InvalidValue {
                field: "pinRetries".into(),
                message: format!(
                    "choose between {} and {} during setup",
                    ONBOARDING_RETRY_CHOICES.start(),
                    ONBOARDING_RETRY_CHOICES.end()
                ),
            });
        }
        self.pin_retries = retries;
        Ok(())
    }

    /// Advance one step, or finish on the last one: apply the chosen entry
    /// count, save settings and mark setup complete.
    ///
    /// # Errors
    /// Returns an error if finishing fails to persist.
    pub fn next(
        &mut self,
        settings: &mut Settings,
        store: &dyn PreferencesStore,
    ) -> Result<Advance, CoreError> {
        if !self.is_last_step() {
            self.current += 1;
            return Ok(Advance::Moved(self.current_step()));
        }

        settings.set_pin_retries(self.pin_retries)?;
        settings.save(store)?;
        mark_complete(store)?;
        Ok(Advance::Completed(Event::OnboardingCompleted {
            pin_retries: self.pin_retries,
            at: Utc::now(),
        }))
    }

    /// Go back one step; no-op on the first.
    pub fn back(&mut self) -> OnboardingStep {
        if self.current > 0 {
            self.current -= 1;
        }
        self.current_step()
    }
}

/// Whether the walkthrough has been finished. Store failures read as "not
/// complete".
pub fn is_complete(store: &dyn PreferencesStore) -> bool {
    match store.get(SETUP_KEY) {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            tracing::warn!(error = %e, "error reading setup flag");
            false
        }
    }
}

/// # Errors
/// Returns an error if the flag cannot be written.
pub fn mark_complete(store: &dyn PreferencesStore) -> Result<(), CoreError> {
    store.set(SETUP_KEY, "true")?;
    Ok(())
}

/// Forget that setup was completed so the walkthrough runs again.
///
/// # Errors
/// Returns an error if the flag cannot be removed.
pub fn reset(store: &dyn PreferencesStore) -> Result<(), CoreError> {
    store.remove(SETUP_KEY)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferences;

    #[test]
    fn walks_three_steps_then_completes() {
        let store = MemoryPreferences::new();
        let mut settings = Settings::default();
        let mut flow = Onboarding::new();

        assert_eq!(flow.current_step(), OnboardingStep::Welcome);
        assert_eq!(flow.primary_label(), "Continue");
        assert!(!flow.can_go_back());

        assert_eq!(
            flow.next(&mut settings, &store).unwrap(),
            Advance::Moved(OnboardingStep::Permissions)
        );
        assert_eq!(
            flow.next(&mut settings, &store).unwrap(),
            Advance::Moved(OnboardingStep::Configure)
        );
        assert_eq!(flow.primary_label(), "Get Started");
        assert!(!is_complete(&store));

        assert!(matches!(
            flow.next(&mut settings, &store).unwrap(),
            Advance::Completed(Event::OnboardingCompleted { pin_retries: 3, .. })
        ));
        assert!(is_complete(&store));
    }

    #[test]
    fn back_stops_at_first_step() {
        let store = MemoryPreferences::new();
        let mut settings = Settings::default();
        let mut flow = Onboarding::new();
        flow.next(&mut settings, &store).unwrap();
        assert_eq!(flow.back(), OnboardingStep::Welcome);
        assert_eq!(flow.back(), OnboardingStep::Welcome);
        assert_eq!(flow.step_index(), 0);
    }

    #[test]
    fn chosen_retries_applied_on_finish() {
        let store = MemoryPreferences::new();
        let mut settings = Settings::default();
        let mut flow = Onboarding::new();
        flow.choose_pin_retries(5).unwrap();
        assert!(flow.choose_pin_retries(0).is_err());
        assert!(flow.choose_pin_retries(6).is_err());

        for _ in 0..flow.step_count() {
            flow.next(&mut settings, &store).unwrap();
        }
        assert_eq!(settings.pin_retries(), 5);
        assert_eq!(Settings::load(&store).pin_retries(), 5);
    }

    #[test]
    fn reset_clears_flag() {
        let store = MemoryPreferences::new();
        mark_complete(&store).unwrap();
        assert!(is_complete(&store));
        reset(&store).unwrap();
        assert!(!is_complete(&store));
    }
}
