//! Two-step PIN change: verify the current PIN, then choose and confirm a
//! new one.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::settings::{Pin, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinChangeStage {
    VerifyCurrent,
    ChooseNew,
}

#[derive(Debug, Clone)]
pub struct PinChange {
    stage: PinChangeStage,
}

impl Default for PinChange {
    fn default() -> Self {
        Self::new()
    }
}

impl PinChange {
    pub fn new() -> Self {
        Self {
            stage: PinChangeStage::VerifyCurrent,
        }
    }

    pub fn stage(&self) -> PinChangeStage {
        self.stage
    }

    /// Check the current PIN and unlock the second step.
    ///
    /// # Errors
    /// `MalformedPin` for anything but four digits, `IncorrectPin` on a
    /// mismatch.
    pub fn verify_current(
        &mut self,
        settings: &Settings,
        candidate: &str,
    ) -> Result<(), ValidationError> {
        Pin::parse(candidate)?;
        if !settings.verify_pin(candidate) {
            return Err(ValidationError::IncorrectPin);
        }
        self.stage = PinChangeStage::ChooseNew;
        Ok(())
    }

    /// Replace the PIN in `settings` and start over.
    ///
    /// # Errors
    /// Fails before verification, for malformed PINs, or when the
    /// confirmation differs.
    pub fn submit(
        &mut self,
        settings: &mut Settings,
        new_pin: &str,
        confirm: &str,
    ) -> Result<Event, ValidationError> {
        if self.stage != PinChangeStage::ChooseNew {
            return Err(ValidationError::InvalidState(
                "current PIN has not been verified".into(),
            ));
        }
        let pin = Pin::parse(new_pin)?;
        if new_pin != confirm {
            return Err(ValidationError::PinMismatch);
        }

        settings.replace_pin(&pin);
        self.cancel();
        Ok(Event::PinChanged { at: Utc::now() })
    }

    pub fn cancel(&mut self) {
        self.stage = PinChangeStage::VerifyCurrent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_change_flow() {
        let mut settings = Settings::default();
        let mut flow = PinChange::new();

        flow.verify_current(&settings, "1234").unwrap();
        assert_eq!(flow.stage(), PinChangeStage::ChooseNew);

        let event = flow.submit(&mut settings, "5678", "5678").unwrap();
        assert!(matches!(event, Event::PinChanged { .. }));
        assert_eq!(flow.stage(), PinChangeStage::VerifyCurrent);
        assert!(settings.verify_pin("5678"));
        assert!(!settings.verify_pin("1234"));
    }

    #[test]
    fn wrong_current_pin_stays_on_first_step() {
        let settings = Settings::default();
        let mut flow = PinChange::new();
        assert_eq!(
            flow.verify_current(&settings, "4321"),
            Err(ValidationError::IncorrectPin)
        );
        assert_eq!(
            flow.verify_current(&settings, "12"),
            Err(ValidationError::MalformedPin)
        );
        assert_eq!(flow.stage(), PinChangeStage::VerifyCurrent);
    }

    #[test]
    fn submit_requires_verification() {
        let mut settings = Settings::default();
        let mut flow = PinChange::new();
        assert!(matches!(
            flow.submit(&mut settings, "5678", "5678"),
            Err(ValidationError::InvalidState(_))
        ));
        assert!(settings.verify_pin("1234"));
    }

    #[test]
    fn mismatched_confirmation_keeps_old_pin() {
        let mut settings = Settings::default();
        let mut flow = PinChange::new();
        flow.verify_current(&settings, "1234").unwrap();

        assert_eq!(
            flow.submit(&mut settings, "5678", "5679"),
            Err(ValidationError::PinMismatch)
        );
        assert_eq!(
            flow.submit(&mut settings, "567", "567"),
            Err(ValidationError::MalformedPin)
        );
        assert_eq!(flow.stage(), PinChangeStage::ChooseNew);
        assert!(settings.verify_pin("1234"));
    }

    #[test]
    fn cancel_returns_to_first_step() {
        let settings = Settings::default();
        let mut flow = PinChange::new();
        flow.verify_current(&settings, "1234").unwrap();
        flow.cancel();
        assert_eq!(flow.stage(), PinChangeStage::VerifyCurrent);
    }
}
