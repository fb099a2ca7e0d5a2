//! User-facing settings: protection switch, PIN, retry count and
//! emergency apps.
//!
//! Settings are persisted as one JSON record under [`SETTINGS_KEY`] in the
//! preferences store. The PIN is only ever stored as a salted SHA-256
//! digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::storage::PreferencesStore;

pub const SETTINGS_KEY: &str = "touchgrass_settings";
pub const PIN_LENGTH: usize = 4;
pub const MAX_PIN_RETRIES: u8 = 10;
pub const DEFAULT_PIN_RETRIES: u8 = 3;
pub const MAX_EMERGENCY_APPS: usize = 3;
pub const DEFAULT_PIN: &str = "1234";

/// Apps that can be offered for quick access on the pause screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyApp {
    Phone,
    Messages,
    Emergency,
    Maps,
    Camera,
    Clock,
    Calculator,
    Weather,
    Calendar,
    Contacts,
}

impl EmergencyApp {
    pub const ALL: [EmergencyApp; 10] = [
        EmergencyApp::Phone,
        EmergencyApp::Messages,
        EmergencyApp::Emergency,
        EmergencyApp::Maps,
        EmergencyApp::Camera,
        EmergencyApp::Clock,
        EmergencyApp::Calculator,
        EmergencyApp::Weather,
        EmergencyApp::Calendar,
        EmergencyApp::Contacts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmergencyApp::Phone => "Phone",
            EmergencyApp::Messages => "Messages",
            EmergencyApp::Emergency => "Emergency",
            EmergencyApp::Maps => "Maps",
            EmergencyApp::Camera => "Camera",
            EmergencyApp::Clock => "Clock",
            EmergencyApp::Calculator => "Calculator",
            EmergencyApp::Weather => "Weather",
            EmergencyApp::Calendar => "Calendar",
            EmergencyApp::Contacts => "Contacts",
        }
    }
}

impl fmt::Display for EmergencyApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmergencyApp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EmergencyApp::ALL
            .into_iter()
            .find(|app| app.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownApp(wanted.to_string()))
    }
}

/// A syntactically valid PIN: exactly [`PIN_LENGTH`] ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// # Errors
    /// Returns [`ValidationError::MalformedPin`] unless `raw` is four digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.len() == PIN_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::MalformedPin)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Salted SHA-256 digest of a PIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinHash {
    salt: String,
    digest: String,
}

impl PinHash {
    pub fn new(pin: &Pin) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, pin.as_str());
        Self { salt, digest }
    }

    /// Compare a candidate entry against the stored digest.
    pub fn matches(&self, candidate: &str) -> bool {
        Pin::parse(candidate).is_ok() && Self::digest(&self.salt, candidate) == self.digest
    }

    fn digest(salt: &str, pin: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(pin.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Default for PinHash {
    fn default() -> Self {
        Self::new(&Pin(DEFAULT_PIN.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pin_retries: u8,
    emergency_apps: Vec<EmergencyApp>,
    is_enabled: bool,
    pin: PinHash,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin_retries: DEFAULT_PIN_RETRIES,
            emergency_apps: vec![
                EmergencyApp::Phone,
                EmergencyApp::Messages,
                EmergencyApp::Emergency,
            ],
            is_enabled: true,
            pin: PinHash::default(),
        }
    }
}

/// Compact view of the current configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSummary {
    pub status: String,
    pub pin_retries: u8,
    pub emergency_apps: String,
}

impl Settings {
    pub fn pin_retries(&self) -> u8 {
        self.pin_retries
    }

    pub fn emergency_apps(&self) -> &[EmergencyApp] {
        &self.emergency_apps
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Number of PIN entries required after an unlock. `0` keeps the
    /// pause but drops the PIN requirement.
    ///
    /// # Errors
    /// Returns [`ValidationError::RetriesOutOfRange`] above [`MAX_PIN_RETRIES`].
    pub fn set_pin_retries(&mut self, retries: u8) -> Result<(), ValidationError> {
        if retries > MAX_PIN_RETRIES {
            return Err(ValidationError::RetriesOutOfRange(retries));
        }
        self.pin_retries = retries;
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    pub fn is_selected(&self, app: EmergencyApp) -> bool {
        self.emergency_apps.contains(&app)
    }

    /// Whether `app` may be toggled: selected apps can always be removed,
    /// unselected ones only while there is room.
    pub fn can_select(&self, app: EmergencyApp) -> bool {
        self.is_selected(app) || self.emergency_apps.len() < MAX_EMERGENCY_APPS
    }

    /// Remove `app` if selected, otherwise add it. Returns whether the app
    /// is selected afterwards.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmergencyAppLimit`] when adding to a full
    /// selection; the selection is left untouched.
    pub fn toggle_emergency_app(&mut self, app: EmergencyApp) -> Result<bool, ValidationError> {
        if self.is_selected(app) {
            self.emergency_apps.retain(|a| *a != app);
            Ok(false)
        } else if self.emergency_apps.len() < MAX_EMERGENCY_APPS {
            self.emergency_apps.push(app);
            Ok(true)
        } else {
            Err(ValidationError::EmergencyAppLimit)
        }
    }

    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin.matches(candidate)
    }

    /// Replace the PIN. Callers are expected to have verified the old one.
    pub(crate) fn replace_pin(&mut self, pin: &Pin) {
        self.pin = PinHash::new(pin);
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> SettingsSummary {
        SettingsSummary {
            status: if self.is_enabled { "Active" } else { "Disabled" }.to_string(),
            pin_retries: self.pin_retries,
            emergency_apps: format!("{}/{}", self.emergency_apps.len(), MAX_EMERGENCY_APPS),
        }
    }

    /// Check invariants of a record read from storage.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pin_retries > MAX_PIN_RETRIES {
            return Err(ValidationError::RetriesOutOfRange(self.pin_retries));
        }
        if self.emergency_apps.len() > MAX_EMERGENCY_APPS {
            return Err(ValidationError::EmergencyAppLimit);
        }
        let mut seen = Vec::with_capacity(self.emergency_apps.len());
        for app in &self.emergency_apps {
            if seen.contains(app) {
                return Err(ValidationError::InvalidValue {
                    field: "emergencyApps".into(),
                    message: format!("{app} listed twice"),
                });
            }
            seen.push(*app);
        }
        Ok(())
    }

    /// Load settings, falling back to defaults when the record is missing,
    /// unreadable or invalid.
    pub fn load(store: &dyn PreferencesStore) -> Self {
        let raw = match store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "error loading settings");
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    tracing::warn!(error = %e, "stored settings are invalid, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "stored settings are unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the whole record.
    ///
    /// # Errors
    /// Returns an error if serialization or the store write fails.
    pub fn save(&self, store: &dyn PreferencesStore) -> Result<(), CoreError> {
        let json = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, &json)?;
        tracing::debug!(retries = self.pin_retries, enabled = self.is_enabled, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferences;

    #[test]
    fn defaults_match_first_run() {
        let settings = Settings::default();
        assert_eq!(settings.pin_retries(), 3);
        assert!(settings.is_enabled());
        assert_eq!(
            settings.emergency_apps(),
            &[EmergencyApp::Phone, EmergencyApp::Messages, EmergencyApp::Emergency]
        );
        assert!(settings.verify_pin("1234"));
        assert!(!settings.verify_pin("0000"));
    }

    #[test]
    fn retries_accept_zero_through_ten() {
        let mut settings = Settings::default();
        for n in 0..=MAX_PIN_RETRIES {
            settings.set_pin_retries(n).unwrap();
            assert_eq!(settings.pin_retries(), n);
        }
        assert_eq!(
            settings.set_pin_retries(11),
            Err(ValidationError::RetriesOutOfRange(11))
        );
        assert_eq!(settings.pin_retries(), 10);
    }

    #[test]
    fn toggle_removes_selected_app() {
        let mut settings = Settings::default();
        assert_eq!(settings.toggle_emergency_app(EmergencyApp::Messages), Ok(false));
        assert_eq!(
            settings.emergency_apps(),
            &[EmergencyApp::Phone, EmergencyApp::Emergency]
        );
    }

    #[test]
    fn toggle_rejects_fourth_app() {
        let mut settings = Settings::default();
        assert!(!settings.can_select(EmergencyApp::Maps));
        assert_eq!(
            settings.toggle_emergency_app(EmergencyApp::Maps),
            Err(ValidationError::EmergencyAppLimit)
        );
        assert_eq!(settings.emergency_apps().len(), 3);
        assert!(settings.can_select(EmergencyApp::Phone));
    }

    #[test]
    fn toggle_appends_when_room() {
        let mut settings = Settings::default();
        settings.toggle_emergency_app(EmergencyApp::Phone).unwrap();
        assert_eq!(settings.toggle_emergency_app(EmergencyApp::Camera), Ok(true));
        assert_eq!(
            settings.emergency_apps(),
            &[EmergencyApp::Messages, EmergencyApp::Emergency, EmergencyApp::Camera]
        );
    }

    #[test]
    fn summary_reports_status_and_counts() {
        let mut settings = Settings::default();
        settings.set_enabled(false);
        settings.toggle_emergency_app(EmergencyApp::Phone).unwrap();
        let summary = settings.summary();
        assert_eq!(summary.status, "Disabled");
        assert_eq!(summary.pin_retries, 3);
        assert_eq!(summary.emergency_apps, "2/3");
    }

    #[test]
    fn pin_parse_requires_four_digits() {
        assert!(Pin::parse("0420").is_ok());
        assert_eq!(Pin::parse("123"), Err(ValidationError::MalformedPin));
        assert_eq!(Pin::parse("12345"), Err(ValidationError::MalformedPin));
        assert_eq!(Pin::parse("12a4"), Err(ValidationError::MalformedPin));
        assert_eq!(format!("{:?}", Pin::parse("9999").unwrap()), "Pin(****)");
    }

    #[test]
    fn pin_hash_is_salted() {
        let pin = Pin::parse("1234").unwrap();
        let a = PinHash::new(&pin);
        let b = PinHash::new(&pin);
        assert_ne!(a, b);
        assert!(a.matches("1234") && b.matches("1234"));
    }

    #[test]
    fn stored_record_never_contains_clear_pin() {
        let store = MemoryPreferences::new();
        let mut settings = Settings::default();
        settings.replace_pin(&Pin::parse("8642").unwrap());
        settings.save(&store).unwrap();

        let raw = store.get(SETTINGS_KEY).unwrap().unwrap();
        assert!(!raw.contains("8642"));
        assert!(raw.contains("\"pinRetries\":3"));
        assert!(raw.contains("\"isEnabled\":true"));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let store = MemoryPreferences::new();
        let mut settings = Settings::default();
        settings.set_pin_retries(7).unwrap();
        settings.set_enabled(false);
        settings.save(&store).unwrap();

        let loaded = Settings::load(&store);
        assert_eq!(loaded.pin_retries(), 7);
        assert!(!loaded.is_enabled());
        assert!(loaded.verify_pin("1234"));
    }

    #[test]
    fn corrupt_record_loads_defaults() {
        let store = MemoryPreferences::new();
        store.set(SETTINGS_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&store).pin_retries(), DEFAULT_PIN_RETRIES);
    }

    #[test]
    fn invalid_record_loads_defaults() {
        let store = MemoryPreferences::new();
        let mut value = serde_json::to_value(Settings::default()).unwrap();
        value["pinRetries"] = serde_json::json!(42);
        store.set(SETTINGS_KEY, &value.to_string()).unwrap();
        assert_eq!(Settings::load(&store).pin_retries(), DEFAULT_PIN_RETRIES);
    }

    #[test]
    fn emergency_app_parses_names() {
        assert_eq!("phone".parse::<EmergencyApp>(), Ok(EmergencyApp::Phone));
        assert_eq!(" Weather ".parse::<EmergencyApp>(), Ok(EmergencyApp::Weather));
        assert_eq!(
            "Browser".parse::<EmergencyApp>(),
            Err(ValidationError::UnknownApp("Browser".into()))
        );
    }
}
