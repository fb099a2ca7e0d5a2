//! Native secure preferences backed by the OS credential store.

use super::config::StorageBackend;
use super::preferences::PreferencesStore;
use crate::error::PreferencesError;

const SERVICE: &str = "touchgrass";
const PROBE_KEY: &str = "touchgrass-probe";

/// Preferences kept in the platform keychain / keystore.
#[derive(Debug, Clone)]
pub struct NativePreferences {
    service: String,
}

impl NativePreferences {
    /// Open the store, probing the credential service once.
    ///
    /// # Errors
    /// Returns an error if the platform credential store cannot be reached.
    pub fn open() -> Result<Self, PreferencesError> {
        let store = Self {
            service: SERVICE.to_string(),
        };
        store.get(PROBE_KEY)?;
        Ok(store)
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, PreferencesError> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }
}

impl PreferencesStore for NativePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Native
    }
}
