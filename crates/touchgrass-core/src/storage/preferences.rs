//! Key-value preferences store.
//!
//! Every persisted record (usage stats, settings, onboarding flag) is a
//! single string value under one key. Backends:
//! - [`NativePreferences`]: OS secure credential store (device preferences)
//! - [`LocalPreferences`]: SQLite `kv` table in the data directory
//! - [`MemoryPreferences`]: in-process map
//!
//! [`NativePreferences`]: super::NativePreferences
//! [`LocalPreferences`]: super::LocalPreferences

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::config::{StorageBackend, StorageConfig};
use super::{data_dir, LocalPreferences, NativePreferences};
use crate::error::{CoreError, PreferencesError};
use crate::platform::{is_native_device, DeviceInfo};

/// A string key-value store. Writes replace the whole value.
pub trait PreferencesStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), PreferencesError>;

    /// Which backend this store is.
    fn backend(&self) -> StorageBackend;
}

/// Store handle shared by the stats service, settings and onboarding.
pub type SharedStore = Arc<dyn PreferencesStore>;

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PreferencesError> {
        self.values
            .lock()
            .map_err(|_| PreferencesError::Unavailable("memory (poisoned)".into()))
    }
}

impl PreferencesStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Open the store selected by `config`.
///
/// `auto` picks the native secure store on Android/iOS and the local store
/// everywhere else. A native store that cannot be opened degrades to the
/// local store.
///
/// # Errors
/// Returns an error if the local store (or an explicitly requested native
/// store) cannot be opened.
pub fn open_preferences(
    config: &StorageConfig,
    device: Option<&DeviceInfo>,
) -> Result<SharedStore, CoreError> {
    select_store(
        config.backend,
        is_native_device(device),
        open_native,
        open_local,
    )
}

fn open_native() -> Result<SharedStore, CoreError> {
    Ok(Arc::new(NativePreferences::open()?))
}

fn open_local() -> Result<SharedStore, CoreError> {
    let path = data_dir()?.join(LocalPreferences::FILE_NAME);
    Ok(Arc::new(LocalPreferences::open(&path)?))
}

/// Backend selection, with the native and local openers supplied by the
/// caller. Each opener runs at most once.
fn select_store<N, L>(
    backend: StorageBackend,
    native_device: bool,
    open_native: N,
    open_local: L,
) -> Result<SharedStore, CoreError>
where
    N: FnOnce() -> Result<SharedStore, CoreError>,
    L: FnOnce() -> Result<SharedStore, CoreError>,
{
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryPreferences::new())),
        StorageBackend::Local => open_local(),
        StorageBackend::Native => open_native(),
        StorageBackend::Auto if native_device => match open_native() {
            Ok(store) => Ok(store),
            Err(e) => {
                tracing::warn!(error = %e, "native preferences unavailable, using local store");
                open_local()
            }
        },
        StorageBackend::Auto => open_local(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use tempfile::TempDir;

    fn local_in(dir: &TempDir) -> Result<SharedStore, CoreError> {
        let path = dir.path().join(LocalPreferences::FILE_NAME);
        Ok(Arc::new(LocalPreferences::open(&path)?))
    }

    fn keychain_missing() -> Result<SharedStore, CoreError> {
        Err(PreferencesError::Unavailable("no secret service".into()).into())
    }

    fn device(platform: Platform) -> DeviceInfo {
        DeviceInfo {
            platform,
            operating_system: platform.to_string(),
            os_version: None,
            model: None,
        }
    }

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryPreferences::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn open_memory_backend_ignores_device() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
        };
        let store = open_preferences(&config, None).unwrap();
        assert_eq!(store.backend(), StorageBackend::Memory);
    }

    #[test]
    fn auto_on_web_uses_local_store() {
        let dir = TempDir::new().unwrap();
        let web = device(Platform::Web);
        let store = select_store(
            StorageBackend::Auto,
            is_native_device(Some(&web)),
            || panic!("native store must not be opened on web"),
            || local_in(&dir),
        )
        .unwrap();
        assert_eq!(store.backend(), StorageBackend::Local);
        assert!(dir.path().join(LocalPreferences::FILE_NAME).exists());
    }

    #[test]
    fn auto_without_device_info_uses_local_store() {
        let dir = TempDir::new().unwrap();
        let store = select_store(
            StorageBackend::Auto,
            is_native_device(None),
            keychain_missing,
            || local_in(&dir),
        )
        .unwrap();
        assert_eq!(store.backend(), StorageBackend::Local);
    }

    #[test]
    fn auto_on_native_device_prefers_native_store() {
        let dir = TempDir::new().unwrap();
        let phone = device(Platform::Ios);
        let store = select_store(
            StorageBackend::Auto,
            is_native_device(Some(&phone)),
            || Ok(Arc::new(MemoryPreferences::new()) as SharedStore),
            || local_in(&dir),
        )
        .unwrap();
        assert_eq!(store.backend(), StorageBackend::Memory);
        assert!(!dir.path().join(LocalPreferences::FILE_NAME).exists());
    }

    #[test]
    fn auto_falls_back_to_local_when_keychain_fails() {
        let dir = TempDir::new().unwrap();
        let phone = device(Platform::Android);
        let store = select_store(
            StorageBackend::Auto,
            is_native_device(Some(&phone)),
            keychain_missing,
            || local_in(&dir),
        )
        .unwrap();
        assert_eq!(store.backend(), StorageBackend::Local);

        store.set("touchgrass-setup", "true").unwrap();
        assert_eq!(store.get("touchgrass-setup").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn explicit_local_is_honoured_on_native_device() {
        let dir = TempDir::new().unwrap();
        let store = select_store(
            StorageBackend::Local,
            true,
            || panic!("native store must not be opened"),
            || local_in(&dir),
        )
        .unwrap();
        assert_eq!(store.backend(), StorageBackend::Local);
    }

    #[test]
    fn explicit_native_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = select_store(StorageBackend::Native, true, keychain_missing, || {
            local_in(&dir)
        });
        assert!(result.is_err());
        assert!(!dir.path().join(LocalPreferences::FILE_NAME).exists());
    }
}
