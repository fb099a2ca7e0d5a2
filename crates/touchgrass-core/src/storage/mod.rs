mod config;
pub mod local;
pub mod native;
pub mod preferences;

pub use config::{Config, LoggingConfig, SavingsConfig, StorageBackend, StorageConfig};
pub use local::LocalPreferences;
pub use native::NativePreferences;
pub use preferences::{open_preferences, MemoryPreferences, PreferencesStore, SharedStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `config.toml` and the local store.
///
/// `TOUCHGRASS_DATA_DIR` wins when set. Otherwise `~/.config/touchgrass[-dev]/`
/// based on `TOUCHGRASS_ENV` (set `TOUCHGRASS_ENV=dev` for a development
/// data directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TOUCHGRASS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TOUCHGRASS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("touchgrass-dev")
            } else {
                base_dir.join("touchgrass")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
