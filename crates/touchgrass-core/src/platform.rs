//! Device and platform detection.
//!
//! Only Android and iOS count as native platforms; those get the secure
//! preferences store. Everything else runs on the local fallback store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Environment variable overriding the detected platform.
pub const PLATFORM_ENV: &str = "TOUCHGRASS_PLATFORM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
    Desktop,
}

impl Platform {
    /// Map a platform identifier. Unrecognized identifiers are `Web`.
    pub fn from_identifier(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            "desktop" | "linux" | "macos" | "windows" | "freebsd" => Platform::Desktop,
            _ => Platform::Web,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, Platform::Android | Platform::Ios)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
            Platform::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub platform: Platform,
    pub operating_system: String,
    pub os_version: Option<String>,
    pub model: Option<String>,
}

/// Source of device information.
pub trait DeviceInfoProvider {
    /// # Errors
    /// Returns an error if the device cannot be queried.
    fn device_info(&self) -> Result<DeviceInfo, CoreError>;
}

/// Provider reading the compile target and `TOUCHGRASS_PLATFORM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDeviceInfo;

impl DeviceInfoProvider for SystemDeviceInfo {
    fn device_info(&self) -> Result<DeviceInfo, CoreError> {
        let operating_system = std::env::consts::OS.to_string();
        let platform = match std::env::var(PLATFORM_ENV) {
            Ok(id) if !id.trim().is_empty() => Platform::from_identifier(&id),
            _ => Platform::from_identifier(&operating_system),
        };

        Ok(DeviceInfo {
            platform,
            operating_system,
            os_version: std::env::var("TOUCHGRASS_OS_VERSION").ok(),
            model: std::env::var("TOUCHGRASS_DEVICE_MODEL").ok(),
        })
    }
}

/// Query device info, logging and swallowing failures.
pub fn get_device_info(provider: &dyn DeviceInfoProvider) -> Option<DeviceInfo> {
    match provider.device_info() {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(error = %e, "error getting device info");
            None
        }
    }
}

/// True only when device info is available and reports Android or iOS.
pub fn is_native_platform(provider: &dyn DeviceInfoProvider) -> bool {
    is_native_device(get_device_info(provider).as_ref())
}

/// Same check for device info that has already been fetched.
pub fn is_native_device(device: Option<&DeviceInfo>) -> bool {
    device.is_some_and(|info| info.platform.is_native())
}
