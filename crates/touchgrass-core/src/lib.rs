//! # TouchGrass Core Library
//!
//! This library provides the core logic of TouchGrass, a mindful-unlock
//! companion: after the phone is unlocked it asks for the PIN a few more
//! times, counts unlocks and pauses, and estimates the minutes saved.
//! Every operation is available from the standalone CLI; a mobile shell is
//! a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Stats**: one usage record, fully rewritten on every change
//! - **Storage**: key-value preferences (native secure store or local
//!   SQLite fallback) and TOML configuration
//! - **Lock screen**: PIN re-entry state machine for the mindful pause
//! - **Lifecycle**: foreground events turned into unlock prompts
//!
//! ## Key Components
//!
//! - [`StatsService`]: usage statistics persistence
//! - [`PreferencesStore`]: storage backend trait
//! - [`LockScreen`]: pause screen state machine
//! - [`App`]: view routing over all of the above
//! - [`Config`]: application configuration management

pub mod app;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod lock;
pub mod onboarding;
pub mod pin_change;
pub mod platform;
pub mod settings;
pub mod stats;
pub mod storage;

pub use app::{App, Route, View};
pub use dashboard::DashboardSummary;
pub use error::{ConfigError, CoreError, PreferencesError, ValidationError};
pub use events::Event;
pub use lifecycle::{AppStateChange, UnlockMonitor};
pub use lock::{LockScreen, LockState};
pub use onboarding::{Advance, Onboarding, OnboardingStep};
pub use pin_change::{PinChange, PinChangeStage};
pub use platform::{DeviceInfo, DeviceInfoProvider, Platform, SystemDeviceInfo};
pub use settings::{EmergencyApp, Pin, Settings, SettingsSummary};
pub use stats::{SavingsModel, StatsService, UnlockSession, UsageStats};
pub use storage::{Config, PreferencesStore, SharedStore, StorageBackend};
