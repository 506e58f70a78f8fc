//! # Configuration Modules
//!
//! Layered runtime settings for the consumer: built-in defaults, then an
//! optional JSON settings file, then environment variables and CLI flags.

/// Provides layered settings loading and the resolved runtime view.
pub mod settings;

pub use settings::{load_settings, ResolvedSettings, Settings, SettingsError};
