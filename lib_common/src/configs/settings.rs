//! # Runtime Settings
//!
//! One struct carries every knob and derives both `clap::Parser` and serde,
//! so the same shape works as CLI flags, environment variables and the JSON
//! settings file. Layering order, later wins: built-in defaults, then the
//! optional settings file (`appsettings.json` unless overridden), then
//! env/CLI. Endpoint URLs are configuration per deployment, never hardcoded
//! at call sites; the bearer token only ever comes from the environment.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// The settings file is not valid JSON for the `Settings` shape.
    #[error("Settings file parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// All knobs, every field optional so layers can be merged.
#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "TagStream hashtag statistics consumer", version)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Path to the JSON settings file.
    #[clap(long, env = "TAGSTREAM_CONFIG_PATH", help = "Path to the JSON settings file.")]
    pub config_path: Option<PathBuf>,

    /// Streaming GET endpoint.
    #[clap(long, env = "TAGSTREAM_STREAM_URL", help = "URL of the filtered stream endpoint.")]
    pub stream_url: Option<String>,

    /// Rule-registration POST endpoint.
    #[clap(long, env = "TAGSTREAM_RULES_URL", help = "URL of the filter rules endpoint.")]
    pub rules_url: Option<String>,

    /// Bearer token for the stream and rules endpoints. Environment only in
    /// practice; keeping it out of the settings file keeps it out of VCS.
    #[clap(
        long,
        env = "TAGSTREAM_BEARER_TOKEN",
        hide_env_values = true,
        help = "Bearer token for upstream authorization."
    )]
    pub bearer_token: Option<String>,

    /// Filter rules to register before streaming.
    #[clap(
        long,
        env = "TAGSTREAM_RULES",
        value_delimiter = ',',
        help = "Comma-separated filter rules to register before streaming."
    )]
    pub rules: Option<Vec<String>>,

    /// Seconds between stats reports.
    #[clap(long, env = "TAGSTREAM_REPORT_INTERVAL_SECONDS", help = "Seconds between stats reports.")]
    pub report_interval_seconds: Option<u64>,

    /// How many top hashtags each report carries.
    #[clap(long, env = "TAGSTREAM_TOP_COUNT", help = "Number of top hashtags per report.")]
    pub top_count: Option<usize>,

    /// Seconds to wait for in-flight line tasks on shutdown.
    #[clap(
        long,
        env = "TAGSTREAM_DRAIN_TIMEOUT_SECONDS",
        help = "Seconds to wait for in-flight work during shutdown."
    )]
    pub drain_timeout_seconds: Option<u64>,

    /// Directory for log files.
    #[clap(long, env = "TAGSTREAM_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    /// Logging level (debug, info, warn, error).
    #[clap(long, env = "TAGSTREAM_LOG_LEVEL", help = "Logging level (debug, info, warn, error).")]
    pub log_level: Option<String>,
}

impl Settings {
    /// Merges two layers; `other` wins wherever it has a value.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            config_path: other.config_path.or(self.config_path),
            stream_url: other.stream_url.or(self.stream_url),
            rules_url: other.rules_url.or(self.rules_url),
            bearer_token: other.bearer_token.or(self.bearer_token),
            rules: other.rules.or(self.rules),
            report_interval_seconds: other.report_interval_seconds.or(self.report_interval_seconds),
            top_count: other.top_count.or(self.top_count),
            drain_timeout_seconds: other.drain_timeout_seconds.or(self.drain_timeout_seconds),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// The built-in bottom layer.
    pub fn defaults() -> Settings {
        Settings {
            config_path: None,
            stream_url: Some("https://api.twitter.com/2/tweets/search/stream".to_string()),
            rules_url: Some("https://api.twitter.com/2/tweets/search/stream/rules".to_string()),
            bearer_token: None,
            rules: Some(vec!["chatgpt".to_string(), "#".to_string()]),
            report_interval_seconds: Some(5),
            top_count: Some(10),
            drain_timeout_seconds: Some(5),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
        }
    }
}

/// The fully-layered view the binary actually runs with.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    /// Streaming GET endpoint.
    pub stream_url: String,
    /// Rule-registration POST endpoint.
    pub rules_url: String,
    /// Bearer token; `None` means unauthenticated requests, the upstream
    /// will reject them — kept non-fatal on purpose.
    pub bearer_token: Option<String>,
    /// Filter rules to register.
    pub rules: Vec<String>,
    /// Interval between stats reports.
    pub report_interval: Duration,
    /// Top hashtags per report.
    pub top_count: usize,
    /// Shutdown drain budget.
    pub drain_timeout: Duration,
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Logging level.
    pub log_level: String,
}

impl From<Settings> for ResolvedSettings {
    fn from(merged: Settings) -> Self {
        let defaults = Settings::defaults();
        let merged = defaults.merge(merged);
        // Every field below has a default, so the expects are unreachable.
        ResolvedSettings {
            stream_url: merged.stream_url.expect("default stream_url"),
            rules_url: merged.rules_url.expect("default rules_url"),
            bearer_token: merged.bearer_token,
            rules: merged.rules.expect("default rules"),
            report_interval: Duration::from_secs(
                merged.report_interval_seconds.expect("default interval"),
            ),
            top_count: merged.top_count.expect("default top_count"),
            drain_timeout: Duration::from_secs(
                merged.drain_timeout_seconds.expect("default drain timeout"),
            ),
            log_dir: merged.log_dir.expect("default log_dir"),
            log_level: merged.log_level.expect("default log_level"),
        }
    }
}

/// Loads settings from CLI/env on top of the file on top of defaults.
///
/// Intended for `main`; tests go through [`load_layered`] to stay clear of
/// process arguments.
pub fn load_settings() -> Result<ResolvedSettings, SettingsError> {
    let overrides = Settings::parse();
    load_layered(overrides)
}

/// Applies the layering with an explicit override layer.
pub fn load_layered(overrides: Settings) -> Result<ResolvedSettings, SettingsError> {
    let mut merged = Settings::defaults();

    let file_path = overrides
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    if let Some(file_layer) = read_settings_file(&file_path)? {
        merged = merged.merge(file_layer);
    }

    merged = merged.merge(overrides);
    Ok(ResolvedSettings::from(merged))
}

fn read_settings_file(path: &Path) -> Result<Option<Settings>, SettingsError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str::<Settings>(&text)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_resolve_without_a_file() {
        let resolved = load_layered(Settings::default()).expect("defaults load");
        assert_eq!(resolved.report_interval, Duration::from_secs(5));
        assert_eq!(resolved.top_count, 10);
        assert!(resolved.bearer_token.is_none());
        assert_eq!(resolved.rules, vec!["chatgpt".to_string(), "#".to_string()]);
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("appsettings.json");
        let mut file = fs::File::create(&path).expect("create settings file");
        write!(
            file,
            r#"{{"streamUrl":"https://stream.example/v2","topCount":3}}"#
        )
        .expect("write settings file");

        let overrides = Settings {
            config_path: Some(path),
            ..Settings::default()
        };
        let resolved = load_layered(overrides).expect("file layer loads");
        assert_eq!(resolved.stream_url, "https://stream.example/v2");
        assert_eq!(resolved.top_count, 3);
        // Untouched keys keep their defaults.
        assert_eq!(resolved.report_interval, Duration::from_secs(5));
    }

    #[test]
    fn override_layer_beats_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("appsettings.json");
        fs::write(&path, r#"{"topCount":3,"logLevel":"debug"}"#).expect("write settings file");

        let overrides = Settings {
            config_path: Some(path),
            top_count: Some(7),
            ..Settings::default()
        };
        let resolved = load_layered(overrides).expect("layers load");
        assert_eq!(resolved.top_count, 7);
        assert_eq!(resolved.log_level, "debug");
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("appsettings.json");
        fs::write(&path, "{not json").expect("write settings file");

        let overrides = Settings {
            config_path: Some(path),
            ..Settings::default()
        };
        assert!(matches!(
            load_layered(overrides),
            Err(SettingsError::JsonError(_))
        ));
    }

    #[test]
    fn missing_file_path_falls_back_to_defaults() {
        let overrides = Settings {
            config_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Settings::default()
        };
        let resolved = load_layered(overrides).expect("missing file is not an error");
        assert_eq!(resolved.top_count, 10);
    }
}
