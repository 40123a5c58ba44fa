//! Configuration for the Command Clinic telemetry core
//!
//! Settings are resolved in layers: built-in defaults, an optional TOML file
//! in the support directory, then `CLINIC_*` environment overrides. The API
//! credential additionally falls back to `ANTHROPIC_API_KEY`, so a key set
//! for other tooling is picked up without extra configuration.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Model used for analysis calls.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Token budget per analysis response.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Absolute deadline for one analysis call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum interval between analysis calls, in milliseconds.
pub const DEFAULT_MIN_CALL_INTERVAL_MS: u64 = 1000;

/// Resolved runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Writable directory holding event logs and the alias document
    pub support_dir: PathBuf,

    /// Anthropic API key; empty means not configured
    pub api_key: String,

    /// Model identifier sent with every analysis request
    pub model: String,

    /// Token budget per analysis response
    pub max_tokens: u32,

    /// Absolute deadline for one analysis call, in seconds
    pub request_timeout_secs: u64,

    /// Minimum interval between analysis calls, in milliseconds
    pub min_call_interval_ms: u64,

    /// How many calendar days of events an analysis looks back over
    pub lookback_days: u32,

    /// Maximum events fed into one analysis (token budget: ~100 events)
    pub event_limit: usize,

    /// Day-partition files older than this many days are swept
    pub retention_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            support_dir: default_support_dir(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            min_call_interval_ms: DEFAULT_MIN_CALL_INTERVAL_MS,
            lookback_days: 7,
            event_limit: 100,
            retention_days: 7,
        }
    }
}

/// Default support directory under the platform data dir.
fn default_support_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("command-clinic")
}

impl Settings {
    /// Load settings from defaults, the optional config file, and the
    /// environment.
    ///
    /// The config file location is `$CLINIC_CONFIG` when set, otherwise
    /// `<default support dir>/config.toml`; a missing file is not an error.
    pub fn load() -> Result<Self> {
        let config_path = env::var("CLINIC_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_support_dir().join("config.toml"));

        let defaults = Settings::default();
        let cfg = Config::builder()
            .set_default("support_dir", defaults.support_dir.to_string_lossy().to_string())?
            .set_default("api_key", defaults.api_key.clone())?
            .set_default("model", defaults.model.clone())?
            .set_default("max_tokens", defaults.max_tokens as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("min_call_interval_ms", defaults.min_call_interval_ms as i64)?
            .set_default("lookback_days", defaults.lookback_days as i64)?
            .set_default("event_limit", defaults.event_limit as i64)?
            .set_default("retention_days", defaults.retention_days as i64)?
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("CLINIC"))
            .build()?;

        let mut settings: Settings = cfg.try_deserialize()?;

        // Env fallback shared with other Anthropic tooling.
        if settings.api_key.is_empty() {
            if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
                if !key.is_empty() {
                    debug!("Using API key from ANTHROPIC_API_KEY");
                    settings.api_key = key;
                }
            }
        }

        Ok(settings)
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
