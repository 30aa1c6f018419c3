//! Configuration loading for topic suggestions.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/topic-suggest/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SuggestError;

/// Tuning for the aggregator and its candidate sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Cap applied to the tag and search sources after shuffling.
    #[serde(default = "default_max_source_candidates")]
    pub max_source_candidates: usize,

    /// How many of the most recent category topics the fallback reads.
    #[serde(default = "default_category_fallback_limit")]
    pub category_fallback_limit: usize,

    /// Seed for the candidate shuffler. Unset means OS entropy.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

fn default_max_source_candidates() -> usize {
    10
}

fn default_category_fallback_limit() -> usize {
    10
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_source_candidates: default_max_source_candidates(),
            category_fallback_limit: default_category_fallback_limit(),
            shuffle_seed: None,
        }
    }
}

impl SuggestConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_source_candidates == 0 {
            return Err("max_source_candidates must be > 0".to_string());
        }
        if self.category_fallback_limit == 0 {
            return Err("category_fallback_limit must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON fixture backing the in-memory collaborators
    #[serde(default)]
    pub fixture_path: Option<String>,

    /// Cutoff in months applied when the caller gives none
    #[serde(default)]
    pub default_cutoff_months: u32,

    /// Upper bound on a single suggestion request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Aggregator tuning
    #[serde(default)]
    pub suggest: SuggestConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            fixture_path: None,
            default_cutoff_months: 0,
            request_timeout_ms: default_request_timeout_ms(),
            suggest: SuggestConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/topic-suggest/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (SUGGEST_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SuggestError> {
        let config_dir = ProjectDirs::from("", "", "topic-suggest")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| SuggestError::Config(e.to_string()))?
            .set_default("default_cutoff_months", 0_i64)
            .map_err(|e| SuggestError::Config(e.to_string()))?
            .set_default("request_timeout_ms", default_request_timeout_ms() as i64)
            .map_err(|e| SuggestError::Config(e.to_string()))?
            .set_default(
                "suggest.max_source_candidates",
                default_max_source_candidates() as i64,
            )
            .map_err(|e| SuggestError::Config(e.to_string()))?
            .set_default(
                "suggest.category_fallback_limit",
                default_category_fallback_limit() as i64,
            )
            .map_err(|e| SuggestError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SUGGEST_LOG_LEVEL, SUGGEST_SUGGEST__SHUFFLE_SEED, ...
        builder = builder.add_source(
            Environment::with_prefix("SUGGEST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| SuggestError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| SuggestError::Config(e.to_string()))?;

        settings.suggest.validate().map_err(SuggestError::Config)?;
        Ok(settings)
    }
}
