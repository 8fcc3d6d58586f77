use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".saju";

/// Prefix for environment overrides; nested keys are split on `__`.
pub const ENV_PREFIX: &str = "SAJU_";

/// Reasons a merged configuration is rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid retry_count: {0}. Must be at most 10")]
    InvalidRetryCount(u32),

    #[error("Report language cannot be empty")]
    EmptyLanguage,

    #[error("Service URL cannot be empty: {0}")]
    EmptyServiceUrl(&'static str),

    #[error("Invalid narrative temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.saju/config.yaml`
    /// 3. `.saju/local.yaml`
    /// 4. `SAJU_*` environment variables
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same layering as [`ConfigLoader::load`], rooted at `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if !["json", "pretty"].contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if !["daily", "hourly", "never"].contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let pipeline = &config.pipeline;
        if pipeline.initial_backoff_ms > pipeline.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                pipeline.initial_backoff_ms,
                pipeline.max_backoff_ms,
            ));
        }

        if pipeline.retry_count > 10 {
            return Err(ConfigError::InvalidRetryCount(pipeline.retry_count));
        }

        if pipeline.language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }

        if config.services.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyServiceUrl("services.api_base_url"));
        }

        let narrative = &config.services.narrative;
        if narrative.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyServiceUrl("services.narrative.base_url"));
        }

        if !(0.0..=2.0).contains(&narrative.temperature) {
            return Err(ConfigError::InvalidTemperature(narrative.temperature));
        }

        Ok(())
    }
}
