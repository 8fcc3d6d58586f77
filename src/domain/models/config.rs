use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::step::PipelineStep;

/// Main configuration structure for the report pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Step execution policy
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Remote collaborator endpoints
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; no file output when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default = "default_enable_stdout")]
    pub enable_stdout: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_enable_stdout() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
            enable_stdout: default_enable_stdout(),
        }
    }
}

/// Step execution policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Retries per step after the first attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Run the three domain steps concurrently
    #[serde(default = "default_enable_parallel")]
    pub enable_parallel: bool,

    /// Backoff before the first retry, doubled per attempt
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for a single backoff
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Default report language
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-step deadline overrides in milliseconds; 0 disables the deadline
    #[serde(default)]
    pub step_timeouts_ms: BTreeMap<PipelineStep, u64>,
}

const fn default_retry_count() -> u32 {
    1
}

const fn default_enable_parallel() -> bool {
    true
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    8000
}

fn default_language() -> String {
    "ko".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            enable_parallel: default_enable_parallel(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            language: default_language(),
            step_timeouts_ms: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Configured deadline for `step` in milliseconds, 0 meaning none.
    pub fn timeout_ms(&self, step: PipelineStep) -> u64 {
        self.step_timeouts_ms
            .get(&step)
            .copied()
            .unwrap_or_else(|| step.default_timeout_ms())
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let ms = self.initial_backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Remote collaborator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServicesConfig {
    /// Base URL of the calendar, prompt and visualization API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout for the calendar, prompt and visualization API
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub narrative: NarrativeConfig,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_api_timeout_secs() -> u64 {
    30
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_api_timeout_secs(),
            narrative: NarrativeConfig::default(),
        }
    }
}

/// Narrative-generation (Gemini) client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NarrativeConfig {
    /// API key (prefer `SAJU_SERVICES__NARRATIVE__API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_narrative_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Transport timeout in seconds
    #[serde(default = "default_narrative_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_narrative_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_output_tokens() -> u32 {
    8192
}

const fn default_top_p() -> f32 {
    0.8
}

const fn default_top_k() -> u32 {
    40
}

const fn default_narrative_timeout_secs() -> u64 {
    60
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_narrative_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            timeout_secs: default_narrative_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_override_falls_back_to_default() {
        let mut config = PipelineConfig::default();
        assert_eq!(config.timeout_ms(PipelineStep::Baseline), 15_000);

        config.step_timeouts_ms.insert(PipelineStep::Baseline, 100);
        assert_eq!(config.timeout_ms(PipelineStep::Baseline), 100);
        assert_eq!(config.timeout_ms(PipelineStep::Complete), 0);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = PipelineConfig {
            initial_backoff_ms: 1000,
            max_backoff_ms: 5000,
            ..Default::default()
        };
        assert_eq!(config.backoff(0), Duration::from_millis(1000));
        assert_eq!(config.backoff(1), Duration::from_millis(2000));
        assert_eq!(config.backoff(2), Duration::from_millis(4000));
        assert_eq!(config.backoff(3), Duration::from_millis(5000));
        assert_eq!(config.backoff(64), Duration::from_millis(5000));
    }

    #[test]
    fn test_step_timeouts_deserialize_from_snake_keys() {
        let yaml = "retry_count: 2\nstep_timeouts_ms:\n  hidden_stems: 50\n  personality: 100\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.retry_count, 2);
        assert_eq!(config.timeout_ms(PipelineStep::HiddenStems), 50);
        assert_eq!(config.timeout_ms(PipelineStep::Personality), 100);
        assert!(config.enable_parallel);
    }
}
