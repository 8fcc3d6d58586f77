//! Configuration management
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - `.saju/config.yaml` and `.saju/local.yaml`
//! - `SAJU_*` environment overrides

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
