//! `saju config`: print the effective configuration.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl ConfigOutput {
    /// Copy of `config` with the API key masked.
    pub fn redacted(config: &Config) -> Self {
        let mut config = config.clone();
        if let Some(key) = config.services.narrative.api_key.as_mut() {
            *key = "****".to_string();
        }
        Self { config }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }
}

pub fn execute(_args: &ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    output(&ConfigOutput::redacted(config), json_mode);
    Ok(())
}
