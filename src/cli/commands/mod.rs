//! CLI command implementations.

pub mod classify;
pub mod config;
pub mod resume;
pub mod run;
pub mod score;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::http::{
    GeminiClient, HttpCalendarService, HttpPromptService, HttpVisualizationService,
};
use crate::adapters::mock::{
    MockCalendarService, MockNarrativeClient, MockPromptService, MockVisualizationService,
};
use crate::domain::models::Config;
use crate::services::Orchestrator;

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Wire an orchestrator to the HTTP collaborators, or to canned in-process
/// ones when `offline` is set.
pub async fn build_orchestrator(config: &Config, offline: bool) -> Result<Orchestrator> {
    if offline {
        tracing::info!("Using offline collaborators");
        return Ok(Orchestrator::new(
            Arc::new(MockCalendarService::default()),
            Arc::new(MockNarrativeClient::offline().await),
            Arc::new(MockPromptService::new()),
            Arc::new(MockVisualizationService::default()),
            config.pipeline.clone(),
        ));
    }

    let services = &config.services;
    let narrative = GeminiClient::new(services.narrative.clone())
        .context("Failed to create narrative client")?;
    Ok(Orchestrator::new(
        Arc::new(HttpCalendarService::new(services)?),
        Arc::new(narrative),
        Arc::new(HttpPromptService::new(services)?),
        Arc::new(HttpVisualizationService::new(services)?),
        config.pipeline.clone(),
    ))
}
