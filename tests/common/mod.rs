//! Shared builders for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use saju_engine::adapters::mock::{
    sample_chart, MockCalendarService, MockNarrativeClient, MockPromptService,
    MockVisualizationService,
};
use saju_engine::{Orchestrator, PipelineConfig, RunInput};

/// Collaborators kept alive alongside the orchestrator so tests can inspect them.
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub narrative: Arc<MockNarrativeClient>,
    pub prompts: Arc<MockPromptService>,
    pub calendar: Arc<MockCalendarService>,
}

pub struct HarnessBuilder {
    config: PipelineConfig,
    narrative: Option<MockNarrativeClient>,
    prompts: MockPromptService,
    calendar: MockCalendarService,
    visualization: MockVisualizationService,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: fast_config(),
            narrative: None,
            prompts: MockPromptService::new(),
            calendar: MockCalendarService::default(),
            visualization: MockVisualizationService::default(),
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn narrative(mut self, narrative: MockNarrativeClient) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub fn prompts(mut self, prompts: MockPromptService) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn calendar(mut self, calendar: MockCalendarService) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn visualization(mut self, visualization: MockVisualizationService) -> Self {
        self.visualization = visualization;
        self
    }

    pub async fn build(self) -> Harness {
        let narrative = Arc::new(match self.narrative {
            Some(n) => n,
            None => MockNarrativeClient::offline().await,
        });
        let prompts = Arc::new(self.prompts);
        let calendar = Arc::new(self.calendar);
        let orchestrator = Orchestrator::new(
            calendar.clone(),
            narrative.clone(),
            prompts.clone(),
            Arc::new(self.visualization),
            self.config,
        );
        Harness {
            orchestrator,
            narrative,
            prompts,
            calendar,
        }
    }
}

/// Default policy with short backoff so retries do not slow real-clock tests.
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        initial_backoff_ms: 10,
        max_backoff_ms: 40,
        ..Default::default()
    }
}

pub fn chart_input() -> RunInput {
    RunInput {
        chart: Some(sample_chart()),
        ..Default::default()
    }
}
