use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BasicAnalysis, CategoryHistogram, DecadePeriod, FourPillars, HiddenStems, PipelineStep,
};

/// Which narrative prompt to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Basic,
    Personality,
    Aptitude,
    Fortune,
}

impl PromptKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Personality => "personality",
            Self::Aptitude => "aptitude",
            Self::Fortune => "fortune",
        }
    }

    /// Prompt kind of a narrative step; `None` for every other step.
    pub const fn for_step(step: PipelineStep) -> Option<Self> {
        match step {
            PipelineStep::Baseline => Some(Self::Basic),
            PipelineStep::Personality => Some(Self::Personality),
            PipelineStep::Aptitude => Some(Self::Aptitude),
            PipelineStep::Fortune => Some(Self::Fortune),
            _ => None,
        }
    }
}

/// Earlier outputs passed along to later prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_analysis: Option<BasicAnalysis>,
}

/// Everything the prompt service needs to build one step's prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub step: PromptKind,
    pub language: String,
    pub pillars: FourPillars,
    #[serde(rename = "daewun")]
    pub decade_cycles: Vec<DecadePeriod>,
    #[serde(rename = "jijanggan", skip_serializing_if = "Option::is_none")]
    pub hidden_stems: Option<HiddenStems>,
    /// Baseline output; absent for the baseline step itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_results: Option<PreviousResults>,
    /// Category histogram; only sent for the domain steps.
    #[serde(rename = "tenGodCounts", skip_serializing_if = "Option::is_none")]
    pub histogram: Option<CategoryHistogram>,
}

/// Assembles the prompt text for a narrative step.
#[async_trait]
pub trait PromptService: Send + Sync {
    async fn build(&self, request: &PromptRequest) -> DomainResult<String>;
}
