use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

/// A node of the fixed report pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    Chart,
    #[serde(alias = "hidden_stems")]
    HiddenStems,
    Baseline,
    Personality,
    Aptitude,
    Fortune,
    Scoring,
    Visualization,
    Finalize,
    Complete,
}

impl PipelineStep {
    /// Every step in execution order.
    pub const ALL: [Self; 10] = [
        Self::Chart,
        Self::HiddenStems,
        Self::Baseline,
        Self::Personality,
        Self::Aptitude,
        Self::Fortune,
        Self::Scoring,
        Self::Visualization,
        Self::Finalize,
        Self::Complete,
    ];

    /// The three domain steps that run concurrently after `Baseline`.
    pub const DOMAINS: [Self; 3] = [Self::Personality, Self::Aptitude, Self::Fortune];

    /// Position in [`Self::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Kebab-case name used in logs, envelopes and the CLI.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::HiddenStems => "hidden-stems",
            Self::Baseline => "baseline",
            Self::Personality => "personality",
            Self::Aptitude => "aptitude",
            Self::Fortune => "fortune",
            Self::Scoring => "scoring",
            Self::Visualization => "visualization",
            Self::Finalize => "finalize",
            Self::Complete => "complete",
        }
    }

    /// Deadline applied when the config has no override. 0 means none.
    pub const fn default_timeout_ms(self) -> u64 {
        match self {
            Self::Chart => 10_000,
            Self::HiddenStems => 5_000,
            Self::Baseline => 15_000,
            Self::Personality | Self::Aptitude | Self::Fortune => 12_000,
            Self::Scoring => 2_000,
            Self::Visualization => 8_000,
            Self::Finalize => 3_000,
            Self::Complete => 0,
        }
    }

    /// This step followed by every later step.
    pub fn suffix(self) -> &'static [Self] {
        &Self::ALL[self.index()..]
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStep {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "chart" | "manseryeok" => Ok(Self::Chart),
            "hidden-stems" | "jijanggan" => Ok(Self::HiddenStems),
            "baseline" | "basic-analysis" => Ok(Self::Baseline),
            "personality" => Ok(Self::Personality),
            "aptitude" => Ok(Self::Aptitude),
            "fortune" => Ok(Self::Fortune),
            "scoring" => Ok(Self::Scoring),
            "visualization" => Ok(Self::Visualization),
            "finalize" | "saving" => Ok(Self::Finalize),
            "complete" => Ok(Self::Complete),
            _ => Err(DomainError::InvalidInput(format!("unknown pipeline step '{s}'"))),
        }
    }
}

/// Lifecycle of one step inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    NotStarted,
    Running,
    Done,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
