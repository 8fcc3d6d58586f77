use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::chart::ChartData;
use super::report::{FinalReport, IntermediateResults};
use super::step::{PipelineStep, StepStatus};
use crate::domain::errors::ErrorInfo;

/// Pipeline schema version reported in run metadata.
pub const PIPELINE_VERSION: &str = "2.1.0";

/// Narrative-service token consumption for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Counts with `total_tokens` derived from the two sides.
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Biological sex as accepted by the calendar service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Birth data used to compute a chart when none is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthRequest {
    /// Local birth date, `YYYY-MM-DD`.
    pub birth_date: String,
    /// Local birth time, `HH:MM`.
    pub birth_time: String,
    pub timezone: String,
    #[serde(default)]
    pub is_lunar: bool,
    pub gender: Sex,
}

/// Input to a single run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    /// A precomputed chart; takes priority over `birth`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<BirthRequest>,
    /// Overrides the configured report language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Snapshot emitted to observers after each status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    pub run_id: Uuid,
    pub current_step: PipelineStep,
    pub step_statuses: BTreeMap<PipelineStep, StepStatus>,
    pub progress_percent: u8,
    pub estimated_remaining_ms: u64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Timing and accounting attached to a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub total_duration_ms: u64,
    pub step_durations: BTreeMap<PipelineStep, u64>,
    pub parallel_executed: bool,
    pub version: String,
    pub token_usage: TokenUsage,
}

/// Outcome of `execute` / `execute_from_step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    Success {
        report: FinalReport,
        outputs: IntermediateResults,
        metadata: RunMetadata,
    },
    Failure {
        error: ErrorInfo,
        #[serde(rename = "partialOutputs")]
        partial_outputs: IntermediateResults,
        #[serde(rename = "failedStep")]
        failed_step: PipelineStep,
        #[serde(rename = "tokenUsage")]
        token_usage: TokenUsage,
    },
}

impl RunResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Outputs accumulated by the run, whether it completed or not.
    pub const fn outputs(&self) -> &IntermediateResults {
        match self {
            Self::Success { outputs, .. } => outputs,
            Self::Failure { partial_outputs, .. } => partial_outputs,
        }
    }

    /// Tokens spent by the run, whichever way it ended.
    pub const fn token_usage(&self) -> TokenUsage {
        match self {
            Self::Success { metadata, .. } => metadata.token_usage,
            Self::Failure { token_usage, .. } => *token_usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(120, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_failure_envelope_shape() {
        let result = RunResult::Failure {
            error: ErrorInfo {
                kind: ErrorKind::RemoteError,
                message: "boom".into(),
            },
            partial_outputs: IntermediateResults::default(),
            failed_step: PipelineStep::Aptitude,
            token_usage: TokenUsage::new(10, 5),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["failedStep"], "aptitude");
        assert_eq!(json["error"]["kind"], "REMOTE_ERROR");
        assert_eq!(json["tokenUsage"]["totalTokens"], 15);
        assert!(!result.is_success());
    }

    #[test]
    fn test_birth_request_wire_format() {
        let json = serde_json::json!({
            "birthDate": "1990-05-15",
            "birthTime": "14:30",
            "timezone": "GMT+9",
            "gender": "female"
        });
        let request: BirthRequest = serde_json::from_value(json).unwrap();
        assert!(!request.is_lunar);
        assert_eq!(request.gender, Sex::Female);
    }
}
