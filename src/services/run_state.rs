//! Mutable state of one run: outputs, step statuses, timings and token counters.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::errors::ErrorInfo;
use crate::domain::models::{
    IntermediateResults, PipelineConfig, PipelineStep, RunProgress, StepStatus, TokenUsage,
};

/// Accumulated state of a run.
///
/// Lives behind an `Arc<RwLock<_>>` in the orchestrator. Token counters are
/// atomic so concurrent steps can record usage while holding only a read lock.
#[derive(Debug)]
pub struct RunState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    started: Instant,
    outputs: IntermediateResults,
    statuses: BTreeMap<PipelineStep, StepStatus>,
    durations: BTreeMap<PipelineStep, u64>,
    failures: BTreeMap<PipelineStep, ErrorInfo>,
    timeouts_ms: BTreeMap<PipelineStep, u64>,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl RunState {
    /// Empty state with every step not started and timeouts taken from `config`.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            started: Instant::now(),
            outputs: IntermediateResults::default(),
            statuses: not_started(),
            durations: BTreeMap::new(),
            failures: BTreeMap::new(),
            timeouts_ms: PipelineStep::ALL
                .iter()
                .map(|s| (*s, config.timeout_ms(*s)))
                .collect(),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
        }
    }

    /// Reset everything and stamp a new start time.
    pub fn start(&mut self) {
        self.run_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.started = Instant::now();
        self.outputs = IntermediateResults::default();
        self.statuses = not_started();
        self.durations.clear();
        self.failures.clear();
        self.input_tokens.store(0, Ordering::Relaxed);
        self.output_tokens.store(0, Ordering::Relaxed);
    }

    /// Restore prior outputs verbatim and mark every step before `from_step` done.
    pub fn hydrate(&mut self, outputs: IntermediateResults, from_step: PipelineStep) {
        self.start();
        self.outputs = outputs;
        for step in PipelineStep::ALL {
            let status = if step < from_step {
                StepStatus::Done
            } else {
                StepStatus::NotStarted
            };
            self.statuses.insert(step, status);
        }
        tracing::info!(run_id = %self.run_id, from_step = %from_step, "Run state hydrated");
    }

    /// Identifier stamped by the last `start` or `hydrate`.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Outputs recorded so far.
    pub const fn outputs(&self) -> &IntermediateResults {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut IntermediateResults {
        &mut self.outputs
    }

    /// Current status of `step`; unknown steps read as not started.
    pub fn status(&self, step: PipelineStep) -> StepStatus {
        self.statuses.get(&step).copied().unwrap_or_default()
    }

    /// Overwrite the status of `step`.
    pub fn set_status(&mut self, step: PipelineStep, status: StepStatus) {
        self.statuses.insert(step, status);
    }

    /// Wall time of the last attempt sequence for `step`.
    pub fn record_duration(&mut self, step: PipelineStep, elapsed_ms: u64) {
        self.durations.insert(step, elapsed_ms);
    }

    /// Mark `step` failed and keep the error for the failure envelope.
    pub fn record_failure(&mut self, step: PipelineStep, error: ErrorInfo) {
        self.statuses.insert(step, StepStatus::Failed);
        self.failures.insert(step, error);
    }

    pub fn failure(&self, step: PipelineStep) -> Option<&ErrorInfo> {
        self.failures.get(&step)
    }

    /// Recorded durations keyed by step.
    pub fn step_durations(&self) -> &BTreeMap<PipelineStep, u64> {
        &self.durations
    }

    /// Configured deadline of `step` in milliseconds.
    pub fn timeout_ms(&self, step: PipelineStep) -> u64 {
        self.timeouts_ms.get(&step).copied().unwrap_or(0)
    }

    /// First failed step in pipeline order.
    pub fn first_failed_step(&self) -> Option<PipelineStep> {
        PipelineStep::ALL
            .into_iter()
            .find(|s| self.status(*s) == StepStatus::Failed)
    }

    /// Percent complete and an upper bound on the remaining time.
    ///
    /// `complete` is excluded from the denominator since it never runs work.
    pub fn progress(&self, current_step: PipelineStep) -> RunProgress {
        let done = self
            .statuses
            .values()
            .filter(|s| **s == StepStatus::Done)
            .count();
        let denominator = PipelineStep::ALL.len() - 1;
        let percent = (done * 100 / denominator).min(100) as u8;

        let remaining: u64 = PipelineStep::ALL
            .iter()
            .filter(|s| self.status(**s) != StepStatus::Done)
            .map(|s| self.timeout_ms(*s))
            .sum();

        RunProgress {
            run_id: self.run_id,
            current_step,
            step_statuses: self.statuses.clone(),
            progress_percent: percent,
            estimated_remaining_ms: remaining,
            started_at: self.started_at,
            updated_at: Utc::now(),
        }
    }

    /// Add one narrative call's token counts.
    pub fn add_token_usage(&self, input: u64, output: u64) {
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
    }

    /// Snapshot of the token counters.
    pub fn token_usage(&self) -> TokenUsage {
        TokenUsage::new(
            self.input_tokens.load(Ordering::Relaxed),
            self.output_tokens.load(Ordering::Relaxed),
        )
    }

    /// Milliseconds since the run started.
    pub fn total_duration_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

fn not_started() -> BTreeMap<PipelineStep, StepStatus> {
    PipelineStep::ALL
        .iter()
        .map(|s| (*s, StepStatus::NotStarted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use crate::domain::models::Visualization;

    fn state() -> RunState {
        RunState::new(&PipelineConfig::default())
    }

    #[test]
    fn test_start_resets_everything() {
        let mut state = state();
        state.set_status(PipelineStep::Chart, StepStatus::Done);
        state.record_duration(PipelineStep::Chart, 12);
        state.add_token_usage(5, 5);
        state.outputs_mut().visualization = Some(Visualization::default());

        let old_id = state.run_id();
        state.start();

        assert_ne!(state.run_id(), old_id);
        assert_eq!(state.status(PipelineStep::Chart), StepStatus::NotStarted);
        assert!(state.step_durations().is_empty());
        assert_eq!(state.token_usage(), TokenUsage::default());
        assert!(state.outputs().visualization.is_none());
    }

    #[test]
    fn test_hydrate_marks_prefix_done() {
        let mut state = state();
        let outputs = IntermediateResults {
            visualization: Some(Visualization {
                pillar_image: "abc".into(),
            }),
            ..Default::default()
        };
        state.hydrate(outputs.clone(), PipelineStep::Scoring);

        assert_eq!(state.outputs(), &outputs);
        for step in PipelineStep::ALL {
            let expected = if step < PipelineStep::Scoring {
                StepStatus::Done
            } else {
                StepStatus::NotStarted
            };
            assert_eq!(state.status(step), expected, "{step}");
        }
    }

    #[test]
    fn test_progress_counts_done_over_nine() {
        let mut state = state();
        let progress = state.progress(PipelineStep::Chart);
        assert_eq!(progress.progress_percent, 0);
        let all: u64 = PipelineStep::ALL.iter().map(|s| s.default_timeout_ms()).sum();
        assert_eq!(progress.estimated_remaining_ms, all);

        for step in &PipelineStep::ALL[..3] {
            state.set_status(*step, StepStatus::Done);
        }
        let progress = state.progress(PipelineStep::Personality);
        assert_eq!(progress.progress_percent, 33);
        assert_eq!(progress.estimated_remaining_ms, all - 10_000 - 5_000 - 15_000);

        for step in PipelineStep::ALL {
            state.set_status(step, StepStatus::Done);
        }
        assert_eq!(state.progress(PipelineStep::Complete).progress_percent, 100);
    }

    #[test]
    fn test_first_failed_step_uses_pipeline_order() {
        let mut state = state();
        let info = ErrorInfo {
            kind: ErrorKind::RemoteError,
            message: "x".into(),
        };
        state.record_failure(PipelineStep::Fortune, info.clone());
        state.record_failure(PipelineStep::Personality, info);
        assert_eq!(state.first_failed_step(), Some(PipelineStep::Personality));
        assert_eq!(
            state.failure(PipelineStep::Fortune).map(|e| e.kind),
            Some(ErrorKind::RemoteError)
        );
    }

    #[test]
    fn test_token_usage_accumulates() {
        let state = state();
        state.add_token_usage(100, 20);
        state.add_token_usage(50, 5);
        assert_eq!(state.token_usage(), TokenUsage::new(150, 25));
    }
}
