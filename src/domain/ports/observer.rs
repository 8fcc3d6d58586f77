//! Run observer port.

use serde_json::Value;

use crate::domain::errors::ErrorInfo;
use crate::domain::models::{PipelineStep, RunProgress};

/// Receives notifications after every step status transition.
///
/// Callbacks run inline on the pipeline task and must not block.
pub trait RunObserver: Send + Sync {
    fn on_progress(&self, _progress: &RunProgress) {}

    fn on_step_complete(&self, _step: PipelineStep, _output: &Value) {}

    fn on_error(&self, _step: PipelineStep, _error: &ErrorInfo) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Observer that turns notifications into structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_progress(&self, progress: &RunProgress) {
        tracing::debug!(
            run_id = %progress.run_id,
            step = %progress.current_step,
            percent = progress.progress_percent,
            remaining_ms = progress.estimated_remaining_ms,
            "Run progress"
        );
    }

    fn on_step_complete(&self, step: PipelineStep, _output: &Value) {
        tracing::info!(step = %step, "Step completed");
    }

    fn on_error(&self, step: PipelineStep, error: &ErrorInfo) {
        tracing::error!(step = %step, kind = %error.kind, error = %error.message, "Step failed");
    }
}
