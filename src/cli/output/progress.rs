//! Progress bar observer for interactive runs.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

use crate::domain::errors::ErrorInfo;
use crate::domain::models::{PipelineStep, RunProgress};
use crate::domain::ports::RunObserver;

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Renders [`RunProgress`] updates as a percentage bar on stderr.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(PROGRESS_CHARS),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// An observer that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for ProgressObserver {
    fn on_progress(&self, progress: &RunProgress) {
        self.bar.set_position(u64::from(progress.progress_percent));
        self.bar.set_message(format!(
            "{} (~{}s left)",
            progress.current_step,
            progress.estimated_remaining_ms / 1000
        ));
    }

    fn on_step_complete(&self, step: PipelineStep, _output: &Value) {
        tracing::debug!(step = %step, "Step output received");
    }

    fn on_error(&self, step: PipelineStep, error: &ErrorInfo) {
        self.bar.println(format!("✗ {step}: {} ({})", error.message, error.kind));
    }
}
