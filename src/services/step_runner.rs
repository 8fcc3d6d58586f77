//! Per-step execution with deadline, bounded retry and status bookkeeping.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{timeout, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PipelineConfig, PipelineStep, StepStatus};
use crate::domain::ports::RunObserver;
use crate::services::run_state::RunState;

/// Per-call overrides for [`StepRunner::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StepOptions {
    /// Make exactly one attempt.
    pub skip_retry: bool,
    /// Deadline in milliseconds, replacing the configured one. 0 disables it.
    pub timeout_ms: Option<u64>,
}

impl StepOptions {
    /// Single attempt under the configured deadline.
    pub const fn no_retry() -> Self {
        Self {
            skip_retry: true,
            timeout_ms: None,
        }
    }
}

/// Runs one step's work under the configured deadline and retry policy,
/// keeping the shared [`RunState`] and the observer up to date.
#[derive(Clone)]
pub struct StepRunner {
    state: Arc<RwLock<RunState>>,
    config: PipelineConfig,
    observer: Arc<dyn RunObserver>,
    cancel: CancellationToken,
}

impl StepRunner {
    /// Runner sharing `state` with the orchestrator and stopping when `cancel` fires.
    pub fn new(
        state: Arc<RwLock<RunState>>,
        config: PipelineConfig,
        observer: Arc<dyn RunObserver>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state,
            config,
            observer,
            cancel,
        }
    }

    /// Execute `work` for `step`.
    ///
    /// `work` is called once per attempt. Non-retryable errors and
    /// cancellation end the step immediately; retryable errors are retried up
    /// to `retry_count` times with exponential backoff.
    pub async fn run<T, F, Fut>(
        &self,
        step: PipelineStep,
        options: StepOptions,
        mut work: F,
    ) -> DomainResult<T>
    where
        T: Serialize,
        F: FnMut() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        self.transition(step, StepStatus::Running).await;
        self.notify_progress(step).await;

        let started = Instant::now();
        let timeout_ms = options
            .timeout_ms
            .unwrap_or_else(|| self.config.timeout_ms(step));
        let retries = if options.skip_retry {
            0
        } else {
            self.config.retry_count
        };

        let mut attempt = 0u32;
        let outcome = loop {
            if self.cancel.is_cancelled() {
                break Err(DomainError::Cancelled);
            }

            debug!(step = %step, attempt, timeout_ms, "Starting step attempt");
            let result = tokio::select! {
                () = self.cancel.cancelled() => Err(DomainError::Cancelled),
                r = with_deadline(step, timeout_ms, work()) => r,
            };

            match result {
                Ok(value) => break Ok(value),
                Err(err) if !err.is_retryable() || attempt >= retries => break Err(err),
                Err(err) => {
                    let delay = self.config.backoff(attempt);
                    attempt += 1;
                    warn!(
                        step = %step,
                        attempt,
                        max_retries = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Step attempt failed, retrying"
                    );
                    tokio::select! {
                        () = self.cancel.cancelled() => break Err(DomainError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(value) => {
                {
                    let mut state = self.state.write().await;
                    state.record_duration(step, elapsed_ms);
                    state.set_status(step, StepStatus::Done);
                }
                let output = serde_json::to_value(&value).unwrap_or_else(|e| {
                    warn!(step = %step, error = %e, "Step output is not serializable");
                    serde_json::Value::Null
                });
                self.observer.on_step_complete(step, &output);
                self.notify_progress(step).await;
                Ok(value)
            }
            Err(err) => {
                let info = err.to_info();
                {
                    let mut state = self.state.write().await;
                    state.record_duration(step, elapsed_ms);
                    state.record_failure(step, info.clone());
                }
                self.observer.on_error(step, &info);
                Err(err)
            }
        }
    }

    /// Mark a step done without running it.
    pub async fn mark_done(&self, step: PipelineStep) {
        self.transition(step, StepStatus::Done).await;
        self.notify_progress(step).await;
    }

    async fn transition(&self, step: PipelineStep, status: StepStatus) {
        self.state.write().await.set_status(step, status);
    }

    async fn notify_progress(&self, step: PipelineStep) {
        let progress = self.state.read().await.progress(step);
        self.observer.on_progress(&progress);
    }
}

/// Await `fut` for at most `timeout_ms`, 0 meaning no deadline.
pub(crate) async fn with_deadline<T, Fut>(
    step: PipelineStep,
    timeout_ms: u64,
    fut: Fut,
) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    if timeout_ms == 0 {
        return fut.await;
    }
    timeout(Duration::from_millis(timeout_ms), fut)
        .await
        .unwrap_or(Err(DomainError::Timeout { step, timeout_ms }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ErrorInfo, ErrorKind};
    use crate::domain::models::RunProgress;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        completed: Mutex<Vec<PipelineStep>>,
        outputs: Mutex<Vec<Value>>,
        errors: Mutex<Vec<(PipelineStep, ErrorKind)>>,
        progress: Mutex<Vec<u8>>,
    }

    impl RunObserver for RecordingObserver {
        fn on_progress(&self, progress: &RunProgress) {
            self.progress.lock().unwrap().push(progress.progress_percent);
        }

        fn on_step_complete(&self, step: PipelineStep, output: &Value) {
            self.completed.lock().unwrap().push(step);
            self.outputs.lock().unwrap().push(output.clone());
        }

        fn on_error(&self, step: PipelineStep, error: &ErrorInfo) {
            self.errors.lock().unwrap().push((step, error.kind));
        }
    }

    fn runner(config: PipelineConfig) -> (StepRunner, Arc<RwLock<RunState>>, Arc<RecordingObserver>) {
        let state = Arc::new(RwLock::new(RunState::new(&config)));
        let observer = Arc::new(RecordingObserver::default());
        let runner = StepRunner::new(
            state.clone(),
            config,
            observer.clone(),
            CancellationToken::new(),
        );
        (runner, state, observer)
    }

    #[tokio::test]
    async fn test_success_marks_done_and_notifies() {
        let (runner, state, observer) = runner(PipelineConfig::default());

        let value = runner
            .run(PipelineStep::Scoring, StepOptions::default(), || async { Ok(7u32) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(state.read().await.status(PipelineStep::Scoring), StepStatus::Done);
        assert!(state.read().await.step_durations().contains_key(&PipelineStep::Scoring));
        assert_eq!(*observer.completed.lock().unwrap(), vec![PipelineStep::Scoring]);
        assert_eq!(observer.progress.lock().unwrap().len(), 2);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[tokio::test]
    async fn test_unserializable_output_still_completes() {
        let (runner, state, observer) = runner(PipelineConfig::default());

        let result = runner
            .run(PipelineStep::Finalize, StepOptions::default(), || async {
                Ok(Unserializable)
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(state.read().await.status(PipelineStep::Finalize), StepStatus::Done);
        assert_eq!(*observer.outputs.lock().unwrap(), vec![Value::Null]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retried_then_fails() {
        let mut config = PipelineConfig {
            retry_count: 1,
            ..Default::default()
        };
        config.step_timeouts_ms.insert(PipelineStep::Personality, 100);
        let (runner, state, observer) = runner(config);
        let attempts = AtomicU32::new(0);

        let result: DomainResult<()> = runner
            .run(PipelineStep::Personality, StepOptions::default(), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(())
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Timeout { step: PipelineStep::Personality, timeout_ms: 100 })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(state.read().await.status(PipelineStep::Personality), StepStatus::Failed);
        assert_eq!(
            *observer.errors.lock().unwrap(),
            vec![(PipelineStep::Personality, ErrorKind::Timeout)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_on_first_attempt() {
        let (runner, _state, _observer) = runner(PipelineConfig {
            retry_count: 3,
            ..Default::default()
        });
        let attempts = AtomicU32::new(0);

        let result: DomainResult<()> = runner
            .run(PipelineStep::Baseline, StepOptions::default(), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::ParseFailure("missing summary".into())) }
            })
            .await;

        assert!(matches!(result, Err(DomainError::ParseFailure(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_then_success() {
        let (runner, state, _observer) = runner(PipelineConfig {
            retry_count: 2,
            ..Default::default()
        });
        let attempts = AtomicU32::new(0);

        let result = runner
            .run(PipelineStep::Aptitude, StepOptions::default(), || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DomainError::RateLimited("slow down".into()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(state.read().await.status(PipelineStep::Aptitude), StepStatus::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_retry_makes_one_attempt() {
        let (runner, _state, _observer) = runner(PipelineConfig {
            retry_count: 5,
            ..Default::default()
        });
        let attempts = AtomicU32::new(0);

        let result: DomainResult<()> = runner
            .run(PipelineStep::Chart, StepOptions::no_retry(), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::RemoteError("503".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_attempt() {
        let config = PipelineConfig::default();
        let state = Arc::new(RwLock::new(RunState::new(&config)));
        let cancel = CancellationToken::new();
        let runner = StepRunner::new(state, config, Arc::new(RecordingObserver::default()), cancel.clone());
        cancel.cancel();

        let attempts = AtomicU32::new(0);
        let result: DomainResult<()> = runner
            .run(PipelineStep::Chart, StepOptions::default(), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert_eq!(result, Err(DomainError::Cancelled));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_means_no_deadline() {
        let (runner, _state, _observer) = runner(PipelineConfig::default());
        let options = StepOptions {
            skip_retry: false,
            timeout_ms: Some(0),
        };

        let result = runner
            .run(PipelineStep::Finalize, options, || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(1u8)
            })
            .await;

        assert_eq!(result, Ok(1));
    }
}
