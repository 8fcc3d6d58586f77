//! Report pipeline orchestrator.
//!
//! Runs the fixed step graph
//! `chart → hidden-stems → baseline → {personality, aptitude, fortune} →
//! scoring → visualization → finalize → complete`, persisting each step's
//! output in the shared [`RunState`] so a failed run can be resumed.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ChartData, HiddenStems, IntermediateResults, NarrativeOutput, PipelineConfig, PipelineStep,
    RunInput, RunMetadata, RunResult, Visualization, PIPELINE_VERSION,
};
use crate::domain::ports::{
    CalendarService, NarrativeClient, NoopObserver, PreviousResults, PromptKind, PromptRequest,
    PromptService, RunObserver, VisualizationService,
};
use crate::services::fallback_prompts::fallback_prompt;
use crate::services::report_builder::build_report;
use crate::services::response_parser::parse_output;
use crate::services::run_state::RunState;
use crate::services::scoring;
use crate::services::step_runner::{with_deadline, StepOptions, StepRunner};

/// Per-run values shared by every step.
struct RunContext<'a> {
    runner: StepRunner,
    state: Arc<RwLock<RunState>>,
    input: &'a RunInput,
    language: String,
    from: PipelineStep,
}

/// Drives a run through the step graph.
pub struct Orchestrator {
    calendar: Arc<dyn CalendarService>,
    narrative: Arc<dyn NarrativeClient>,
    prompts: Arc<dyn PromptService>,
    visualization: Arc<dyn VisualizationService>,
    config: PipelineConfig,
    observer: Arc<dyn RunObserver>,
    cancel: RwLock<CancellationToken>,
}

impl Orchestrator {
    /// Wire the four collaborators with a no-op observer.
    pub fn new(
        calendar: Arc<dyn CalendarService>,
        narrative: Arc<dyn NarrativeClient>,
        prompts: Arc<dyn PromptService>,
        visualization: Arc<dyn VisualizationService>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            calendar,
            narrative,
            prompts,
            visualization,
            config,
            observer: Arc::new(NoopObserver),
            cancel: RwLock::new(CancellationToken::new()),
        }
    }

    /// Attach an observer for progress, step-complete and error callbacks.
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Pipeline policy this orchestrator runs with.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full graph from a fresh state.
    pub async fn execute(&self, input: &RunInput) -> RunResult {
        let mut state = RunState::new(&self.config);
        state.start();
        self.run(input, PipelineStep::Chart, state).await
    }

    /// Restore `prior_outputs` and run `from_step` and everything after it.
    ///
    /// Steps in the suffix whose output is already present are marked done
    /// without being re-run.
    pub async fn execute_from_step(
        &self,
        input: &RunInput,
        from_step: PipelineStep,
        prior_outputs: IntermediateResults,
    ) -> RunResult {
        let mut state = RunState::new(&self.config);
        state.hydrate(prior_outputs, from_step);
        self.run(input, from_step, state).await
    }

    /// Cancel the current run. Takes effect before the next attempt starts
    /// and interrupts in-flight attempts and backoff waits.
    pub async fn cancel(&self) {
        self.cancel.read().await.cancel();
    }

    async fn run(&self, input: &RunInput, from: PipelineStep, state: RunState) -> RunResult {
        let run_id = state.run_id();
        let state = Arc::new(RwLock::new(state));
        let cancel = CancellationToken::new();
        *self.cancel.write().await = cancel.clone();

        let ctx = RunContext {
            runner: StepRunner::new(
                state.clone(),
                self.config.clone(),
                self.observer.clone(),
                cancel,
            ),
            state: state.clone(),
            input,
            language: input
                .language
                .clone()
                .unwrap_or_else(|| self.config.language.clone()),
            from,
        };

        info!(run_id = %run_id, from_step = %from, parallel = self.config.enable_parallel, "Run started");
        let outcome = self.run_graph(&ctx).await;

        let state = state.read().await;
        let token_usage = state.token_usage();
        match outcome {
            Ok(()) => {
                let outputs = state.outputs().clone();
                let report = outputs
                    .report
                    .clone()
                    .unwrap_or_else(|| build_report(&outputs));
                let metadata = RunMetadata {
                    run_id,
                    total_duration_ms: state.total_duration_ms(),
                    step_durations: state.step_durations().clone(),
                    parallel_executed: self.config.enable_parallel,
                    version: PIPELINE_VERSION.to_string(),
                    token_usage,
                };
                info!(
                    run_id = %run_id,
                    duration_ms = metadata.total_duration_ms,
                    tokens = token_usage.total_tokens,
                    "Run completed"
                );
                RunResult::Success {
                    report,
                    outputs,
                    metadata,
                }
            }
            Err(err) => {
                let failed_step = state.first_failed_step().unwrap_or(from);
                warn!(run_id = %run_id, failed_step = %failed_step, error = %err, "Run aborted");
                RunResult::Failure {
                    error: err.to_info(),
                    partial_outputs: state.outputs().clone(),
                    failed_step,
                    token_usage,
                }
            }
        }
    }

    async fn run_graph(&self, ctx: &RunContext<'_>) -> DomainResult<()> {
        self.stage(ctx, PipelineStep::Chart).await?;
        self.stage(ctx, PipelineStep::HiddenStems).await?;
        self.stage(ctx, PipelineStep::Baseline).await?;

        if self.config.enable_parallel {
            let (personality, aptitude, fortune) = tokio::join!(
                self.stage(ctx, PipelineStep::Personality),
                self.stage(ctx, PipelineStep::Aptitude),
                self.stage(ctx, PipelineStep::Fortune),
            );
            personality.and(aptitude).and(fortune)?;
        } else {
            for step in PipelineStep::DOMAINS {
                self.stage(ctx, step).await?;
            }
        }

        self.stage(ctx, PipelineStep::Scoring).await?;
        self.stage(ctx, PipelineStep::Visualization).await?;
        self.stage(ctx, PipelineStep::Finalize).await?;
        ctx.runner.mark_done(PipelineStep::Complete).await;
        Ok(())
    }

    async fn stage(&self, ctx: &RunContext<'_>, step: PipelineStep) -> DomainResult<()> {
        if step < ctx.from {
            return Ok(());
        }
        if ctx.state.read().await.outputs().has_output(step) {
            info!(step = %step, "Output already present, skipping step");
            ctx.runner.mark_done(step).await;
            return Ok(());
        }

        match step {
            PipelineStep::Chart => {
                let chart = ctx
                    .runner
                    .run(step, StepOptions::default(), || self.resolve_chart(ctx.input))
                    .await?;
                ctx.state.write().await.outputs_mut().chart = Some(chart);
            }
            PipelineStep::HiddenStems => {
                let hidden = ctx
                    .runner
                    .run(step, StepOptions::default(), || async {
                        let chart = require_chart(&ctx.state).await?;
                        Ok(HiddenStems::lookup(&chart.pillars))
                    })
                    .await?;
                ctx.state.write().await.outputs_mut().hidden_stems = Some(hidden);
            }
            PipelineStep::Baseline => {
                let output = self.narrative_step(ctx).await?;
                ctx.state.write().await.outputs_mut().baseline = Some(output);
            }
            PipelineStep::Personality => {
                let output = self.narrative_step(ctx).await?;
                ctx.state.write().await.outputs_mut().personality = Some(output);
            }
            PipelineStep::Aptitude => {
                let output = self.narrative_step(ctx).await?;
                ctx.state.write().await.outputs_mut().aptitude = Some(output);
            }
            PipelineStep::Fortune => {
                let output = self.narrative_step(ctx).await?;
                ctx.state.write().await.outputs_mut().fortune = Some(output);
            }
            PipelineStep::Scoring => {
                let scores = ctx
                    .runner
                    .run(step, StepOptions::default(), || async {
                        let (chart, hidden) = require_chart_and_hidden(&ctx.state).await?;
                        Ok(scoring::score_all(&scoring::histogram(&chart.pillars, &hidden)))
                    })
                    .await?;
                ctx.state.write().await.outputs_mut().scores = Some(scores);
            }
            PipelineStep::Visualization => {
                let visualization = self.visualization_step(ctx).await?;
                ctx.state.write().await.outputs_mut().visualization = Some(visualization);
            }
            PipelineStep::Finalize => {
                let report = ctx
                    .runner
                    .run(step, StepOptions::default(), || async {
                        Ok(build_report(ctx.state.read().await.outputs()))
                    })
                    .await?;
                ctx.state.write().await.outputs_mut().report = Some(report);
            }
            PipelineStep::Complete => ctx.runner.mark_done(step).await,
        }
        Ok(())
    }

    async fn resolve_chart(&self, input: &RunInput) -> DomainResult<ChartData> {
        if let Some(chart) = &input.chart {
            return Ok(chart.clone());
        }
        let birth = input.birth.as_ref().ok_or_else(|| {
            DomainError::InvalidInput("a chart or birth data is required".to_string())
        })?;
        self.calendar.calculate(birth).await
    }

    async fn narrative_step<T: NarrativeOutput>(&self, ctx: &RunContext<'_>) -> DomainResult<T> {
        ctx.runner
            .run(T::STEP, StepOptions::default(), || self.generate::<T>(ctx))
            .await
    }

    /// One narrative attempt: prompt, generate, record tokens, parse.
    async fn generate<T: NarrativeOutput>(&self, ctx: &RunContext<'_>) -> DomainResult<T> {
        let request = prompt_request(T::STEP, ctx).await?;
        let prompt = match self.prompts.build(&request).await {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!(step = %T::STEP, error = %err, "Prompt service failed, using built-in prompt");
                fallback_prompt(request.step, &request.pillars)
            }
        };

        let response = self.narrative.generate(&prompt).await?;
        ctx.state
            .read()
            .await
            .add_token_usage(response.usage.input_tokens, response.usage.output_tokens);

        parse_output::<T>(&response.text)
    }

    /// Rendering failures, including the step's own deadline, degrade to an
    /// empty image instead of failing the run.
    async fn visualization_step(&self, ctx: &RunContext<'_>) -> DomainResult<Visualization> {
        let step = PipelineStep::Visualization;
        let timeout_ms = ctx.state.read().await.timeout_ms(step);
        let options = StepOptions {
            skip_retry: true,
            timeout_ms: Some(0),
        };

        ctx.runner
            .run(step, options, || async {
                let rendered = match require_chart(&ctx.state).await {
                    Ok(chart) => {
                        with_deadline(step, timeout_ms, self.visualization.render(&chart.pillars))
                            .await
                    }
                    Err(err) => Err(err),
                };
                Ok(match rendered {
                    Ok(pillar_image) => Visualization { pillar_image },
                    Err(err) => {
                        warn!(error = %err, "Visualization failed, continuing without image");
                        Visualization::default()
                    }
                })
            })
            .await
    }
}

async fn require_chart(state: &RwLock<RunState>) -> DomainResult<ChartData> {
    state
        .read()
        .await
        .outputs()
        .chart
        .clone()
        .ok_or_else(|| DomainError::InvalidInput("chart output is missing".to_string()))
}

async fn require_chart_and_hidden(
    state: &RwLock<RunState>,
) -> DomainResult<(ChartData, HiddenStems)> {
    let chart = require_chart(state).await?;
    let hidden = state
        .read()
        .await
        .outputs()
        .hidden_stems
        .clone()
        .unwrap_or_else(|| HiddenStems::lookup(&chart.pillars));
    Ok((chart, hidden))
}

async fn prompt_request(step: PipelineStep, ctx: &RunContext<'_>) -> DomainResult<PromptRequest> {
    let kind = PromptKind::for_step(step).ok_or_else(|| {
        DomainError::InvalidInput(format!("step {step} does not use a prompt"))
    })?;
    let (chart, hidden) = require_chart_and_hidden(&ctx.state).await?;
    let baseline = ctx.state.read().await.outputs().baseline.clone();

    let is_domain = PipelineStep::DOMAINS.contains(&step);
    Ok(PromptRequest {
        step: kind,
        language: ctx.language.clone(),
        pillars: chart.pillars,
        decade_cycles: chart.decade_cycles,
        histogram: is_domain.then(|| scoring::histogram(&chart.pillars, &hidden)),
        hidden_stems: Some(hidden),
        previous_results: (step != PipelineStep::Baseline).then_some(PreviousResults {
            basic_analysis: baseline,
        }),
    })
}
