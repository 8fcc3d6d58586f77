//! `saju run`: execute the full report pipeline.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{build_orchestrator, read_json};
use crate::adapters::mock::sample_chart;
use crate::cli::output::progress::ProgressObserver;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{BirthRequest, ChartData, Config, RunInput, RunResult, Sex};
use crate::domain::ports::TracingObserver;
use crate::services::Orchestrator;

/// Arguments of `saju run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Precomputed chart JSON file; skips the calendar service
    #[arg(long, conflicts_with = "birth_date")]
    pub chart: Option<PathBuf>,

    /// Birth date, YYYY-MM-DD
    #[arg(long, requires_all = ["birth_time", "gender"])]
    pub birth_date: Option<String>,

    /// Birth time, HH:MM
    #[arg(long)]
    pub birth_time: Option<String>,

    /// Timezone passed to the calendar service
    #[arg(long, default_value = "GMT+9")]
    pub timezone: String,

    /// male or female
    #[arg(long)]
    pub gender: Option<String>,

    /// Birth date is on the lunar calendar
    #[arg(long)]
    pub lunar: bool,

    /// Report language, overriding pipeline.language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Use canned in-process collaborators instead of the remote services
    #[arg(long)]
    pub offline: bool,

    /// Write the run result envelope to this file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RunOutput {
    pub result: RunResult,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        match &self.result {
            RunResult::Success {
                report, metadata, ..
            } => {
                let mut lines = vec![
                    format!("✓ Report complete (run {})", metadata.run_id),
                    format!(
                        "  {}ms total, {} tokens, parallel: {}",
                        metadata.total_duration_ms,
                        metadata.token_usage.total_tokens,
                        metadata.parallel_executed
                    ),
                    String::new(),
                    truncate(&report.summary, 200),
                    String::new(),
                    formatter.format_durations(&metadata.step_durations),
                ];
                for (title, score) in [
                    ("Wealth", report.wealth.score),
                    ("Love", report.love.score),
                    ("Career", report.career.score),
                    ("Health", report.health.score),
                ] {
                    lines.push(format!("  {title:<8} {score:>3}"));
                }
                lines.join("\n")
            }
            RunResult::Failure {
                error,
                failed_step,
                partial_outputs,
                token_usage,
            } => {
                let kept: Vec<&str> = crate::domain::models::PipelineStep::ALL
                    .into_iter()
                    .filter(|s| partial_outputs.has_output(*s))
                    .map(|s| s.as_str())
                    .collect();
                format!(
                    "✗ Run failed at step {failed_step} ({}): {}\n  {} tokens used\n  Completed outputs: {}",
                    error.kind,
                    error.message,
                    token_usage.total_tokens,
                    if kept.is_empty() { "none".to_string() } else { kept.join(", ") }
                )
            }
        }
    }
}

fn parse_sex(value: &str) -> Result<Sex> {
    match value.to_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => bail!("Invalid gender: {other}. Must be male or female"),
    }
}

/// Build the run input from either `--chart` or the birth-data flags.
pub fn run_input(args: &RunArgs) -> Result<RunInput> {
    let mut chart = args.chart.as_deref().map(read_json::<ChartData>).transpose()?;

    let birth = match (&args.birth_date, &args.birth_time, &args.gender) {
        (Some(date), Some(time), Some(gender)) => Some(BirthRequest {
            birth_date: date.clone(),
            birth_time: time.clone(),
            timezone: args.timezone.clone(),
            is_lunar: args.lunar,
            gender: parse_sex(gender)?,
        }),
        _ => None,
    };

    if chart.is_none() && birth.is_none() {
        if !args.offline {
            bail!("Provide --chart or --birth-date/--birth-time/--gender");
        }
        chart = Some(sample_chart());
    }

    Ok(RunInput {
        chart,
        birth,
        language: args.language.clone(),
    })
}

/// Await a run, cancelling it on Ctrl-C, with a progress bar unless in JSON mode.
pub async fn drive<F, Fut>(orchestrator: Orchestrator, json_mode: bool, start: F) -> RunResult
where
    F: FnOnce(Arc<Orchestrator>) -> Fut,
    Fut: Future<Output = RunResult>,
{
    let progress = (!json_mode).then(|| Arc::new(ProgressObserver::new()));
    let orchestrator = Arc::new(match &progress {
        Some(bar) => orchestrator.with_observer(bar.clone()),
        None => orchestrator.with_observer(Arc::new(TracingObserver)),
    });

    let watcher = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                orchestrator.cancel().await;
            }
        })
    };

    let result = start(orchestrator).await;
    watcher.abort();

    if let Some(bar) = progress {
        bar.finish(if result.is_success() { "done" } else { "failed" });
    }
    result
}

/// Print the envelope, optionally save it, and turn a failed run into an error.
pub fn finish(result: RunResult, save: Option<&Path>, json_mode: bool) -> Result<()> {
    if let Some(path) = save {
        let body = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Run result saved");
    }

    let failed_step = match &result {
        RunResult::Failure { failed_step, .. } => Some(*failed_step),
        RunResult::Success { .. } => None,
    };
    output(&RunOutput { result }, json_mode);

    match failed_step {
        Some(step) => bail!("Run failed at step {step}"),
        None => Ok(()),
    }
}

/// Run the full pipeline and print the envelope.
pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let input = run_input(&args)?;
    let orchestrator = build_orchestrator(config, args.offline).await?;

    let result = drive(orchestrator, json_mode, |o| async move { o.execute(&input).await }).await;
    finish(result, args.save.as_deref(), json_mode)
}
