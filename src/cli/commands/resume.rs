//! `saju resume`: re-run a pipeline from a step using saved outputs.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::run::{drive, finish};
use super::{build_orchestrator, read_json};
use crate::domain::models::{
    ChartData, Config, IntermediateResults, PipelineStep, RunInput, RunResult,
};

/// Arguments of `saju resume`.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Step to resume from (e.g. scoring, personality)
    #[arg(long)]
    pub from: PipelineStep,

    /// Saved outputs: a run result envelope or a bare outputs object
    #[arg(long)]
    pub outputs: PathBuf,

    /// Chart JSON file, used when the saved outputs have no chart
    #[arg(long)]
    pub chart: Option<PathBuf>,

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

/// Load prior outputs from either envelope variant or a bare outputs object.
pub fn load_prior_outputs(path: &Path) -> Result<IntermediateResults> {
    let value: serde_json::Value = read_json(path)?;
    if value.get("status").is_some() {
        let result: RunResult = serde_json::from_value(value)?;
        return Ok(result.outputs().clone());
    }
    Ok(serde_json::from_value(value)?)
}

/// Resume a run from `--from` using saved outputs.
pub async fn execute(args: ResumeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let outputs = load_prior_outputs(&args.outputs)?;
    let chart = args.chart.as_deref().map(read_json::<ChartData>).transpose()?;
    let input = RunInput {
        chart,
        birth: None,
        language: args.language.clone(),
    };
    let from = args.from;
    tracing::info!(from_step = %from, "Resuming run");

    let orchestrator = build_orchestrator(config, args.offline).await?;
    let result = drive(orchestrator, json_mode, |o| async move {
        o.execute_from_step(&input, from, outputs).await
    })
    .await;
    finish(result, args.save.as_deref(), json_mode)
}
