//! `saju score`: trait scores for a chart, computed locally.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::read_json;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ChartData, ScoreReport};
use crate::services::scoring::score_chart;

/// Arguments of `saju score`.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Chart JSON file (`pillars`, optional `daewun`)
    #[arg(long)]
    pub chart: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ScoreOutput {
    pub pillars: String,
    #[serde(flatten)]
    pub scores: ScoreReport,
}

impl CommandOutput for ScoreOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        format!(
            "Chart: {}\n\n{}\n\n{}",
            self.pillars,
            formatter.format_histogram(&self.scores.histogram),
            formatter.format_scores(&self.scores)
        )
    }
}

pub fn execute(args: &ScoreArgs, json_mode: bool) -> Result<()> {
    let chart: ChartData = read_json(&args.chart)?;
    let p = &chart.pillars;
    let result = ScoreOutput {
        pillars: format!("{} {} {} {}", p.year, p.month, p.day, p.hour),
        scores: score_chart(p),
    };
    output(&result, json_mode);
    Ok(())
}
