//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    classify::ClassifyArgs, config::ConfigArgs, resume::ResumeArgs, run::RunArgs,
    score::ScoreArgs,
};

/// Command-line interface of the `saju` binary.
#[derive(Parser, Debug)]
#[command(name = "saju")]
#[command(about = "Saju report pipeline: chart, narrative analysis and trait scores", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .saju/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full report pipeline
    Run(RunArgs),
    /// Re-run a pipeline from a given step using saved outputs
    Resume(ResumeArgs),
    /// Compute trait scores for a chart without any remote calls
    Score(ScoreArgs),
    /// Classify one stem relative to a day stem
    Classify(ClassifyArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Print `err` in the selected format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
