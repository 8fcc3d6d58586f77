//! saju CLI entry point.

use anyhow::Context;
use clap::Parser;

use saju_engine::cli::{commands, handle_error, Cli, Commands};
use saju_engine::infrastructure::logging::LoggerImpl;
use saju_engine::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config.context("Failed to load configuration") {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err.context("Failed to initialize logging"), cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Resume(args) => commands::resume::execute(args, &config, cli.json).await,
        Commands::Score(args) => commands::score::execute(&args, cli.json),
        Commands::Classify(args) => commands::classify::execute(&args, cli.json),
        Commands::Config(args) => commands::config::execute(&args, &config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
