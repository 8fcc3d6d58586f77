//! saju-engine - Four Pillars report pipeline
//!
//! Turns a birth chart into a structured report: hidden stems, four
//! narrative analyses from a language model, deterministic trait scores, a
//! chart image and the assembled final report. Every step runs under a
//! deadline with bounded retry, and a failed run can be resumed from any
//! step using its saved outputs.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the collaborator ports
//! - **Service Layer** (`services`): orchestrator, step runner, scoring engine
//! - **Adapters** (`adapters`): HTTP clients and in-process doubles for the ports
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use saju_engine::adapters::mock::{
//!     sample_chart, MockCalendarService, MockNarrativeClient, MockPromptService,
//!     MockVisualizationService,
//! };
//! use saju_engine::{Orchestrator, PipelineConfig, RunInput};
//!
//! # async fn demo() {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(MockCalendarService::default()),
//!     Arc::new(MockNarrativeClient::offline().await),
//!     Arc::new(MockPromptService::new()),
//!     Arc::new(MockVisualizationService::default()),
//!     PipelineConfig::default(),
//! );
//! let input = RunInput { chart: Some(sample_chart()), ..Default::default() };
//! let result = orchestrator.execute(&input).await;
//! assert!(result.is_success());
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult, ErrorInfo, ErrorKind};
pub use domain::models::{
    Category, CategoryHistogram, ChartData, Config, FinalReport, FourPillars, IntermediateResults,
    PipelineConfig, PipelineStep, RunInput, RunProgress, RunResult, ScoreReport, Stem, StepStatus,
};
pub use domain::ports::{
    CalendarService, NarrativeClient, PromptService, RunObserver, VisualizationService,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::Orchestrator;
