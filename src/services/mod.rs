pub mod fallback_prompts;
pub mod orchestrator;
pub mod report_builder;
pub mod response_parser;
pub mod run_state;
pub mod scoring;
pub mod step_runner;

pub use orchestrator::Orchestrator;
pub use run_state::RunState;
pub use step_runner::{StepOptions, StepRunner};
