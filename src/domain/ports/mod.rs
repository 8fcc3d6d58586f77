//! Port trait definitions (Hexagonal Architecture)
//!
//! - CalendarService: birth data to chart
//! - NarrativeClient: prompt to generated JSON text
//! - PromptService: per-step prompt assembly
//! - VisualizationService: chart image rendering
//! - RunObserver: progress, step-complete and error callbacks

pub mod calendar;
pub mod narrative;
pub mod observer;
pub mod prompt;
pub mod visualization;

pub use calendar::CalendarService;
pub use narrative::{NarrativeClient, NarrativeResponse};
pub use observer::{NoopObserver, RunObserver, TracingObserver};
pub use prompt::{PreviousResults, PromptKind, PromptRequest, PromptService};
pub use visualization::VisualizationService;
