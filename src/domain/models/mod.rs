pub mod category;
pub mod chart;
pub mod config;
pub mod report;
pub mod run;
pub mod step;

pub use category::{classify, classify_symbols, Category, CategoryHistogram};
pub use chart::{
    Branch, ChartData, DecadePeriod, Element, FourPillars, HiddenStems, Pillar, PillarPosition,
    Polarity, Stem,
};
pub use config::{Config, LoggingConfig, NarrativeConfig, PipelineConfig, ServicesConfig};
pub use report::{
    AptitudeAnalysis, AreaSection, BasicAnalysis, ClassicalReference, DomainScores, FinalReport,
    FortuneAnalysis, IntermediateResults, NarrativeOutput, PersonalityAnalysis, PersonalitySection,
    ScoreReport, Visualization, YearlyFlow,
};
pub use run::{
    BirthRequest, RunInput, RunMetadata, RunProgress, RunResult, Sex, TokenUsage, PIPELINE_VERSION,
};
pub use step::{PipelineStep, StepStatus};
