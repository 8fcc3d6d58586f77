//! Deterministic trait scoring from a chart's category histogram.

pub mod calculator;
pub mod modifiers;

pub use calculator::{histogram, score_all, score_chart, score_domain, score_trait, summarize};
pub use modifiers::{ScoreDomain, TraitModifier};
