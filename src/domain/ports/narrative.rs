//! Narrative-generation port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::TokenUsage;

/// Raw text returned by the narrative service together with its token cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeResponse {
    pub text: String,
    pub usage: TokenUsage,
}

/// A text-in, JSON-text-out generation backend.
///
/// Implementations must be cancel-safe: the step runner drops the future when
/// the step deadline passes.
#[async_trait]
pub trait NarrativeClient: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> DomainResult<NarrativeResponse>;
}
