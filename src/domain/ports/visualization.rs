use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::FourPillars;

/// Renders the chart as an image and returns it base64-encoded.
#[async_trait]
pub trait VisualizationService: Send + Sync {
    async fn render(&self, pillars: &FourPillars) -> DomainResult<String>;
}
