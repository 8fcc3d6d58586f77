use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{BirthRequest, ChartData};

/// Computes the four pillars and decade cycles for a birth moment.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn calculate(&self, request: &BirthRequest) -> DomainResult<ChartData>;
}
