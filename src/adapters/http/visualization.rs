//! Chart image rendering over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_client, normalize_base_url, post_json};
use crate::domain::errors::DomainResult;
use crate::domain::models::{FourPillars, ServicesConfig};
use crate::domain::ports::VisualizationService;

#[derive(Serialize)]
struct RenderRequest<'a> {
    pillars: &'a FourPillars,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderResponse {
    image_base64: String,
}

/// Calls `POST {base}/api/visualization/pillar`.
pub struct HttpVisualizationService {
    client: Client,
    base_url: String,
}

impl HttpVisualizationService {
    /// Client for the pillar-rendering backend at `config.api_base_url`.
    pub fn new(config: &ServicesConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: normalize_base_url(&config.api_base_url),
        })
    }
}

#[async_trait]
impl VisualizationService for HttpVisualizationService {
    async fn render(&self, pillars: &FourPillars) -> DomainResult<String> {
        let url = format!("{}/api/visualization/pillar", self.base_url);
        let response: RenderResponse =
            post_json(&self.client, &url, &RenderRequest { pillars }).await?;
        Ok(response.image_base64)
    }
}
