//! Prompt assembly over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{build_client, normalize_base_url, post_json};
use crate::domain::errors::DomainResult;
use crate::domain::models::ServicesConfig;
use crate::domain::ports::{PromptRequest, PromptService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptResponse {
    system_prompt: String,
    user_prompt: String,
}

/// Calls `POST {base}/api/prompts/step` and joins the system and user prompts.
pub struct HttpPromptService {
    client: Client,
    base_url: String,
}

impl HttpPromptService {
    /// Client for the prompt-assembly backend at `config.api_base_url`.
    pub fn new(config: &ServicesConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: normalize_base_url(&config.api_base_url),
        })
    }
}

#[async_trait]
impl PromptService for HttpPromptService {
    async fn build(&self, request: &PromptRequest) -> DomainResult<String> {
        let url = format!("{}/api/prompts/step", self.base_url);
        let response: PromptResponse = post_json(&self.client, &url, request).await?;
        Ok(format!("{}\n\n{}", response.system_prompt, response.user_prompt))
    }
}
