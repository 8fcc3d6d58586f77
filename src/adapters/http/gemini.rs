//! Gemini `generateContent` narrative client.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::{build_client, normalize_base_url};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NarrativeConfig, TokenUsage};
use crate::domain::ports::{NarrativeClient, NarrativeResponse};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }

    fn usage(&self) -> TokenUsage {
        self.usage_metadata
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default()
    }
}

/// Narrative client backed by the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    config: NarrativeConfig,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client; the key comes from config or `GEMINI_API_KEY`.
    pub fn new(config: NarrativeConfig) -> DomainResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::InvalidCredential(format!(
                    "No narrative API key configured (set services.narrative.api_key or {API_KEY_ENV})"
                ))
            })?;

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: normalize_base_url(&config.base_url),
            api_key,
            config,
        })
    }

    fn request<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                response_mime_type: "application/json",
            },
        }
    }
}

#[async_trait]
impl NarrativeClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<NarrativeResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.config.model, "Narrative request rejected");
            return Err(DomainError::from_status(status.as_u16(), &body));
        }

        let body: GenerateResponse = serde_json::from_str(&response.text().await?)?;
        let usage = body.usage();
        let text = body.text();
        // Blocked or empty generations are still billed; the caller records
        // usage before the empty text fails parsing.
        if text.is_empty() {
            tracing::warn!(
                model = %self.config.model,
                input_tokens = usage.input_tokens,
                "Narrative response contained no candidate text"
            );
        }

        Ok(NarrativeResponse { usage, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let client = GeminiClient::new(NarrativeConfig {
            api_key: Some("k".into()),
            ..Default::default()
        })
        .unwrap();
        let value = serde_json::to_value(client.request("hello")).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_text_and_usage() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}],
                "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":3}}"#,
        )
        .unwrap();
        assert_eq!(body.text(), r#"{"a":1}"#);
        assert_eq!(body.usage(), TokenUsage::new(12, 3));
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let body: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(body.text(), "");
        assert_eq!(body.usage(), TokenUsage::default());
    }
}
