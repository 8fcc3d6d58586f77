//! HTTP clients for the remote collaborators.
//!
//! The calendar, prompt and visualization endpoints share one JSON API
//! (`services.api_base_url`); narrative generation talks to Gemini.

pub mod calendar;
pub mod gemini;
pub mod prompt;
pub mod visualization;

pub use calendar::HttpCalendarService;
pub use gemini::GeminiClient;
pub use prompt::HttpPromptService;
pub use visualization::HttpVisualizationService;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};

/// Prepend `https://` when `url` carries no scheme and drop trailing slashes.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> DomainResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DomainError::Unknown(format!("Failed to create HTTP client: {e}")))
}

/// POST `body` as JSON and decode a JSON reply, classifying non-2xx statuses.
pub(crate) async fn post_json<B, R>(client: &Client, url: &str, body: &B) -> DomainResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DomainError::from_status(status.as_u16(), &body));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("api.example.com"), "https://api.example.com");
        assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
        assert_eq!(normalize_base_url(" https://x.io "), "https://x.io");
    }
}
