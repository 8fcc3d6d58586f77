//! Chart calculation over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{build_client, normalize_base_url, post_json};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BirthRequest, ChartData, ServicesConfig, Sex};
use crate::domain::ports::CalendarService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRequest<'a> {
    birth_datetime: String,
    timezone: &'a str,
    is_lunar: bool,
    gender: Sex,
}

/// Calls `POST {base}/api/manseryeok/calculate`.
pub struct HttpCalendarService {
    client: Client,
    base_url: String,
}

impl HttpCalendarService {
    /// Client for the calendar backend at `config.api_base_url`.
    pub fn new(config: &ServicesConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: normalize_base_url(&config.api_base_url),
        })
    }
}

/// Combine `YYYY-MM-DD` and `HH:MM` into the ISO local datetime the API expects.
fn birth_datetime(request: &BirthRequest) -> DomainResult<String> {
    let date = chrono::NaiveDate::parse_from_str(&request.birth_date, "%Y-%m-%d")
        .map_err(|e| DomainError::InvalidInput(format!("birth date '{}': {e}", request.birth_date)))?;
    let time = chrono::NaiveTime::parse_from_str(&request.birth_time, "%H:%M")
        .map_err(|e| DomainError::InvalidInput(format!("birth time '{}': {e}", request.birth_time)))?;
    Ok(date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[async_trait]
impl CalendarService for HttpCalendarService {
    async fn calculate(&self, request: &BirthRequest) -> DomainResult<ChartData> {
        let body = CalculateRequest {
            birth_datetime: birth_datetime(request)?,
            timezone: &request.timezone,
            is_lunar: request.is_lunar,
            gender: request.gender,
        };
        let url = format!("{}/api/manseryeok/calculate", self.base_url);
        tracing::debug!(url = %url, "Requesting chart calculation");
        post_json(&self.client, &url, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birth(date: &str, time: &str) -> BirthRequest {
        BirthRequest {
            birth_date: date.into(),
            birth_time: time.into(),
            timezone: "GMT+9".into(),
            is_lunar: false,
            gender: Sex::Male,
        }
    }

    #[test]
    fn test_birth_datetime() {
        assert_eq!(birth_datetime(&birth("1990-05-15", "14:30")).unwrap(), "1990-05-15T14:30:00");
    }

    #[test]
    fn test_birth_datetime_rejects_garbage() {
        let err = birth_datetime(&birth("1990-13-40", "14:30")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(birth_datetime(&birth("1990-05-15", "25h")).is_err());
    }
}
