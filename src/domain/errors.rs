//! Domain errors for the report pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::PipelineStep;

/// Domain-level errors raised by pipeline steps and their collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Step {step} exceeded its deadline of {timeout_ms}ms")]
    Timeout { step: PipelineStep, timeout_ms: u64 },

    #[error("Run was cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Remote service rejected credentials: {0}")]
    InvalidCredential(String),

    #[error("Remote service rate limited the request: {0}")]
    RateLimited(String),

    #[error("Failed to parse response: {0}")]
    ParseFailure(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Remote service error: {0}")]
    RemoteError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result alias used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Serializable classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Timeout,
    Cancelled,
    InvalidInput,
    InvalidCredential,
    RateLimited,
    ParseFailure,
    ResourceNotFound,
    RemoteError,
    Unknown,
}

impl ErrorKind {
    /// Whether the step runner may spend retry budget on this kind.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::RemoteError | Self::Unknown
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::RateLimited => "RATE_LIMITED",
            Self::ParseFailure => "PARSE_FAILURE",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::RemoteError => "REMOTE_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainError {
    /// Serializable classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::ParseFailure(_) => ErrorKind::ParseFailure,
            Self::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Self::RemoteError(_) => ErrorKind::RemoteError,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the step runner may try again after this error.
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Convert into the serializable form carried by envelopes and observers.
    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Error as reported to callers: a classification plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::RemoteError(format!("request timed out: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), &err.to_string());
        }
        if err.is_decode() {
            return Self::ParseFailure(err.to_string());
        }
        Self::RemoteError(err.to_string())
    }
}

impl DomainError {
    /// Classify an HTTP status returned by a remote collaborator.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}: {body}");
        match status {
            400 | 422 => Self::InvalidInput(message),
            401 | 403 => Self::InvalidCredential(message),
            404 => Self::ResourceNotFound(message),
            408 | 504 => Self::RemoteError(message),
            429 => Self::RateLimited(message),
            _ => Self::RemoteError(message),
        }
    }
}
