//! In-process collaborators for tests and offline runs.

pub mod fixtures;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BirthRequest, ChartData, FourPillars, TokenUsage};
use crate::domain::ports::{
    CalendarService, NarrativeClient, NarrativeResponse, PromptKind, PromptRequest, PromptService,
    VisualizationService,
};

pub use fixtures::{sample_chart, sample_output};

/// Scripted narrative response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Generated text
    pub text: String,
    /// Error to return instead of text
    pub error: Option<DomainError>,
    /// Simulated latency
    pub delay: Duration,
    pub usage: TokenUsage,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            text: "{}".to_string(),
            error: None,
            delay: Duration::ZERO,
            usage: TokenUsage::new(100, 50),
        }
    }
}

impl MockResponse {
    /// Respond with `text` and the default usage.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Fail every call with `error`.
    pub fn failure(error: DomainError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub const fn with_usage(mut self, input: u64, output: u64) -> Self {
        self.usage = TokenUsage::new(input, output);
        self
    }
}

/// Narrative client that answers from a list of `(marker, response)` rules.
///
/// The first rule whose marker occurs in the prompt wins; otherwise the
/// default response is used. Every prompt is recorded.
pub struct MockNarrativeClient {
    default_response: MockResponse,
    rules: Arc<RwLock<Vec<(String, MockResponse)>>>,
    prompts: Arc<RwLock<Vec<String>>>,
    calls: AtomicUsize,
}

impl MockNarrativeClient {
    pub fn new() -> Self {
        Self::with_default_response(MockResponse::default())
    }

    /// Client that answers every prompt with `response`.
    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            default_response: response,
            rules: Arc::new(RwLock::new(Vec::new())),
            prompts: Arc::new(RwLock::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Canned, well-formed answers for every prompt produced by [`MockPromptService`].
    pub async fn offline() -> Self {
        let client = Self::new();
        for kind in [
            PromptKind::Basic,
            PromptKind::Personality,
            PromptKind::Aptitude,
            PromptKind::Fortune,
        ] {
            client
                .set_response(step_marker(kind), MockResponse::success(sample_output(kind)))
                .await;
        }
        client
    }

    /// Add or replace the rule for `marker`.
    pub async fn set_response(&self, marker: impl Into<String>, response: MockResponse) {
        let marker = marker.into();
        let mut rules = self.rules.write().await;
        if let Some(rule) = rules.iter_mut().find(|(m, _)| *m == marker) {
            rule.1 = response;
        } else {
            rules.push((marker, response));
        }
    }

    async fn response_for(&self, prompt: &str) -> MockResponse {
        let rules = self.rules.read().await;
        rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map_or_else(|| self.default_response.clone(), |(_, r)| r.clone())
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of recorded prompts containing `marker`.
    pub async fn calls_matching(&self, marker: &str) -> usize {
        self.prompts
            .read()
            .await
            .iter()
            .filter(|p| p.contains(marker))
            .count()
    }

    /// Every prompt received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }
}

impl Default for MockNarrativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NarrativeClient for MockNarrativeClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<NarrativeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.write().await.push(prompt.to_string());

        let response = self.response_for(prompt).await;
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        match response.error {
            Some(err) => Err(err),
            None => Ok(NarrativeResponse {
                text: response.text,
                usage: response.usage,
            }),
        }
    }
}

/// Marker that [`MockPromptService`] puts on the first line of each prompt.
pub fn step_marker(kind: PromptKind) -> String {
    format!("step={}", kind.as_str())
}

/// Prompt service that renders the request as plain text, or always fails.
#[derive(Debug, Default)]
pub struct MockPromptService {
    fail: bool,
    calls: AtomicUsize,
}

impl MockPromptService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptService for MockPromptService {
    async fn build(&self, request: &PromptRequest) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::RemoteError("prompt service unavailable".to_string()));
        }
        let pillars = &request.pillars;
        Ok(format!(
            "{}\nlanguage={}\npillars={} {} {} {}\nbaseline={}\nhistogram={}",
            step_marker(request.step),
            request.language,
            pillars.year,
            pillars.month,
            pillars.day,
            pillars.hour,
            request.previous_results.is_some(),
            request.histogram.is_some(),
        ))
    }
}

/// Calendar service returning a fixed chart or a fixed error.
pub struct MockCalendarService {
    response: DomainResult<ChartData>,
    calls: AtomicUsize,
}

impl MockCalendarService {
    pub fn new(chart: ChartData) -> Self {
        Self {
            response: Ok(chart),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCalendarService {
    fn default() -> Self {
        Self::new(sample_chart())
    }
}

#[async_trait]
impl CalendarService for MockCalendarService {
    async fn calculate(&self, _request: &BirthRequest) -> DomainResult<ChartData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Visualization service returning a fixed image or error after an optional delay.
pub struct MockVisualizationService {
    response: DomainResult<String>,
    delay: Duration,
}

impl MockVisualizationService {
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            response: Ok(image_base64.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            response: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockVisualizationService {
    fn default() -> Self {
        Self::new("iVBORw0KGgo=")
    }
}

#[async_trait]
impl VisualizationService for MockVisualizationService {
    async fn render(&self, _pillars: &FourPillars) -> DomainResult<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}
