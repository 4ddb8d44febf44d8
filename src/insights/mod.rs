//! Grounded market commentary from a hosted language model.
//!
//! `GeminiClient` speaks the `generateContent` REST endpoint with the search
//! tool enabled. `InsightsSession` sits in front of any `InsightsClient` and
//! makes sure only the response to the most recent question is shown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::InsightsError;
use crate::logging::{log_insight_outcome, log_insight_request, params_hash};

pub mod retry;

use retry::{retry_async, RetryConfig};

pub const DEFAULT_PROMPT: &str = "What are the latest trends for Bitcoin?";

pub const PRESET_PROMPTS: [&str; 3] = [
    "What is the current sentiment around Ethereum's upcoming network upgrade?",
    "Compare Bitcoin's on-chain metrics to last quarter.",
    "What are the main risk factors for the crypto market this month?",
];

/// Resolves a shortcut typed instead of a question: `default`, or `1`..`3`
/// for the suggestion buttons.
pub fn preset_prompt(selector: &str) -> Option<&'static str> {
    match selector.trim() {
        "default" => Some(DEFAULT_PROMPT),
        n => n.parse::<usize>().ok().and_then(|i| i.checked_sub(1)).and_then(|i| PRESET_PROMPTS.get(i).copied()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait InsightsClient {
    fn model(&self) -> &str;
    async fn fetch(&self, prompt: &str) -> Result<Insight, InsightsError>;
}

/// Rejects prompts that are empty after trimming.
pub fn validate_prompt(prompt: &str) -> Result<&str, InsightsError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(InsightsError::EmptyPrompt);
    }
    Ok(trimmed)
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug, Default)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug, Default)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Deserialize, Debug, Default)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "tools": [{ "google_search": {} }],
    })
}

/// Maps a raw HTTP status and body to an insight or a typed error.
pub fn parse_generate_response(status: u16, body: &str) -> Result<Insight, InsightsError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());
        if status == 401 || status == 403 || message.contains("API key not valid") {
            return Err(InsightsError::InvalidCredential);
        }
        let message = if message.is_empty() { format!("HTTP {}", status) } else { message };
        return Err(InsightsError::Service { status: Some(status), message });
    }

    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| InsightsError::service(format!("malformed response: {}", e)))?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(InsightsError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(InsightsError::EmptyResponse);
    }

    let citations = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| {
            let web = chunk.web?;
            let uri = web.uri.filter(|u| !u.is_empty())?;
            let title = web.title.filter(|t| !t.is_empty()).unwrap_or_else(|| uri.clone());
            Some(Citation { uri, title })
        })
        .collect();

    Ok(Insight { text, citations })
}

// =============================================================================
// HTTP client
// =============================================================================

pub struct GeminiClient {
    client: Client,
    base: String,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(cfg: &Config) -> Result<Self, InsightsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.insights_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: cfg.insights_base.trim_end_matches('/').to_string(),
            model: cfg.insights_model.clone(),
            api_key: cfg.api_key.clone(),
            retry: RetryConfig::with_max_retries(cfg.insights_max_retries),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base, self.model)
    }

    async fn send_once(&self, prompt: &str) -> Result<Insight, InsightsError> {
        let mut req = self.client.post(self.endpoint()).json(&request_body(prompt));
        if let Some(key) = &self.api_key {
            req = req.header("x-goog-api-key", key);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        parse_generate_response(status, &body)
    }
}

#[async_trait]
impl InsightsClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn fetch(&self, prompt: &str) -> Result<Insight, InsightsError> {
        let prompt = validate_prompt(prompt)?;
        retry_async(&self.retry, "insights.generate", || self.send_once(prompt)).await
    }
}

// =============================================================================
// Session
// =============================================================================

fn outcome_label(result: &Result<Insight, InsightsError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(InsightsError::EmptyPrompt) => "empty_prompt",
        Err(InsightsError::EmptyResponse) => "empty_response",
        Err(InsightsError::InvalidCredential) => "invalid_credential",
        Err(InsightsError::Service { .. }) => "service_error",
        Err(InsightsError::Transport(_)) => "transport_error",
    }
}

/// Latest-request-wins wrapper around a client.
pub struct InsightsSession<C> {
    client: C,
    generation: AtomicU64,
}

impl<C: InsightsClient + Send + Sync> InsightsSession<C> {
    pub fn new(client: C) -> Self {
        Self { client, generation: AtomicU64::new(0) }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Starts a new request generation; earlier tickets become stale.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Passes `result` through if `ticket` is still the latest, else drops it.
    pub fn accept(
        &self,
        ticket: u64,
        result: Result<Insight, InsightsError>,
    ) -> Option<Result<Insight, InsightsError>> {
        let stale = !self.is_current(ticket);
        let citations = result.as_ref().map(|i| i.citations.len()).unwrap_or(0);
        log_insight_outcome(ticket, outcome_label(&result), citations, stale);
        if stale {
            None
        } else {
            Some(result)
        }
    }

    /// Asks a question. `None` means a newer question was asked while this
    /// one was in flight.
    pub async fn ask(&self, prompt: &str) -> Option<Result<Insight, InsightsError>> {
        let prompt = match validate_prompt(prompt) {
            Ok(p) => p,
            Err(err) => return Some(Err(err)),
        };
        let ticket = self.begin();
        log_insight_request(ticket, self.client.model(), &params_hash(prompt));
        let result = self.client.fetch(prompt).await;
        self.accept(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct MockClient {
        calls: AtomicU32,
    }

    impl MockClient {
        fn new() -> Self {
            Self { calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl InsightsClient for MockClient {
        fn model(&self) -> &str {
            "mock"
        }

        async fn fetch(&self, prompt: &str) -> Result<Insight, InsightsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if prompt.starts_with("slow") { 60 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Insight { text: format!("answer to {}", prompt), citations: vec![] })
        }
    }

    #[test]
    fn test_preset_prompt_selectors() {
        assert_eq!(preset_prompt("default"), Some(DEFAULT_PROMPT));
        assert_eq!(preset_prompt(" 2 "), Some(PRESET_PROMPTS[1]));
        assert_eq!(preset_prompt("0"), None);
        assert_eq!(preset_prompt("4"), None);
        assert_eq!(preset_prompt("is btc up?"), None);
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hi");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert!(body["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn test_parse_success_with_citations() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "BTC is "}, {"text": "up."}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example/1", "title": "A"}},
                    {"web": {"uri": "https://b.example/2"}},
                    {"retrievedContext": {}}
                ]}
            }]
        }"#;
        let insight = parse_generate_response(200, body).unwrap();
        assert_eq!(insight.text, "BTC is up.");
        assert_eq!(insight.citations.len(), 2);
        assert_eq!(insight.citations[0].title, "A");
        assert_eq!(insight.citations[1].title, "https://b.example/2");
    }

    #[test]
    fn test_parse_empty_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#;
        assert!(matches!(parse_generate_response(200, body), Err(InsightsError::EmptyResponse)));
        assert!(matches!(parse_generate_response(200, "{}"), Err(InsightsError::EmptyResponse)));
    }

    #[test]
    fn test_parse_error_mapping() {
        let bad_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}}"#;
        assert!(matches!(parse_generate_response(400, bad_key), Err(InsightsError::InvalidCredential)));
        assert!(matches!(parse_generate_response(403, ""), Err(InsightsError::InvalidCredential)));

        let quota = r#"{"error": {"code": 429, "message": "Resource exhausted"}}"#;
        match parse_generate_response(429, quota) {
            Err(InsightsError::Service { status, message }) => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "Resource exhausted");
            }
            other => panic!("unexpected: {:?}", other),
        }

        match parse_generate_response(502, "") {
            Err(e @ InsightsError::Service { .. }) => assert_eq!(e.user_message(), "API Error: HTTP 502"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let session = InsightsSession::new(MockClient::new());
        let first = session.begin();
        let second = session.begin();
        let ok = || Ok(Insight { text: "x".into(), citations: vec![] });
        assert!(session.accept(first, ok()).is_none());
        assert!(session.accept(second, ok()).is_some());
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_client() {
        let session = InsightsSession::new(MockClient::new());
        let result = session.ask("   ").await;
        assert!(matches!(result, Some(Err(InsightsError::EmptyPrompt))));
        assert_eq!(session.client().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_latest_request_wins() {
        let session = InsightsSession::new(MockClient::new());
        let (slow, fast) = tokio::join!(session.ask("slow question"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.ask("fast question").await
        });
        assert!(slow.is_none());
        let fast = fast.unwrap().unwrap();
        assert_eq!(fast.text, "answer to fast question");
    }
}
