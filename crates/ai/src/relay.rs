//! Relay of free-form chat messages to the Gemini REST API.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SYSTEM_INSTRUCTION: &str = "You are a personalized savings goal tracker chatbot. \
NEVER answer anything else other than savings goal tracking related";

/// Connection settings for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// `None` leaves the relay unconfigured; every call then fails with
    /// `BackendUnavailable`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ChatConfig {
    /// Reads `GEMINI_API_KEY`, `ST_CHAT_MODEL` and `ST_CHAT_BASE_URL`.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty("GEMINI_API_KEY"),
            model: non_empty("ST_CHAT_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("ST_CHAT_BASE_URL").unwrap_or(defaults.base_url),
            timeout: defaults.timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Who is asking; used only as a hint in the system instruction.
    #[serde(default)]
    pub user_name: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
}

/// A chat backend. Implementations must not receive ledger data.
#[async_trait]
pub trait ChatRelayTrait: Send + Sync {
    async fn relay(&self, request: ChatRequest) -> Result<ChatReply, ChatError>;
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_reply(self) -> Result<ChatReply, ChatError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ChatError::BlockedContent(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ChatError::BlockedContent("SAFETY".to_string()));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(ChatReply { text })
    }
}

// ============================================================================
// Relay
// ============================================================================

pub struct GeminiRelay {
    client: reqwest::Client,
    config: ChatConfig,
}

impl GeminiRelay {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        if !config.is_configured() {
            warn!("GEMINI_API_KEY is not set; chat requests will be refused");
        }
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ChatRelayTrait for GeminiRelay {
    async fn relay(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::invalid_input("No message received."));
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::unavailable("chat backend is not configured"))?;

        let instruction = match request.user_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                format!("{SYSTEM_INSTRUCTION}. The user you are talking to is {name}.")
            }
            _ => SYSTEM_INSTRUCTION.to_string(),
        };
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: message }],
            }],
        };

        debug!("Relaying chat message to model {}", self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Chat backend answered {}: {}", status, detail);
            return Err(ChatError::unavailable(format!(
                "chat backend answered with status {status}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatError::unavailable(format!("unreadable chat response: {e}")))?;
        parsed.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_for(server: &MockServer) -> GeminiRelay {
        GeminiRelay::new(ChatConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..ChatConfig::default()
        })
        .unwrap()
    }

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite:generateContent";

    #[tokio::test]
    async fn test_relay_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "How do I save?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Start small." }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let reply = relay_for(&server)
            .relay(ChatRequest::new("  How do I save?  "))
            .await
            .unwrap();
        assert_eq!(reply.text, "Start small.");
    }

    #[tokio::test]
    async fn test_system_instruction_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_partial_json(json!({
                "system_instruction": { "parts": [{
                    "text": "You are a personalized savings goal tracker chatbot. NEVER answer anything else other than savings goal tracking related"
                }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        relay_for(&server)
            .relay(ChatRequest::new("hello"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_message_is_invalid_input() {
        let server = MockServer::start().await;
        let err = relay_for(&server)
            .relay(ChatRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let relay = GeminiRelay::new(ChatConfig::default()).unwrap();
        let err = relay.relay(ChatRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.code(), "BACKEND_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = relay_for(&server)
            .relay(ChatRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_prompt_block_is_blocked_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "PROHIBITED_CONTENT" }
            })))
            .mount(&server)
            .await;

        let err = relay_for(&server)
            .relay(ChatRequest::new("something bad"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ChatError::BlockedContent("PROHIBITED_CONTENT".to_string())
        );
    }

    #[tokio::test]
    async fn test_safety_finish_is_blocked_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let err = relay_for(&server)
            .relay(ChatRequest::new("hmm"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BLOCKED_CONTENT");
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = relay_for(&server)
            .relay(ChatRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::EmptyResponse);
    }
}
