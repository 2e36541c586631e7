use std::pin::Pin;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ChatConfig, KnowledgeStrategy};
use crate::errors::AppError;
use crate::models::Message;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Beta opt-ins required for server-managed skills and the code-execution
/// tool they depend on. Only sent in skills mode.
const SKILLS_BETA: &str = "code-execution-2025-08-25,skills-2025-10-02";

// ── Stream events ─────────────────────────────────────────────────────────────

/// One SSE event from the vendor Messages stream. Kept deliberately loose:
/// only the fields the adapter consumes are modeled, and unknown event types
/// pass through with just their `type` tag.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<MessageStart>,
    #[serde(default)]
    pub delta: Option<EventDelta>,
    #[serde(default)]
    pub error: Option<UpstreamError>,
}

/// Payload of a `message_start` event.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageStart {
    #[serde(default)]
    pub id: Option<String>,
}

/// Delta payload shared by `content_block_delta` (text fragments) and
/// `message_delta` (turn-level stop reason).
#[derive(Debug, Clone, Deserialize)]
pub struct EventDelta {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Payload of a vendor-side `error` event.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AppError>> + Send>>;

/// Seam between the handler and the hosted completion API, so the handler is
/// testable against a fake upstream.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issues one streaming completion request for the normalized
    /// conversation. Exactly one attempt; no retries.
    async fn stream_completion(&self, messages: &[Message]) -> Result<EventStream, AppError>;
}

// ── Request body ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<SkillContainer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolSpec>>,
}

#[derive(Debug, Serialize)]
struct SkillContainer<'a> {
    skills: &'a [String],
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Streaming client for the vendor Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl AnthropicClient {
    pub fn new(config: ChatConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| AppError::config("ANTHROPIC_API_KEY contains invalid characters"))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        if matches!(config.knowledge, KnowledgeStrategy::Skills(_)) {
            headers.insert("anthropic-beta", HeaderValue::from_static(SKILLS_BETA));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(AppError::UpstreamTransport)?;

        Ok(Self { http, config })
    }

    fn request_body<'a>(&'a self, messages: &'a [Message]) -> MessagesRequest<'a> {
        let (system, container, tools) = match &self.config.knowledge {
            KnowledgeStrategy::SystemPrompt(prompt) => (Some(prompt.as_str()), None, None),
            KnowledgeStrategy::Skills(ids) => (
                None,
                Some(SkillContainer { skills: ids }),
                Some(vec![ToolSpec { kind: "code_execution" }]),
            ),
        };

        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages,
            stream: true,
            system,
            container,
            tools,
        }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    async fn stream_completion(&self, messages: &[Message]) -> Result<EventStream, AppError> {
        let url = self.config.endpoint("/v1/messages");
        debug!(model = %self.config.model, messages = messages.len(), "starting completion");

        let response = self
            .http
            .post(&url)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(AppError::UpstreamTransport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamRejected { status: status.as_u16(), body });
        }

        let events = response.bytes_stream().eventsource().map(|item| match item {
            Ok(event) => serde_json::from_str::<StreamEvent>(&event.data)
                .map_err(|e| AppError::stream(format!("malformed upstream event: {e}"))),
            Err(e) => Err(AppError::stream(e.to_string())),
        });

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn config(knowledge: KnowledgeStrategy) -> ChatConfig {
        ChatConfig {
            api_key: "test-key".into(),
            base_url: "https://api.anthropic.com".into(),
            model: "claude-sonnet-4-5-20250929".into(),
            temperature: 0.7,
            max_tokens: 4096,
            knowledge,
        }
    }

    #[test]
    fn system_prompt_mode_sends_system_and_no_container() {
        let client =
            AnthropicClient::new(config(KnowledgeStrategy::SystemPrompt("prompt".into())))
                .unwrap();
        let messages =
            vec![Message { role: MessageRole::User, content: "hi".into() }];

        let body = serde_json::to_value(client.request_body(&messages)).unwrap();
        assert_eq!(body["system"], "prompt");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("container").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn skills_mode_sends_container_and_code_execution_tool() {
        let client = AnthropicClient::new(config(KnowledgeStrategy::Skills(vec![
            "skill_1".into(),
            "skill_2".into(),
        ])))
        .unwrap();

        let body = serde_json::to_value(client.request_body(&[])).unwrap();
        assert_eq!(body["container"]["skills"], serde_json::json!(["skill_1", "skill_2"]));
        assert_eq!(body["tools"][0]["type"], "code_execution");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn events_deserialize_from_vendor_payloads() {
        let start: StreamEvent = serde_json::from_str(
            r#"{"type":"message_start","message":{"id":"msg_abc","role":"assistant"}}"#,
        )
        .unwrap();
        assert_eq!(start.kind, "message_start");
        assert_eq!(start.message.unwrap().id.as_deref(), Some("msg_abc"));

        let delta: StreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
        )
        .unwrap();
        let delta = delta.delta.unwrap();
        assert_eq!(delta.kind.as_deref(), Some("text_delta"));
        assert_eq!(delta.text.as_deref(), Some("Hi"));

        let unknown: StreamEvent =
            serde_json::from_str(r#"{"type":"content_block_start","content_block":{}}"#).unwrap();
        assert_eq!(unknown.kind, "content_block_start");
    }
}
