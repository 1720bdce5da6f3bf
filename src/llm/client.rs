// src/llm/client.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// One entry of the ordered message list sent to the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("generation response carried no extractable text")]
    EmptyContent,
}

/// Stateless request/response boundary to the generation service: takes a
/// model identifier plus an ordered message list, returns extracted text or
/// a failure.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, system: &str, messages: &[Message]) -> Result<String, GenerationError>;
}

/// Ordered list of response fields accepted as the generated text.
/// Validated once here; downstream code only ever sees `Ok(text)`.
const TEXT_FIELDS: &str = "choices[0].message.content, choices[0].text, output_text";

/// HTTP client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenerationClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Extract the generated text through the documented fallback chain.
    fn extract_text(payload: &Value) -> Option<String> {
        let choice = payload.get("choices").and_then(|c| c.get(0));
        let text = choice
            .and_then(|c| c.pointer("/message/content"))
            .and_then(Value::as_str)
            .or_else(|| choice.and_then(|c| c.get("text")).and_then(Value::as_str))
            .or_else(|| payload.get("output_text").and_then(Value::as_str))?;
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[async_trait]
impl Generate for GenerationClient {
    async fn generate(&self, system: &str, messages: &[Message]) -> Result<String, GenerationError> {
        let mut wire: Vec<Message> = Vec::with_capacity(messages.len() + 1);
        wire.push(Message::system(system));
        wire.extend_from_slice(messages);

        debug!("generation request: model={} messages={}", self.model, wire.len());

        let payload = json!({
            "model": self.model,
            "messages": wire,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationError::Upstream { status, detail });
        }

        let body: Value = response.json().await?;
        Self::extract_text(&body).ok_or_else(|| {
            debug!("no text in any of: {}", TEXT_FIELDS);
            GenerationError::EmptyContent
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_primary_chat_completion_field() {
        let body = json!({"choices": [{"message": {"content": "第一章 起点"}}]});
        assert_eq!(GenerationClient::extract_text(&body).unwrap(), "第一章 起点");
    }

    #[test]
    fn falls_back_to_legacy_text_field() {
        let body = json!({"choices": [{"text": "plain completion"}]});
        assert_eq!(GenerationClient::extract_text(&body).unwrap(), "plain completion");
    }

    #[test]
    fn falls_back_to_top_level_output_text() {
        let body = json!({"output_text": "aggregated output"});
        assert_eq!(GenerationClient::extract_text(&body).unwrap(), "aggregated output");
    }

    #[test]
    fn absent_or_blank_text_is_none() {
        assert!(GenerationClient::extract_text(&json!({"choices": []})).is_none());
        assert!(GenerationClient::extract_text(&json!({"choices": [{"message": {"content": "  "}}]})).is_none());
        assert!(GenerationClient::extract_text(&json!({"error": "rate limited"})).is_none());
    }

    #[test]
    fn fallback_order_prefers_message_content() {
        let body = json!({
            "choices": [{"message": {"content": "primary"}, "text": "secondary"}],
            "output_text": "tertiary"
        });
        assert_eq!(GenerationClient::extract_text(&body).unwrap(), "primary");
    }
}
