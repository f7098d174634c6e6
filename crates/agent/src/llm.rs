//! `LlmClient` — the chat-completion boundary the agent talks through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AgentError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat completion call: a fixed system prompt plus the running
    /// message transcript, returning the model's raw text.
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> Result<String, AgentError>;

    /// Like `chat`, but the response is expected to be a ```json fenced
    /// (or bare) JSON object; the fence is stripped before parsing.
    async fn chat_json(&self, system_prompt: &str, messages: &[Message]) -> Result<serde_json::Value, AgentError> {
        let raw = self.chat(system_prompt, messages).await?;
        parse_json_response(&raw)
    }
}

/// Strip a ```json ... ``` (or bare ```...```) fence if present, matching
/// `original_source`'s `chat_with_structured_output` post-processing.
pub fn parse_json_response(raw: &str) -> Result<serde_json::Value, AgentError> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .strip_suffix("```")
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced).map_err(|_| AgentError::UnexpectedShape)
}

/// Chat-completion client backed by an OpenAI/Azure-style `/chat/completions`
/// endpoint. Bearer-authenticated; a single non-streaming call per turn.
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpLlmClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> Result<String, AgentError> {
        let mut payload_messages = vec![json!({"role": "system", "content": system_prompt})];
        payload_messages.extend(messages.iter().map(|m| json!({"role": m.role, "content": m.content})));

        let body = json!({
            "model": self.model,
            "messages": payload_messages,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(AgentError::UnexpectedShape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence_before_parsing() {
        let raw = "```json\n{\"nodes\": []}\n```";
        let value = parse_json_response(raw).unwrap();
        assert_eq!(value, json!({"nodes": []}));
    }

    #[test]
    fn parses_bare_json_without_a_fence() {
        let value = parse_json_response("{\"nodes\": []}").unwrap();
        assert_eq!(value, json!({"nodes": []}));
    }

    #[test]
    fn non_json_response_is_an_unexpected_shape_error() {
        assert!(matches!(parse_json_response("not json"), Err(AgentError::UnexpectedShape)));
    }
}
