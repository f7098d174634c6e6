//! `MockLlmClient` — a scripted test double for `LlmClient`.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::AgentError;
use crate::llm::{LlmClient, Message};

pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    /// A client that always fails, to exercise fallback behaviour.
    pub fn failing() -> Self {
        Self { responses: Mutex::new(VecDeque::new()) }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> Result<String, AgentError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(AgentError::UnexpectedShape)
    }
}
