//! `MockActionExecutor` — a test double for `ActivityInvoker`.
//!
//! Lets executor tests script a sequence of outcomes per action name
//! without starting an HTTP server, and records every call received so
//! retry/call-count assertions (e.g. "exactly three outbound calls") can
//! be written directly against it.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::invoker::ActivityInvoker;
use crate::model::{ActivityConfig, ActivityOutcome};

/// A scripted queue of outcomes for one action name. Each call pops the
/// front entry; once the queue is drained the last entry repeats.
pub struct MockActionExecutor {
    scripts: HashMap<String, Vec<ActivityOutcome>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockActionExecutor {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script `action_name` to always return the given outcome.
    pub fn with_outcome(mut self, action_name: impl Into<String>, outcome: ActivityOutcome) -> Self {
        self.scripts.insert(action_name.into(), vec![outcome]);
        self
    }

    /// Script `action_name` to return outcomes in order, one per call,
    /// repeating the final entry once exhausted. Useful for modelling
    /// "fails twice, then succeeds".
    pub fn with_outcomes(
        mut self,
        action_name: impl Into<String>,
        outcomes: Vec<ActivityOutcome>,
    ) -> Self {
        self.scripts.insert(action_name.into(), outcomes);
        self
    }

    /// Every `(action_name, configurations)` pair observed, in call order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, action_name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(name, _)| name == action_name)
            .count()
    }
}

impl Default for MockActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityInvoker for MockActionExecutor {
    async fn invoke(&self, config: &ActivityConfig) -> ActivityOutcome {
        let action_name = config.endpoint.clone();
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((action_name.clone(), config.configurations.clone()));
            calls
                .iter()
                .filter(|(name, _)| name == &action_name)
                .count()
        };

        match self.scripts.get(&action_name) {
            Some(outcomes) if !outcomes.is_empty() => {
                let idx = (seen - 1).min(outcomes.len() - 1);
                outcomes[idx].clone()
            }
            _ => ActivityOutcome::Failed {
                error: format!("no script registered for action '{action_name}'"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(action_name: &str) -> ActivityConfig {
        ActivityConfig {
            endpoint: action_name.to_string(),
            http_method: "POST".to_string(),
            auth_user: None,
            auth_password: None,
            event_data: json!({}),
            configurations: json!({}),
            data: json!({}),
        }
    }

    #[tokio::test]
    async fn replays_scripted_sequence_then_repeats_last() {
        let mock = MockActionExecutor::new().with_outcomes(
            "send_email",
            vec![
                ActivityOutcome::Failed { error: "500".into() },
                ActivityOutcome::Failed { error: "500".into() },
                ActivityOutcome::Success { data: json!({"ok": true}) },
            ],
        );

        assert!(!mock.invoke(&config("send_email")).await.is_success());
        assert!(!mock.invoke(&config("send_email")).await.is_success());
        assert!(mock.invoke(&config("send_email")).await.is_success());
        assert!(mock.invoke(&config("send_email")).await.is_success());
        assert_eq!(mock.call_count("send_email"), 4);
    }

    #[tokio::test]
    async fn unscripted_action_fails() {
        let mock = MockActionExecutor::new();
        let outcome = mock.invoke(&config("unknown")).await;
        assert!(!outcome.is_success());
    }
}
