//! Title/description suggestion for a finished workflow draft (one LLM
//! call with a deterministic fallback so the feature degrades instead of
//! failing outright).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{LlmClient, Message};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedMetadata {
    pub title: String,
    pub description: String,
}

const METADATA_PROMPT: &str = "You are naming a workflow automation. Given the list of steps, \
return a JSON object {\"title\": \"...\", \"description\": \"...\"} with a short, \
specific title (under 8 words) and a one-sentence description.";

/// `nodes` and `edges` are the raw arrays from a workflow draft/config,
/// as produced by [`crate::enrich::enrich_nodes`].
pub async fn suggest_metadata(nodes: &[Value], llm: &dyn LlmClient) -> SuggestedMetadata {
    let action_names: Vec<String> = nodes
        .iter()
        .filter_map(|n| n.get("data")?.get("action_name")?.as_str().map(str::to_string))
        .collect();

    let fallback = fallback_metadata(&action_names);

    let steps_summary = action_names.join(", ");
    let user_message = format!("Steps: {steps_summary}");

    match llm.chat_json(METADATA_PROMPT, &[Message::user(user_message)]).await {
        Ok(value) => serde_json::from_value(value).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn fallback_metadata(action_names: &[String]) -> SuggestedMetadata {
    if action_names.is_empty() {
        return SuggestedMetadata {
            title: "Untitled Workflow".to_string(),
            description: "Workflow with 0 steps".to_string(),
        };
    }

    SuggestedMetadata {
        title: format!("Workflow with {} steps", action_names.len()),
        description: action_names.join(" -> "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlmClient;
    use serde_json::json;

    #[tokio::test]
    async fn successful_llm_call_is_used_verbatim() {
        let llm = MockLlmClient::new(vec![r#"{"title": "Nightly Report", "description": "Sends the nightly sales report"}"#]);
        let nodes = vec![json!({"data": {"action_name": "send_email"}})];
        let metadata = suggest_metadata(&nodes, &llm).await;
        assert_eq!(metadata.title, "Nightly Report");
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_step_count_title() {
        let llm = MockLlmClient::failing();
        let nodes = vec![
            json!({"data": {"action_name": "send_email"}}),
            json!({"data": {"action_name": "log_event"}}),
        ];
        let metadata = suggest_metadata(&nodes, &llm).await;
        assert_eq!(metadata.title, "Workflow with 2 steps");
        assert_eq!(metadata.description, "send_email -> log_event");
    }

    #[tokio::test]
    async fn empty_nodes_fall_back_to_untitled() {
        let llm = MockLlmClient::failing();
        let metadata = suggest_metadata(&[], &llm).await;
        assert_eq!(metadata.title, "Untitled Workflow");
    }
}
