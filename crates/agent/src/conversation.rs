//! Conversation Agent (C6): a bounded state machine over one user turn —
//! `Router -> {Create, Modify, Clarify, Complete} -> Validate? -> Respond`.
//!
//! Mirrors `original_source/services/workflow_agent.py`'s LangGraph, one
//! `match` per LangGraph node rather than a compiled graph object — the
//! conditional edges there (`_route_decision`, `_validation_decision`)
//! become the early returns below.

use catalog::ActionCatalog;
use serde_json::{json, Value};
use tracing::warn;

use crate::llm::{LlmClient, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Modify,
    Clarify,
    Complete,
}

impl Intent {
    fn parse(raw: &str) -> Intent {
        match raw.trim().to_lowercase().as_str() {
            "create" => Intent::Create,
            "modify" => Intent::Modify,
            "clarify" => Intent::Clarify,
            "complete" => Intent::Complete,
            other => {
                warn!(intent = other, "unrecognised intent token, defaulting to create");
                Intent::Create
            }
        }
    }
}

const ROUTER_PROMPT: &str = "You are a workflow assistant. Analyze the user's message and determine their intent.

Possible intents:
- create: User wants to create a new workflow
- modify: User wants to modify existing workflow draft
- clarify: User is answering a clarification question
- complete: User wants to finalize/save the workflow

Return ONLY the intent word, nothing else.";

const CLARIFY_PROMPT: &str = "You are a workflow builder assistant. Generate a helpful clarification question \
to better understand the user's needs. Be specific and actionable.";

const WORKFLOW_JSON_SHAPE: &str = r#"{
    "nodes": [
        {
            "id": "node_1",
            "type": "action",
            "data": {
                "action_name": "action_name_from_catalog",
                "label": "Human readable label",
                "config": {}
            },
            "position": {"x": 100, "y": 100}
        }
    ],
    "edges": [
        {"id": "edge_1", "source": "node_1", "target": "node_2"}
    ]
}"#;

/// One turn's worth of user/assistant exchange plus the current draft.
pub struct TurnResult {
    pub reply: String,
    pub workflow_draft: Option<Value>,
}

/// Process one user message against the running transcript and draft.
pub async fn handle_turn(
    llm: &dyn LlmClient,
    catalog: &ActionCatalog,
    messages: &mut Vec<Message>,
    workflow_draft: &mut Option<Value>,
    user_message: &str,
) -> TurnResult {
    messages.push(Message::user(user_message));

    let has_draft = workflow_draft.is_some();
    let context = format!("Current workflow draft exists: {has_draft}\n\nUser message: {user_message}");
    let intent = match llm.chat(ROUTER_PROMPT, &[Message::user(context)]).await {
        Ok(raw) => Intent::parse(&raw),
        Err(_) => Intent::Create,
    };

    let reply = match intent {
        Intent::Create => {
            if let Some(draft) = create_workflow(llm, catalog, user_message).await {
                *workflow_draft = Some(draft);
            }
            respond_after_validation(intent, workflow_draft, llm).await
        }
        Intent::Modify => {
            if let Some(draft) = modify_workflow(llm, workflow_draft, user_message).await {
                *workflow_draft = Some(draft);
            }
            respond_after_validation(intent, workflow_draft, llm).await
        }
        Intent::Clarify => ask_clarification(llm, messages).await,
        Intent::Complete => "Great! Your workflow is ready. Click 'Save Workflow' to finalize it.".to_string(),
    };

    messages.push(Message::assistant(reply.clone()));
    TurnResult { reply, workflow_draft: workflow_draft.clone() }
}

async fn create_workflow(llm: &dyn LlmClient, catalog: &ActionCatalog, user_description: &str) -> Option<Value> {
    let actions_summary = catalog
        .iter()
        .map(|a| format!("- {}: {}", a.action_name, a.description.clone().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n");

    let system_prompt = format!(
        "You are a workflow builder assistant. Create a workflow based on the user's description.\n\n\
         Available actions:\n{actions_summary}\n\n\
         Return a JSON object with this structure:\n{WORKFLOW_JSON_SHAPE}\n\n\
         Generate a logical workflow that accomplishes the user's goal."
    );

    llm.chat_json(&system_prompt, &[Message::user(user_description)]).await.ok()
}

async fn modify_workflow(llm: &dyn LlmClient, draft: &Option<Value>, modification_request: &str) -> Option<Value> {
    let current = draft.clone().unwrap_or_else(|| json!({"nodes": [], "edges": []}));
    let system_prompt = format!(
        "You are a workflow builder assistant. Modify the existing workflow based on the user's request.\n\n\
         Current workflow:\n{}\n\n\
         User's modification request:\n{modification_request}\n\n\
         Return the COMPLETE modified workflow as JSON with the same structure (nodes and edges).",
        serde_json::to_string_pretty(&current).unwrap_or_default()
    );

    llm.chat_json(&system_prompt, &[Message::user(modification_request)]).await.ok()
}

async fn ask_clarification(llm: &dyn LlmClient, messages: &[Message]) -> String {
    llm.chat(CLARIFY_PROMPT, messages)
        .await
        .unwrap_or_else(|_| "Could you tell me a bit more about what you'd like this workflow to do?".to_string())
}

/// Matches `original_source::_validate_workflow` verbatim: empty nodes or
/// fewer than two nodes routes back through clarification.
fn validate_workflow(draft: &Value) -> Option<String> {
    let nodes = draft.get("nodes").and_then(Value::as_array);
    match nodes.map(|n| n.len()).unwrap_or(0) {
        0 => Some(
            "I couldn't generate any workflow nodes. Could you provide more details about what you want to accomplish?"
                .to_string(),
        ),
        1 => Some("The workflow seems incomplete. Would you like to add more steps?".to_string()),
        _ => None,
    }
}

async fn respond_after_validation(intent: Intent, draft: &Option<Value>, llm: &dyn LlmClient) -> String {
    let Some(draft) = draft else {
        return "I need more information to create your workflow. What would you like it to do?".to_string();
    };

    if let Some(clarification) = validate_workflow(draft) {
        return clarification;
    }

    match intent {
        Intent::Complete => "Great! Your workflow is ready. Click 'Save Workflow' to finalize it.".to_string(),
        Intent::Clarify => ask_clarification(llm, &[]).await,
        _ => {
            let num_steps = draft.get("nodes").and_then(Value::as_array).map(|n| n.len()).unwrap_or(0);
            format!("I've created a workflow with {num_steps} steps. Review it on the canvas and let me know if you'd like any changes!")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlmClient;
    use chrono::Utc;
    use uuid::Uuid;

    fn empty_catalog() -> ActionCatalog {
        ActionCatalog::new(vec![])
    }

    fn seeded_action(name: &str) -> catalog::Action {
        catalog::Action {
            id: Uuid::new_v4(),
            action_name: name.to_string(),
            display_name: None,
            class_name: "Demo".into(),
            method_name: "run".into(),
            domain: "demo".into(),
            endpoint: name.to_string(),
            http_method: "POST".into(),
            description: Some("does a thing".into()),
            parameters: json!({}),
            returns: json!({}),
            category: None,
            tags: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_intent_produces_a_draft_and_step_count_reply() {
        let llm = MockLlmClient::new(vec![
            "create",
            r#"{"nodes": [{"id":"n1","type":"action","data":{"action_name":"ping","label":"Ping","config":{}},"position":{"x":0,"y":0}},
                          {"id":"n2","type":"action","data":{"action_name":"ping","label":"Ping","config":{}},"position":{"x":0,"y":0}}],
               "edges": []}"#,
        ]);
        let catalog = ActionCatalog::new(vec![seeded_action("ping")]);
        let mut messages = vec![];
        let mut draft = None;

        let result = handle_turn(&llm, &catalog, &mut messages, &mut draft, "build me a pinger").await;
        assert!(result.workflow_draft.is_some());
        assert!(result.reply.contains("steps"));
    }

    #[tokio::test]
    async fn unrecognised_intent_token_defaults_to_create() {
        let llm = MockLlmClient::new(vec!["what is this even", r#"{"nodes": [], "edges": []}"#]);
        let catalog = empty_catalog();
        let mut messages = vec![];
        let mut draft = None;
        let result = handle_turn(&llm, &catalog, &mut messages, &mut draft, "hi").await;
        assert!(result.reply.contains("more details") || result.reply.contains("more information"));
    }

    #[tokio::test]
    async fn empty_draft_triggers_clarification_not_crash() {
        let llm = MockLlmClient::new(vec!["create", r#"{"nodes": [], "edges": []}"#]);
        let catalog = empty_catalog();
        let mut messages = vec![];
        let mut draft = None;
        let result = handle_turn(&llm, &catalog, &mut messages, &mut draft, "do something vague").await;
        assert!(result.reply.contains("more details"));
    }

    #[tokio::test]
    async fn complete_intent_gives_fixed_confirmation() {
        let llm = MockLlmClient::new(vec!["complete"]);
        let catalog = empty_catalog();
        let mut messages = vec![];
        let mut draft = Some(json!({"nodes": [{"id": "n1"}, {"id": "n2"}], "edges": []}));
        let result = handle_turn(&llm, &catalog, &mut messages, &mut draft, "looks good, save it").await;
        assert!(result.reply.contains("ready"));
    }

    #[tokio::test]
    async fn llm_failure_during_routing_falls_back_to_create() {
        let llm = MockLlmClient::failing();
        let catalog = empty_catalog();
        let mut messages = vec![];
        let mut draft = None;
        let result = handle_turn(&llm, &catalog, &mut messages, &mut draft, "anything").await;
        assert!(result.reply.contains("more information") || result.reply.contains("more details"));
    }
}
