//! Post-processing applied to an agent-produced workflow draft: resolve
//! each action node against the catalog and fill in display metadata, and
//! suggest a title/description for the finished draft.
//!
//! The enriching step is authoritative over whatever the LLM guessed —
//! an unknown `action_name` is flagged, not invented.

use catalog::ActionCatalog;
use serde_json::Value;
use tracing::warn;

/// Walk `draft["nodes"]` and annotate each action node's `data` object
/// with `action_id`, `domain`, and `display_name` pulled from the catalog.
/// Nodes referencing an unknown or inactive action are left alone besides
/// a logged warning — validation (C2) is what rejects them.
pub fn enrich_nodes(mut draft: Value, catalog: &ActionCatalog) -> Value {
    let Some(nodes) = draft.get_mut("nodes").and_then(Value::as_array_mut) else {
        return draft;
    };

    for node in nodes.iter_mut() {
        let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
        if node_type != "action" {
            continue;
        }

        let action_name = node
            .get("data")
            .and_then(|d| d.get("action_name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let Some(action_name) = action_name else { continue };

        let Some(action) = catalog.get_active(&action_name) else {
            warn!(action_name, "workflow draft references an unknown or inactive action");
            continue;
        };

        if let Some(data) = node.get_mut("data").and_then(Value::as_object_mut) {
            data.insert("action_id".to_string(), Value::String(action.id.to_string()));
            data.insert("domain".to_string(), Value::String(action.domain.clone()));
            data.insert("display_name".to_string(), Value::String(action.resolved_display_name()));
        }
    }

    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn action(name: &str, active: bool) -> catalog::Action {
        catalog::Action {
            id: Uuid::new_v4(),
            action_name: name.to_string(),
            display_name: None,
            class_name: "Demo".into(),
            method_name: "run".into(),
            domain: "demo".into(),
            endpoint: name.to_string(),
            http_method: "POST".into(),
            description: None,
            parameters: json!({}),
            returns: json!({}),
            category: None,
            tags: vec![],
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn known_action_gets_enriched_with_catalog_metadata() {
        let catalog = ActionCatalog::new(vec![action("send_email", true)]);
        let draft = json!({
            "nodes": [{"id": "n1", "type": "action", "data": {"action_name": "send_email"}}],
            "edges": [],
        });

        let enriched = enrich_nodes(draft, &catalog);
        let data = &enriched["nodes"][0]["data"];
        assert_eq!(data["domain"], "demo");
        assert_eq!(data["display_name"], "Send Email");
        assert!(data["action_id"].is_string());
    }

    #[test]
    fn unknown_action_is_left_unenriched() {
        let catalog = ActionCatalog::new(vec![]);
        let draft = json!({
            "nodes": [{"id": "n1", "type": "action", "data": {"action_name": "does_not_exist"}}],
            "edges": [],
        });

        let enriched = enrich_nodes(draft, &catalog);
        assert!(enriched["nodes"][0]["data"].get("action_id").is_none());
    }

    #[test]
    fn inactive_action_is_treated_as_unknown() {
        let catalog = ActionCatalog::new(vec![action("retired", false)]);
        let draft = json!({
            "nodes": [{"id": "n1", "type": "action", "data": {"action_name": "retired"}}],
            "edges": [],
        });

        let enriched = enrich_nodes(draft, &catalog);
        assert!(enriched["nodes"][0]["data"].get("action_id").is_none());
    }

    #[test]
    fn non_action_nodes_pass_through_untouched() {
        let catalog = ActionCatalog::new(vec![]);
        let draft = json!({
            "nodes": [{"id": "n1", "type": "condition", "data": {"condition": "1 == 1"}}],
            "edges": [],
        });

        let enriched = enrich_nodes(draft.clone(), &catalog);
        assert_eq!(enriched, draft);
    }
}
