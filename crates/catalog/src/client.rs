//! HTTP client for the *external* action catalog service.
//!
//! This is distinct from [`crate::ActionCatalog`] (the in-memory registry
//! the engine consults): it fetches a possibly richer action listing from
//! a separate service, used by the conversation agent to enrich workflow
//! drafts with catalog metadata (display names, domains, ids).
//!
//! Grounded on `original_source/services/action_service_client.py`.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::Action;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A single entry as returned by the external catalog, used only for
/// enrichment lookups (lighter-weight than the full [`Action`] model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalActionEntry {
    pub id: Option<String>,
    pub action_name: String,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Metadata looked up by action name, the shape the agent's node
/// enrichment step actually consumes.
#[derive(Debug, Clone)]
pub struct LookupEntry {
    pub action_id: Option<String>,
    pub domain: Option<String>,
    pub display_name: String,
}

pub type ActionLookup = HashMap<String, LookupEntry>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FetchResponse {
    Wrapped { actions: Vec<ExternalActionEntry> },
    Bare(Vec<ExternalActionEntry>),
}

/// Client for the external action catalog service used by the agent.
#[derive(Debug, Clone)]
pub struct ActionServiceClient {
    http: reqwest::Client,
    base_url: String,
    auth_user: String,
    auth_password: String,
}

impl ActionServiceClient {
    pub fn new(base_url: impl Into<String>, auth_user: impl Into<String>, auth_password: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client builds with a fixed timeout");
        Self {
            http,
            base_url: base_url.into(),
            auth_user: auth_user.into(),
            auth_password: auth_password.into(),
        }
    }

    /// Fetch the full action list from the external catalog.
    ///
    /// Network/shape errors are logged and surfaced as an empty list
    /// rather than propagated — mirrors the original client, which is
    /// best-effort enrichment, not a hard dependency of workflow
    /// execution.
    pub async fn fetch_actions(&self) -> Vec<ExternalActionEntry> {
        let url = format!("{}/api/actions", self.base_url);

        let response = match self
            .http
            .get(&url)
            .basic_auth(&self.auth_user, Some(&self.auth_password))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!("network error fetching external catalog: {err}");
                return Vec::new();
            }
        };

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(err) => {
                warn!("external catalog returned an error status: {err}");
                return Vec::new();
            }
        };

        match response.json::<FetchResponse>().await {
            Ok(FetchResponse::Wrapped { actions }) => actions,
            Ok(FetchResponse::Bare(actions)) => actions,
            Err(err) => {
                warn!("unexpected response shape from external catalog: {err}");
                Vec::new()
            }
        }
    }

    /// Build a lookup keyed by `action_name`, generating a display name
    /// when the upstream entry didn't provide one.
    pub async fn build_action_lookup(&self) -> ActionLookup {
        self.fetch_actions()
            .await
            .into_iter()
            .map(|entry| {
                let display_name = entry
                    .display_name
                    .clone()
                    .unwrap_or_else(|| Action::generate_display_name(&entry.action_name));
                (
                    entry.action_name.clone(),
                    LookupEntry {
                        action_id: entry.id,
                        domain: entry.domain.or(entry.category),
                        display_name,
                    },
                )
            })
            .collect()
    }

    /// Build the full, invocable [`ActionCatalog`] the engine validates and
    /// dispatches against: fetch external metadata, then derive each
    /// action's endpoint from `action_service_url` the way
    /// `original_source`'s activity hardcodes it
    /// (`{ACTION_SERVICE_URL}/api/v1/actions/{action_name}`, method POST —
    /// the external metadata response carries no endpoint of its own).
    pub async fn build_catalog(&self, action_service_url: &str) -> crate::ActionCatalog {
        use chrono::Utc;
        use uuid::Uuid;

        let actions = self.fetch_actions().await.into_iter().map(|entry| {
            let display_name = entry
                .display_name
                .clone()
                .unwrap_or_else(|| Action::generate_display_name(&entry.action_name));
            let now = Utc::now();
            Action {
                id: entry
                    .id
                    .as_deref()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .unwrap_or_else(Uuid::new_v4),
                action_name: entry.action_name.clone(),
                display_name: Some(display_name),
                class_name: String::new(),
                method_name: String::new(),
                domain: entry.domain.clone().or(entry.category.clone()).unwrap_or_default(),
                endpoint: format!("{action_service_url}/api/v1/actions/{}", entry.action_name),
                http_method: "POST".to_string(),
                description: entry.description.clone(),
                parameters: entry.parameters.clone(),
                returns: serde_json::json!({}),
                category: entry.category.clone(),
                tags: vec![],
                is_active: entry.is_active,
                created_at: now,
                updated_at: now,
            }
        });

        crate::ActionCatalog::new(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_response_parses() {
        let raw = r#"[{"action_name": "ping", "domain": null}]"#;
        let parsed: FetchResponse = serde_json::from_str(raw).unwrap();
        match parsed {
            FetchResponse::Bare(entries) => assert_eq!(entries.len(), 1),
            FetchResponse::Wrapped { .. } => panic!("expected bare array"),
        }
    }

    #[test]
    fn wrapped_response_parses() {
        let raw = r#"{"actions": [{"action_name": "ping"}]}"#;
        let parsed: FetchResponse = serde_json::from_str(raw).unwrap();
        match parsed {
            FetchResponse::Wrapped { actions } => assert_eq!(actions.len(), 1),
            FetchResponse::Bare(_) => panic!("expected wrapped object"),
        }
    }
}
