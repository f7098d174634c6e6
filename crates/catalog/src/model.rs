//! The `Action` catalog entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An action: a named, externally-hosted HTTP operation invokable by the
/// engine. Immutable from the engine's point of view — seeding and
/// editing the catalog happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    /// Unique registry key, e.g. `"send_email"`.
    pub action_name: String,
    pub display_name: Option<String>,
    pub class_name: String,
    pub method_name: String,
    pub domain: String,
    /// Absolute URL template the activity invoker will call.
    pub endpoint: String,
    pub http_method: String,
    pub description: Option<String>,
    /// JSON-schema-ish description of accepted configuration.
    #[serde(default)]
    pub parameters: serde_json::Value,
    /// JSON-shape description of what the action returns.
    #[serde(default)]
    pub returns: serde_json::Value,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Action {
    /// Generate a human title from a snake_case action name, used when no
    /// `display_name` was seeded. Mirrors the original catalog client's
    /// `_generate_display_name` (snake_case → Title Case).
    pub fn generate_display_name(action_name: &str) -> String {
        action_name
            .replace('_', " ")
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn resolved_display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| Self::generate_display_name(&self.action_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_title_case_from_snake_case() {
        assert_eq!(Action::generate_display_name("send_email"), "Send Email");
        assert_eq!(Action::generate_display_name("ping"), "Ping");
        assert_eq!(Action::generate_display_name(""), "");
    }
}
