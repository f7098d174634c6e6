//! State interpolator (C3): substitutes `{{dot.path}}` references in a
//! node's configuration with values from the accumulated workflow state.
//!
//! Pure — never mutates `state`. Recurses through objects and arrays;
//! scalars pass through unchanged; strings have every non-overlapping
//! `{{ ... }}` match replaced.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Non-greedy against the first `}}`, matching the documented syntax:
    // one placeholder per match, no escaping.
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").unwrap())
}

/// Resolve a dot-separated path (e.g. `results.node_3.data.file_url`)
/// against a `serde_json::Value` tree. Returns `None` if any segment is
/// missing or the value being indexed isn't an object.
pub fn resolve_path<'a>(path: &str, state: &'a Value) -> Option<&'a Value> {
    let mut current = state;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Render a resolved value as the string form used in interpolation.
/// Strings are emitted verbatim (unquoted); everything else uses its
/// JSON representation.
fn value_to_interpolated_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute every `{{path}}` placeholder found in `value` against
/// `state`, recursing through maps and sequences. Missing paths resolve
/// to the literal string `"None"` — a documented quirk carried forward
/// unchanged (see SPEC_FULL.md §4.2 / DESIGN.md).
pub fn interpolate(value: &Value, state: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate_string(s, state)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate(v, state)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate(v, state)).collect()),
        other => other.clone(),
    }
}

fn interpolate_string(input: &str, state: &Value) -> String {
    placeholder_pattern()
        .replace_all(input, |caps: &regex::Captures| {
            let path = caps[1].trim();
            match resolve_path(path, state) {
                Some(value) => value_to_interpolated_string(value),
                None => "None".to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_a_single_placeholder() {
        let state = json!({"results": {"a": {"value": "hi"}}});
        let config = json!({"msg": "{{results.a.value}}"});
        let out = interpolate(&config, &state);
        assert_eq!(out, json!({"msg": "hi"}));
    }

    #[test]
    fn missing_path_resolves_to_literal_none() {
        let state = json!({"results": {}});
        let config = json!("{{results.missing.path}}");
        let out = interpolate(&config, &state);
        assert_eq!(out, json!("None"));
    }

    #[test]
    fn recurses_through_nested_maps_and_arrays() {
        let state = json!({"inputs": {"name": "ada"}});
        let config = json!({
            "list": ["{{inputs.name}}", {"nested": "{{inputs.name}}"}],
            "untouched": 42,
        });
        let out = interpolate(&config, &state);
        assert_eq!(
            out,
            json!({
                "list": ["ada", {"nested": "ada"}],
                "untouched": 42,
            })
        );
    }

    #[test]
    fn non_string_scalars_pass_through_unchanged() {
        let state = json!({});
        assert_eq!(interpolate(&json!(42), &state), json!(42));
        assert_eq!(interpolate(&json!(true), &state), json!(true));
        assert_eq!(interpolate(&json!(null), &state), json!(null));
    }

    #[test]
    fn idempotent_on_strings_without_placeholders() {
        let state = json!({"inputs": {"x": 1}});
        let plain = json!("no placeholders here");
        assert_eq!(interpolate(&plain, &state), plain);
    }

    #[test]
    fn interpolation_does_not_mutate_state() {
        let state = json!({"results": {"a": {"value": "hi"}}});
        let before = state.clone();
        let _ = interpolate(&json!("{{results.a.value}}"), &state);
        assert_eq!(state, before);
    }

    #[test]
    fn non_greedy_match_stops_at_first_closing_braces() {
        let state = json!({"a": "1", "b": "2"});
        let config = json!("{{a}} and {{b}}");
        let out = interpolate(&config, &state);
        assert_eq!(out, json!("1 and 2"));
    }
}
