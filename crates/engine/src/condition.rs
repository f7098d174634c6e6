//! Safe condition evaluation for `condition` nodes (C5).
//!
//! The source left `_evaluate_condition` always returning `true`; the
//! REDESIGNED behaviour here actually evaluates a condition string, but
//! deliberately does not grow into a general expression language (an
//! explicit non-goal). The grammar is one comparison:
//!
//! ```text
//! <operand> <op> <operand>
//! op  ::= "==" | "!=" | "<=" | ">=" | "<" | ">"
//! operand ::= "{{" dot.path "}}" | dot.path | number | "true" | "false" | "'literal'" | "\"literal\""
//! ```
//!
//! An empty condition evaluates to `true` (matches the legacy default when
//! no condition was ever configured). A non-empty condition that doesn't
//! parse as one comparison also evaluates to `true`, with a warning logged
//! — this is conservative fallback, not silent data loss, and is recorded
//! as an explicit decision in DESIGN.md.

use serde_json::Value;
use tracing::warn;

use crate::interpolator::resolve_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Evaluate a condition string against the accumulated workflow state.
pub fn evaluate(condition: &str, state: &Value) -> bool {
    let trimmed = condition.trim();
    if trimmed.is_empty() {
        return true;
    }

    match parse_comparison(trimmed) {
        Some((lhs, op, rhs)) => {
            let lhs_value = resolve_operand(lhs, state);
            let rhs_value = resolve_operand(rhs, state);
            compare(&lhs_value, op, &rhs_value)
        }
        None => {
            warn!("condition '{condition}' is not a recognised comparison; defaulting to true");
            true
        }
    }
}

fn parse_comparison(input: &str) -> Option<(&str, Op, &str)> {
    const OPERATORS: &[(&str, Op)] = &[
        ("==", Op::Eq),
        ("!=", Op::Ne),
        ("<=", Op::Le),
        (">=", Op::Ge),
        ("<", Op::Lt),
        (">", Op::Gt),
    ];

    for (token, op) in OPERATORS {
        if let Some(idx) = input.find(token) {
            let lhs = input[..idx].trim();
            let rhs = input[idx + token.len()..].trim();
            if !lhs.is_empty() && !rhs.is_empty() {
                return Some((lhs, *op, rhs));
            }
        }
    }
    None
}

fn resolve_operand(token: &str, state: &Value) -> Value {
    let token = token.trim();

    if let Some(inner) = token
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
    {
        return resolve_path(inner.trim(), state).cloned().unwrap_or(Value::Null);
    }

    if let Some(literal) = strip_quotes(token) {
        return Value::String(literal.to_string());
    }

    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "None" => return Value::Null,
        _ => {}
    }

    if let Ok(n) = token.parse::<f64>() {
        return Value::from(n);
    }

    // Bare dot-path: resolve against state; fall back to treating the raw
    // token as a string literal if it isn't a known path.
    resolve_path(token, state)
        .cloned()
        .unwrap_or_else(|| Value::String(token.to_string()))
}

fn strip_quotes(token: &str) -> Option<&str> {
    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return Some(&token[1..token.len() - 1]);
        }
    }
    None
}

fn compare(lhs: &Value, op: Op, rhs: &Value) -> bool {
    match op {
        Op::Eq => values_equal(lhs, rhs),
        Op::Ne => !values_equal(lhs, rhs),
        _ => match (as_f64(lhs), as_f64(rhs)) {
            (Some(l), Some(r)) => match op {
                Op::Lt => l < r,
                Op::Le => l <= r,
                Op::Gt => l > r,
                Op::Ge => l >= r,
                Op::Eq | Op::Ne => unreachable!(),
            },
            _ => false,
        },
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    if let (Some(l), Some(r)) = (as_f64(lhs), as_f64(rhs)) {
        return l == r;
    }
    lhs == rhs
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_condition_is_true() {
        assert!(evaluate("", &json!({})));
        assert!(evaluate("   ", &json!({})));
    }

    #[test]
    fn unrecognised_condition_defaults_to_true() {
        assert!(evaluate("do something clever", &json!({})));
    }

    #[test]
    fn compares_dot_path_against_literal_string() {
        let state = json!({"results": {"check": {"status": "ok"}}});
        assert!(evaluate("{{results.check.status}} == 'ok'", &state));
        assert!(!evaluate("{{results.check.status}} == 'fail'", &state));
    }

    #[test]
    fn compares_numeric_paths() {
        let state = json!({"inputs": {"count": 5}});
        assert!(evaluate("{{inputs.count}} > 3", &state));
        assert!(!evaluate("{{inputs.count}} > 10", &state));
        assert!(evaluate("{{inputs.count}} >= 5", &state));
    }

    #[test]
    fn bare_dot_path_without_braces_resolves() {
        let state = json!({"inputs": {"flag": true}});
        assert!(evaluate("inputs.flag == true", &state));
    }

    #[test]
    fn not_equal_operator() {
        let state = json!({"inputs": {"status": "pending"}});
        assert!(evaluate("{{inputs.status}} != 'done'", &state));
    }

    #[test]
    fn missing_path_resolves_null_and_compares_unequal_to_literal() {
        let state = json!({});
        assert!(evaluate("{{missing.path}} != 'x'", &state));
    }
}
