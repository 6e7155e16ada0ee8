//! Interpretation of transport replies.
//!
//! Platform SMS bridges disagree on what a send returns: some resolve with
//! `true`, some with `{ "success": true }`, some with a bare status string,
//! some with nothing at all. A reply is accepted unless it carries a truthy
//! `error` field.
//!
//! "No information" counts as success, so a failure whose reply omits `error`
//! goes unnoticed.

use serde_json::Value;

/// Whether a transport reply counts as a successful send.
pub fn is_accepted(reply: &Value) -> bool {
    match reply {
        Value::Bool(true) => true,
        Value::Object(map) if map.get("success") == Some(&Value::Bool(true)) => true,
        other => !is_truthy(other.get("error")),
    }
}

/// Failure reason carried by a rejected reply.
pub fn rejection_reason(reply: &Value) -> String {
    match reply.get("error") {
        Some(Value::String(reason)) => reason.clone(),
        Some(other) => other.to_string(),
        None => "rejected".to_string(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
