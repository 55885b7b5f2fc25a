//! Masking of sensitive values in logged data.
//!
//! Handler payloads routinely carry credentials and personal data. Anything
//! logged from handler context goes through this pass first: values under
//! suspicious keys keep a short prefix and lose the rest.

use serde_json::{Map, Value};

const SENSITIVE: &[&str] = &[
    "token",
    "password",
    "secret",
    "private",
    "authorization",
    "auth_code",
    "email",
    "phone",
    "address",
];

/// Return a copy of `value` with sensitive leaf values masked.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(mask_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}

fn mask_object(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let masked = match value {
                Value::Object(_) | Value::Array(_) => mask_sensitive(value),
                leaf if is_sensitive_key(key) => mask_value(leaf),
                leaf => leaf.clone(),
            };
            (key.clone(), masked)
        })
        .collect()
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    // URL-ish keys are exempt: they frequently contain "address"-like words
    // but are needed intact for debugging.
    if key.starts_with("url") || key.ends_with("url") || key.starts_with("uri") || key.ends_with("uri")
    {
        return false;
    }
    SENSITIVE.iter().any(|pattern| key.contains(pattern))
}

fn mask_value(value: &Value) -> Value {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let shown = if text.len() > 7 { 4 } else { 1 };
    let prefix: String = text.chars().take(shown).collect();
    Value::String(format!("{prefix}****"))
}
