//! Rule matching logic.
//!
//! # Responsibilities
//! - Evaluate a rule's match conditions against a decoded request
//! - Path matching with deployment-prefix tolerance and trailing wildcard
//! - Body/params field matching with the four-shape wildcard grammar
//!
//! # Design Decisions
//! - Pure functions; no side effects, safe to call concurrently
//! - All string comparisons are case-insensitive; JSON key lookups are not
//! - Fail closed: empty match maps and unknown match fields never match
//! - Non-string configured values compare by strict equality; wildcard
//!   semantics apply to string patterns only

use serde_json::{Map, Value};

use crate::http::request::GatewayRequest;
use crate::rules::rule::Rule;

/// Returns true if every declared condition of `rule` matches the request.
///
/// An empty match map never matches: a rule that would route everything is a
/// configuration defect, not a catch-all.
pub fn matches(req: &GatewayRequest, rule: &Rule) -> bool {
    if rule.match_spec.is_empty() {
        return false;
    }

    rule.match_spec
        .iter()
        .all(|(field, spec)| match field.to_ascii_lowercase().as_str() {
            "path" => spec.as_str().is_some_and(|pattern| match_path(&req.path, pattern)),
            "body" => spec.as_object().is_some_and(|rules| {
                req.body
                    .as_object()
                    .is_some_and(|body| match_fields(body, rules))
            }),
            "params" => spec
                .as_object()
                .is_some_and(|rules| match_fields(&req.params, rules)),
            _ => false,
        })
}

/// Match a request path against a rule pattern.
///
/// Both sides are split on `/` with leading/trailing empty segments dropped.
/// The pattern's first segment must equal the request's first or second
/// segment; the second position tolerates a deployment prefix that some
/// hosting setups prepend. A pattern ending in `*` accepts any longer path;
/// otherwise the request may have at most two segments.
pub fn match_path(req_path: &str, pattern: &str) -> bool {
    let req = segments(req_path);
    let pat = segments(pattern);

    let (Some(req_first), Some(pat_first)) = (req.first(), pat.first()) else {
        return false;
    };

    if req_first != pat_first && req.get(1) != Some(pat_first) {
        return false;
    }

    if pat.last().map(String::as_str) != Some("*") {
        if req.len() > 2 {
            return false;
        }
        if req.len() == 2 && &req[1] != pat_first {
            return false;
        }
    }

    true
}

fn segments(path: &str) -> Vec<String> {
    let trimmed = path.trim_matches('/').to_lowercase();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(str::to_owned).collect()
}

/// Match request fields (body or params) against configured field rules.
///
/// Each declared key must exist. The literal `"*"` succeeds on presence
/// alone. String patterns use [`match_wildcard`] and only match string
/// request values. Any other configured value requires strict equality.
pub fn match_fields(values: &Map<String, Value>, rules: &Map<String, Value>) -> bool {
    rules.iter().all(|(key, expected)| {
        let Some(actual) = values.get(key) else {
            return false;
        };

        match expected {
            Value::String(pattern) if pattern == "*" => true,
            Value::String(pattern) => actual
                .as_str()
                .is_some_and(|value| match_wildcard(value, pattern)),
            other => actual == other,
        }
    })
}

/// Case-insensitive string match with four wildcard shapes:
/// `*` (anything), `*x*` (contains), `*x` (ends with), `x*` (starts with).
/// Anything else is an exact comparison.
pub fn match_wildcard(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase();
    let pattern = pattern.to_lowercase();

    if pattern == "*" {
        true
    } else if let Some(inner) = pattern
        .strip_prefix('*')
        .and_then(|p| p.strip_suffix('*'))
    {
        value.contains(inner)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        value.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        value.starts_with(prefix)
    } else {
        value == pattern
    }
}
