//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check bootstrap rules are well formed: non-empty match maps, known
//!   match fields, correctly typed specs
//! - Require a real admin secret when admin rules exist
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<...>>
//! - Bootstrap rules are held to a higher standard than remote rules: a
//!   defect here fails startup, the same defect in a remote rule merely
//!   never matches

use serde_json::Value;

use crate::config::schema::GatewayConfig;

const MATCH_FIELDS: &[&str] = &["path", "body", "params"];

/// A single semantic defect in the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    BindAddress(String),

    #[error("store.base_url `{0}` is not a valid URL")]
    StoreUrl(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("rule #{index} has an empty handler id")]
    EmptyHandler { index: usize },

    #[error("rule `{handler}` has an empty match map and would never match")]
    EmptyMatch { handler: String },

    #[error("rule `{handler}` uses unknown match field `{field}`")]
    UnknownMatchField { handler: String, field: String },

    #[error("rule `{handler}`: `path` condition must be a string")]
    PathNotString { handler: String },

    #[error("rule `{handler}`: `{field}` condition must be an object")]
    FieldsNotObject { handler: String, field: String },

    #[error("admin rules are configured but dispatch.admin_auth_code is empty")]
    MissingAdminSecret,
}

/// Validate the bootstrap configuration, collecting every defect.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if url::Url::parse(&config.store.base_url).is_err() {
        errors.push(ValidationError::StoreUrl(config.store.base_url.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.handler.is_empty() {
            errors.push(ValidationError::EmptyHandler { index });
            continue;
        }

        if rule.match_spec.is_empty() {
            errors.push(ValidationError::EmptyMatch {
                handler: rule.handler.clone(),
            });
        }

        for (field, spec) in &rule.match_spec {
            let normalized = field.to_ascii_lowercase();
            if !MATCH_FIELDS.contains(&normalized.as_str()) {
                errors.push(ValidationError::UnknownMatchField {
                    handler: rule.handler.clone(),
                    field: field.clone(),
                });
                continue;
            }
            match normalized.as_str() {
                "path" => {
                    if !matches!(spec, Value::String(_)) {
                        errors.push(ValidationError::PathNotString {
                            handler: rule.handler.clone(),
                        });
                    }
                }
                _ => {
                    if !matches!(spec, Value::Object(_)) {
                        errors.push(ValidationError::FieldsNotObject {
                            handler: rule.handler.clone(),
                            field: field.clone(),
                        });
                    }
                }
            }
        }
    }

    if config.rules.iter().any(|rule| rule.admin)
        && config.dispatch.admin_auth_code.is_empty()
    {
        errors.push(ValidationError::MissingAdminSecret);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use serde_json::json;

    fn config_with_rules(rules: Vec<Value>) -> GatewayConfig {
        GatewayConfig {
            rules: rules
                .into_iter()
                .map(|raw| Rule::from_value(raw).unwrap())
                .collect(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = config_with_rules(vec![
            json!({ "handler": "a" }),
            json!({ "handler": "b", "match": { "headers": {} } }),
        ]);
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn empty_match_map_is_a_config_error() {
        let config = config_with_rules(vec![json!({ "handler": "a" })]);
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EmptyMatch { .. }));
    }

    #[test]
    fn unknown_match_field_is_a_config_error() {
        let config =
            config_with_rules(vec![json!({ "handler": "a", "match": { "cookie": "*" } })]);
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::UnknownMatchField { .. }
        ));
    }

    #[test]
    fn mistyped_specs_are_config_errors() {
        let config = config_with_rules(vec![
            json!({ "handler": "a", "match": { "path": 42 } }),
            json!({ "handler": "b", "match": { "body": "nope" } }),
        ]);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn admin_rules_require_a_secret() {
        let mut config = config_with_rules(vec![json!({
            "handler": "a",
            "match": { "path": "a" },
            "admin": true
        })]);
        config.dispatch.admin_auth_code = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingAdminSecret));
    }
}
