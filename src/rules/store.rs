//! Rule set construction.
//!
//! # Responsibilities
//! - Build the ordered rule set for one request lifecycle
//! - Inject the shared admin secret into admin rules' body conditions
//! - Merge bootstrap and remote rules with admin precedence
//! - Degrade to bootstrap rules when the remote source is unreachable
//!
//! # Design Decisions
//! - Admin rules come only from the bootstrap configuration; a remote rule
//!   can never claim an admin handler id
//! - The merge is an explicit two-list step so precedence is testable on its
//!   own, without a live store
//! - Remote rules are appended in lexicographic id order to keep
//!   first-match-wins deterministic

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{GatewayConfig, RuleSource};
use crate::rules::rule::Rule;
use crate::store::{DocumentStore, StoreError};

/// Field injected into every admin rule's body match-spec.
pub const AUTH_FIELD: &str = "auth_code";

/// Builds the effective rule set for each request.
pub struct RuleStore {
    bootstrap: Vec<Rule>,
    source: RuleSource,
    admin_auth_code: String,
    store: Arc<dyn DocumentStore>,
}

impl RuleStore {
    pub fn new(config: &GatewayConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            bootstrap: config.rules.clone(),
            source: config.dispatch.source,
            admin_auth_code: config.dispatch.admin_auth_code.clone(),
            store,
        }
    }

    /// Build the rule set for one request.
    ///
    /// Never fails: losing the remote source costs the remote rules, not the
    /// request. Bootstrap failures are impossible here because the bootstrap
    /// list was validated at startup.
    pub async fn load(&self) -> Vec<Rule> {
        let admin = self.admin_rules();

        let rest = match self.effective_source().await {
            RuleSource::Local => self
                .bootstrap
                .iter()
                .filter(|rule| !rule.admin)
                .cloned()
                .collect(),
            RuleSource::Remote => match self.fetch_remote().await {
                Ok(rules) => rules,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "remote rule source unavailable, serving admin rules only"
                    );
                    Vec::new()
                }
            },
        };

        merge(admin, rest)
    }

    /// Admin rules from the bootstrap config, with the shared secret added
    /// to their body conditions. A request that lacks the secret simply does
    /// not match; there is no separate authorization layer.
    fn admin_rules(&self) -> Vec<Rule> {
        self.bootstrap
            .iter()
            .filter(|rule| rule.admin)
            .cloned()
            .map(|rule| with_secret(rule, &self.admin_auth_code))
            .collect()
    }

    /// Resolve which source to use for non-admin rules.
    ///
    /// When configured for the remote source, the `config/settings` document
    /// can pin the gateway back to bootstrap rules (a remote kill-switch).
    async fn effective_source(&self) -> RuleSource {
        if self.source == RuleSource::Local {
            return RuleSource::Local;
        }

        match self.store.get_doc("config", "settings").await {
            Ok(Some(settings)) => {
                if settings.get("source").and_then(Value::as_str) == Some("local") {
                    tracing::info!("remote settings pin the rule source to local");
                    RuleSource::Local
                } else {
                    RuleSource::Remote
                }
            }
            Ok(None) => RuleSource::Remote,
            Err(err) => {
                tracing::warn!(error = %err, "could not read remote settings");
                RuleSource::Remote
            }
        }
    }

    async fn fetch_remote(&self) -> Result<Vec<Rule>, StoreError> {
        let Some(doc) = self.store.get_doc("config", "rules").await? else {
            return Ok(Vec::new());
        };

        let Some(map) = doc.as_object() else {
            tracing::warn!("remote rule collection is not an object, ignoring");
            return Ok(Vec::new());
        };

        // Lexicographic id order keeps the appended remote rules
        // deterministic across fetches.
        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let rules = entries
            .into_iter()
            .filter_map(|(id, raw)| match Rule::from_value(raw.clone()) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    tracing::debug!(rule = %id, error = %err, "skipping malformed remote rule");
                    None
                }
            })
            .collect();

        Ok(rules)
    }
}

/// Concatenate admin rules with the remaining rules, dropping any rule whose
/// handler id is already claimed by an admin rule.
pub fn merge(admin: Vec<Rule>, rest: Vec<Rule>) -> Vec<Rule> {
    let claimed: HashSet<String> = admin.iter().map(|rule| rule.handler.clone()).collect();

    admin
        .into_iter()
        .chain(
            rest.into_iter()
                .filter(|rule| !claimed.contains(&rule.handler)),
        )
        .collect()
}

fn with_secret(mut rule: Rule, auth_code: &str) -> Rule {
    let body = rule
        .match_spec
        .entry("body".to_string())
        .or_insert_with(|| json!({}));
    if let Some(map) = body.as_object_mut() {
        map.insert(AUTH_FIELD.to_string(), json!(auth_code));
    }
    rule
}
