//! Configuration schema definitions.
//!
//! This module defines the complete bootstrap configuration for the gateway.
//! All types derive Serde traits for deserialization from the config file.

use serde::{Deserialize, Serialize};

use crate::rules::Rule;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Document store endpoint (rule collection and handler code).
    pub store: StoreConfig,

    /// Dispatch behavior: rule source, admin secret, scratch directory.
    pub dispatch: DispatchConfig,

    /// Bootstrap rules. Admin rules must be declared here; in local mode
    /// this list is the entire rule set.
    pub rules: Vec<Rule>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Outbound mail endpoint for handlers.
    pub mail: MailConfig,

    /// Push notification endpoint for handlers.
    pub push: PushConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Document store endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the document store API.
    pub base_url: String,

    /// Optional bearer token sent with every store request.
    pub api_key: Option<String>,

    /// Request timeout for store calls in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8900".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Where non-admin rules come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Bootstrap config only.
    Local,
    /// The remote rule collection, merged after the admin rules.
    Remote,
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Source of non-admin rules.
    pub source: RuleSource,

    /// Shared secret injected into every admin rule's body conditions.
    pub admin_auth_code: String,

    /// Directory where fetched handler source is materialized.
    /// Defaults to a per-process location under the system temp dir.
    pub scratch_dir: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            source: RuleSource::Local,
            // WARNING: This is a placeholder! Change this in production.
            admin_auth_code: "CHANGE_ME_IN_PRODUCTION".to_string(),
            scratch_dir: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MailConfig {
    /// Enable outbound mail.
    pub enabled: bool,

    /// HTTP mail API endpoint.
    pub endpoint: String,

    /// Sender address.
    pub from: String,

    /// Optional bearer token for the mail API.
    pub token: Option<String>,
}

/// Push notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PushConfig {
    /// Enable push notifications.
    pub enabled: bool,

    /// Messages API endpoint.
    pub endpoint: String,

    /// Application token.
    pub token: String,

    /// Receiving user/group key.
    pub user_key: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.pushover.net/1/messages.json".to_string(),
            token: String::new(),
            user_key: String::new(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
