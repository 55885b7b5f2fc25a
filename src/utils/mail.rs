//! Outbound mail via an HTTP mail API.

use serde_json::{json, Value};

use crate::config::MailConfig;
use crate::utils::UtilError;

/// Sends mail through the endpoint configured in the bootstrap config.
pub struct Mailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Deliver one message. `body` may be any JSON value; the provider is
    /// responsible for rendering.
    pub async fn send(&self, to: &str, subject: &str, body: &Value) -> Result<(), UtilError> {
        if !self.config.enabled || self.config.endpoint.is_empty() {
            return Err(UtilError::Disabled);
        }

        let mut request = self.client.post(&self.config.endpoint).json(&json!({
            "from": self.config.from,
            "to": to,
            "subject": subject,
            "body": body,
        }));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(UtilError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }
}
