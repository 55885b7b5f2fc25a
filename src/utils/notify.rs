//! Push notifications via a Pushover-style messages API.

use serde_json::{json, Value};

use crate::config::PushConfig;
use crate::utils::UtilError;

/// Sends push notifications through the configured messages endpoint.
pub struct Notifier {
    config: PushConfig,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, title: Option<&str>, message: &str) -> Result<(), UtilError> {
        if !self.config.enabled
            || self.config.token.is_empty()
            || self.config.user_key.is_empty()
        {
            return Err(UtilError::Disabled);
        }

        let mut payload = json!({
            "token": self.config.token,
            "user": self.config.user_key,
            "message": message,
        });
        if let Some(title) = title {
            payload["title"] = json!(title);
        }

        let resp = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UtilError::Rejected(resp.status().as_u16()));
        }

        // The messages API reports acceptance in the body, not the status.
        let body: Value = resp.json().await?;
        if body.get("status").and_then(Value::as_i64) != Some(1) {
            return Err(UtilError::Rejected(200));
        }
        Ok(())
    }
}
