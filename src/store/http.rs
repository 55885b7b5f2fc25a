//! HTTP document store client.
//!
//! Documents live at `{base_url}/v1/{collection}/{id}` and are plain JSON
//! bodies. An optional bearer token authenticates every request.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::store::{DocumentStore, StoreError};

/// Document store backed by a remote HTTP JSON API.
pub struct HttpDocStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpDocStore {
    /// Create a client from the bootstrap store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        // Validate the endpoint up front so a typo fails at startup.
        url::Url::parse(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{}/{}", self.base_url, collection, id)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/v1/{}", self.base_url, collection)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocStore {
    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let resp = self
            .authorize(self.client.get(self.doc_url(collection, id)))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status().as_u16(),
                doc: format!("{collection}/{id}"),
            });
        }

        Ok(Some(resp.json().await?))
    }

    async fn put_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let resp = self
            .authorize(self.client.put(self.doc_url(collection, id)))
            .json(&doc)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status().as_u16(),
                doc: format!("{collection}/{id}"),
            });
        }
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let resp = self
            .authorize(self.client.delete(self.doc_url(collection, id)))
            .send()
            .await?;

        // Delete is idempotent; a missing document is fine.
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::Status {
                status: resp.status().as_u16(),
                doc: format!("{collection}/{id}"),
            });
        }
        Ok(())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let resp = self
            .authorize(self.client.get(self.collection_url(collection)))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status().as_u16(),
                doc: collection.to_string(),
            });
        }

        let body: Value = resp.json().await?;
        let ids = body
            .get("ids")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Malformed {
                doc: collection.to_string(),
                reason: "listing response has no `ids` array".to_string(),
            })?;

        Ok(ids
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect())
    }
}
