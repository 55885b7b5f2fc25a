//! In-memory document store.
//!
//! Used by unit tests and local development where no remote store is running.
//! Shares the concurrency shape of the handler cache: a DashMap keyed by
//! `collection/id`, safe to clone and share across tasks.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::store::{DocumentStore, StoreError};

/// Process-local document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(collection: &str, id: &str) -> String {
        format!("{collection}/{id}")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .docs
            .get(&Self::key(collection, id))
            .map(|entry| entry.value().clone()))
    }

    async fn put_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.docs.insert(Self::key(collection, id), doc);
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.docs.remove(&Self::key(collection, id));
        Ok(())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{collection}/");
        let mut ids: Vec<String> = self
            .docs
            .iter()
            .filter_map(|entry| entry.key().strip_prefix(&prefix).map(str::to_owned))
            .collect();
        ids.sort();
        Ok(ids)
    }
}
