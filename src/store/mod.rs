//! Document store access.
//!
//! # Data Flow
//! ```text
//! Rule Store Adapter ──┐
//! Handler Resolver  ───┼──▶ DocumentStore trait ──▶ http.rs (remote JSON documents)
//! Builtin handlers  ───┘                        └─▶ memory.rs (tests, local dev)
//! ```
//!
//! # Design Decisions
//! - One trait for both the rule store and the code store; they are the same
//!   backend addressed by collection name
//! - Dispatch-time access is read-only; writes happen only through the admin
//!   handlers
//! - `get_doc` distinguishes "absent" (Ok(None)) from "backend failed" (Err)

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpDocStore;
pub use memory::MemoryStore;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a usable response (connect, timeout, decode).
    #[error("document store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with an unexpected HTTP status.
    #[error("document store returned status {status} for {doc}")]
    Status { status: u16, doc: String },

    /// The document exists but does not have the expected shape.
    #[error("malformed document {doc}: {reason}")]
    Malformed { doc: String, reason: String },

    /// The configured store endpoint is not a valid URL.
    #[error("invalid store endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Read/write access to an external document store.
///
/// Documents are arbitrary JSON values addressed by `collection/id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document. `Ok(None)` means the document does not exist.
    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or replace a document.
    async fn put_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is not an error.
    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// List the ids of all documents in a collection.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError>;
}
