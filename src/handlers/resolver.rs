//! Handler resolution.
//!
//! # Responsibilities
//! - Resolve a handler id to an invocable unit with fixed precedence:
//!   trusted registry, then process cache, then the remote code store
//! - Materialize fetched source into the scratch directory before loading
//! - Cache loaded units for the process lifetime
//!
//! # Design Decisions
//! - The registry wins unconditionally, even when a remote unit with the
//!   same id exists and differs
//! - Concurrent first-time resolutions of one id may fetch twice; both
//!   produce the same unit and the cache overwrite is idempotent
//! - Handler ids are restricted to a filename-safe alphabet; anything else
//!   resolves as not-found

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::handlers::registry::LocalRegistry;
use crate::handlers::script::ScriptEngine;
use crate::handlers::{is_valid_handler_id, Handler};
use crate::store::{DocumentStore, StoreError};

/// Failure to produce an invocable unit for a handler id.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("handler `{0}` not found in any source")]
    NotFound(String),

    #[error("handler `{id}` failed to load: {reason}")]
    Load { id: String, reason: String },

    #[error("failed to materialize handler `{id}`: {source}")]
    Materialize {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves handler ids to invocable units, loading and caching as needed.
pub struct HandlerResolver {
    registry: LocalRegistry,
    store: Arc<dyn DocumentStore>,
    engine: ScriptEngine,
    cache: DashMap<String, Arc<dyn Handler>>,
    scratch_dir: PathBuf,
}

impl HandlerResolver {
    pub fn new(
        registry: LocalRegistry,
        store: Arc<dyn DocumentStore>,
        engine: ScriptEngine,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            store,
            engine,
            cache: DashMap::new(),
            scratch_dir,
        }
    }

    /// Resolve `handler_id` to an invocable unit.
    pub async fn resolve(&self, handler_id: &str) -> Result<Arc<dyn Handler>, ResolveError> {
        if !is_valid_handler_id(handler_id) {
            return Err(ResolveError::NotFound(handler_id.to_string()));
        }

        if let Some(handler) = self.registry.get(handler_id) {
            return Ok(handler);
        }

        if let Some(cached) = self.cache.get(handler_id) {
            return Ok(cached.value().clone());
        }

        let handler = self.load_remote(handler_id).await?;
        self.cache.insert(handler_id.to_string(), handler.clone());
        Ok(handler)
    }

    async fn load_remote(&self, handler_id: &str) -> Result<Arc<dyn Handler>, ResolveError> {
        let doc = self
            .store
            .get_doc("handlers", handler_id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(handler_id.to_string()))?;

        let encoded = doc
            .get("code")
            .and_then(Value::as_str)
            .ok_or_else(|| ResolveError::Load {
                id: handler_id.to_string(),
                reason: "document has no `code` field".to_string(),
            })?;

        // The stored code is a JSON-string-encoded blob of source text.
        let source: String =
            serde_json::from_str(encoded).map_err(|err| ResolveError::Load {
                id: handler_id.to_string(),
                reason: format!("`code` is not a JSON-encoded string: {err}"),
            })?;

        let path = self.scratch_dir.join(format!("{handler_id}.rhai"));
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|err| ResolveError::Materialize {
                id: handler_id.to_string(),
                source: err,
            })?;
        tokio::fs::write(&path, &source)
            .await
            .map_err(|err| ResolveError::Materialize {
                id: handler_id.to_string(),
                source: err,
            })?;
        tracing::debug!(handler = %handler_id, path = %path.display(), "materialized handler source");

        let engine = self.engine.clone();
        let id = handler_id.to_string();
        let handler = tokio::task::spawn_blocking(move || {
            // Load from the materialized copy, not the in-memory string, so
            // the scratch file is exactly what ran.
            let text = std::fs::read_to_string(&path).map_err(|err| ResolveError::Materialize {
                id: id.clone(),
                source: err,
            })?;
            engine.compile(&id, &text).map_err(|err| ResolveError::Load {
                id: id.clone(),
                reason: err.to_string(),
            })
        })
        .await
        .map_err(|err| ResolveError::Load {
            id: handler_id.to_string(),
            reason: format!("load task failed: {err}"),
        })??;

        tracing::info!(handler = %handler_id, "loaded handler from code store");
        Ok(Arc::new(handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::handlers::builtin::HelloWorld;
    use crate::store::MemoryStore;

    fn scratch() -> PathBuf {
        std::env::temp_dir().join(format!("switchyard-test-{}", uuid::Uuid::new_v4()))
    }

    fn resolver_with(store: Arc<MemoryStore>, registry: LocalRegistry) -> HandlerResolver {
        let (tx, _rx) = mpsc::unbounded_channel();
        HandlerResolver::new(registry, store, ScriptEngine::new(tx), scratch())
    }

    fn code_doc(id: &str, source: &str) -> serde_json::Value {
        json!({
            "handler_id": id,
            "code": Value::String(source.to_string()).to_string(),
        })
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let resolver = resolver_with(Arc::new(MemoryStore::new()), LocalRegistry::empty());
        let err = resolver.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_id_is_not_found_without_touching_the_store() {
        let resolver = resolver_with(Arc::new(MemoryStore::new()), LocalRegistry::empty());
        let err = resolver.resolve("../escape").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[tokio::test]
    async fn registry_wins_over_remote_code() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_doc(
                "handlers",
                "helloWorld",
                code_doc("helloWorld", "fn handleHelloWorld(req, vars) { }"),
            )
            .await
            .unwrap();

        let mut registry = LocalRegistry::empty();
        registry.register("helloWorld", Arc::new(HelloWorld));

        let resolver = resolver_with(store.clone(), registry);
        resolver.resolve("helloWorld").await.unwrap();

        // The remote copy was never materialized: nothing was loaded from
        // the store, so the cache stays empty.
        assert!(resolver.cache.is_empty());
    }

    #[tokio::test]
    async fn remote_handler_is_fetched_once_and_cached() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_doc(
                "handlers",
                "greet",
                code_doc("greet", "fn handleGreet(req, vars) { #{ status: 200 } }"),
            )
            .await
            .unwrap();

        let resolver = resolver_with(store.clone(), LocalRegistry::empty());
        resolver.resolve("greet").await.unwrap();

        // Remove the backing document; a cached unit must still resolve.
        store.delete_doc("handlers", "greet").await.unwrap();
        resolver.resolve("greet").await.unwrap();
    }

    #[tokio::test]
    async fn code_that_is_not_json_encoded_fails_to_load() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_doc(
                "handlers",
                "greet",
                json!({ "handler_id": "greet", "code": "fn handleGreet(req, vars) { }" }),
            )
            .await
            .unwrap();

        let resolver = resolver_with(store, LocalRegistry::empty());
        let err = resolver.resolve("greet").await.unwrap_err();
        assert!(matches!(err, ResolveError::Load { .. }));
    }

    #[tokio::test]
    async fn source_without_entry_function_fails_to_load() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_doc(
                "handlers",
                "greet",
                code_doc("greet", "fn wrongName(req, vars) { }"),
            )
            .await
            .unwrap();

        let resolver = resolver_with(store, LocalRegistry::empty());
        let err = resolver.resolve("greet").await.unwrap_err();
        assert!(matches!(err, ResolveError::Load { .. }));
    }
}
