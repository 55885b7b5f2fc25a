//! Shared utilities for integration testing.
//!
//! Spawns an in-process mock document store (the external collaborator the
//! gateway talks to) and gateway instances bound to ephemeral ports.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use switchyard::config::{GatewayConfig, RuleSource};
use switchyard::rules::Rule;
use switchyard::store::{DocumentStore, HttpDocStore};
use switchyard::{GatewayServer, Shutdown};

/// Handle to the mock store's state: documents plus per-document GET counts.
#[derive(Clone)]
pub struct MockStore {
    docs: Arc<DashMap<String, Value>>,
    gets: Arc<DashMap<String, usize>>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn put(&self, collection: &str, id: &str, doc: Value) {
        self.docs.insert(format!("{collection}/{id}"), doc);
    }

    /// How many times the gateway fetched this document.
    pub fn get_count(&self, collection: &str, id: &str) -> usize {
        self.gets
            .get(&format!("{collection}/{id}"))
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }
}

/// Start the mock document store on an ephemeral port.
pub async fn start_mock_store() -> (String, MockStore) {
    let store = MockStore {
        docs: Arc::new(DashMap::new()),
        gets: Arc::new(DashMap::new()),
    };

    let app = Router::new()
        .route(
            "/v1/{collection}/{id}",
            get(get_doc).put(put_doc).delete(delete_doc),
        )
        .route("/v1/{collection}", get(list_docs))
        .with_state(store.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), store)
}

async fn get_doc(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let key = format!("{collection}/{id}");
    *store.gets.entry(key.clone()).or_insert(0) += 1;

    match store.docs.get(&key) {
        Some(doc) => Json(doc.value().clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_doc(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
    Json(doc): Json<Value>,
) -> StatusCode {
    store.docs.insert(format!("{collection}/{id}"), doc);
    StatusCode::OK
}

async fn delete_doc(
    State(store): State<MockStore>,
    Path((collection, id)): Path<(String, String)>,
) -> StatusCode {
    store.docs.remove(&format!("{collection}/{id}"));
    StatusCode::OK
}

async fn list_docs(State(store): State<MockStore>, Path(collection): Path<String>) -> Json<Value> {
    let prefix = format!("{collection}/");
    let mut ids: Vec<String> = store
        .docs
        .iter()
        .filter_map(|entry| entry.key().strip_prefix(&prefix).map(str::to_owned))
        .collect();
    ids.sort();
    Json(json!({ "ids": ids }))
}

/// A gateway config pointed at the mock store, with a unique scratch dir and
/// the standard admin surface wired up (secret: `S3CR3T`).
pub fn test_config(store_base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.store.base_url = store_base.to_string();
    config.store.timeout_secs = 2;
    config.dispatch.source = RuleSource::Remote;
    config.dispatch.admin_auth_code = "S3CR3T".to_string();
    config.dispatch.scratch_dir = Some(
        std::env::temp_dir()
            .join(format!("switchyard-it-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
    );
    config.rules = [
        ("status", "status"),
        ("addHandler", "add-handler"),
        ("deleteHandler", "delete-handler"),
        ("listHandlers", "list-handlers"),
        ("loadHandler", "load-handler"),
        ("addRule", "add-rule"),
        ("deleteRule", "delete-rule"),
        ("loadRules", "load-rules"),
    ]
    .into_iter()
    .map(|(handler, path)| {
        rule(json!({ "handler": handler, "match": { "path": path }, "admin": true }))
    })
    .collect();
    config
}

/// Parse a rule literal for bootstrap lists.
pub fn rule(raw: Value) -> Rule {
    Rule::from_value(raw).unwrap()
}

/// JSON-string-encode handler source the way the code store carries it.
#[allow(dead_code)]
pub fn encode_source(source: &str) -> String {
    Value::String(source.to_string()).to_string()
}

/// Start a gateway on an ephemeral port. Returns its base URL and the
/// shutdown handle keeping it alive.
pub async fn start_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let store: Arc<dyn DocumentStore> = Arc::new(HttpDocStore::new(&config.store).unwrap());
    let server = GatewayServer::new(config, store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (format!("http://{addr}"), shutdown)
}
