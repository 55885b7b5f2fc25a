//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router: one catch-all route, any method, any path
//! - Wire middleware (request ID, tracing, timeout, body limit)
//! - Assemble the dispatch pipeline (stores, registry, resolver, utilities)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - There is no static route table; every request goes through dispatch
//! - All subsystems are constructed once here and shared via Arc, so the
//!   pipeline is testable without a live transport

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::handlers::{HandlerResolver, LocalRegistry, ScriptEngine};
use crate::http::request::{GatewayRequest, UuidRequestId, X_REQUEST_ID};
use crate::rules::RuleStore;
use crate::store::DocumentStore;
use crate::utils::{self, Mailer, Notifier, PlatformUtils};

/// Application state injected into the ingress handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_size: usize,
}

/// The gateway's HTTP server.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Assemble the full dispatch pipeline around the given document store.
    pub fn new(config: GatewayConfig, store: Arc<dyn DocumentStore>) -> Self {
        let (utils_tx, utils_rx) = mpsc::unbounded_channel();

        let mailer = Arc::new(Mailer::new(config.mail.clone()));
        let notifier = Arc::new(Notifier::new(config.push.clone()));
        utils::spawn_worker(utils_rx, mailer.clone(), notifier.clone());

        let engine = ScriptEngine::new(utils_tx);
        let registry = LocalRegistry::builtin(&engine);

        let scratch_dir = config
            .dispatch
            .scratch_dir
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("switchyard-handlers"));

        let resolver = HandlerResolver::new(registry, store.clone(), engine, scratch_dir);
        let rules = RuleStore::new(&config, store.clone());
        let platform = PlatformUtils {
            store,
            mailer,
            notifier,
        };

        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(rules, resolver, platform)),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let max_body_size = state.max_body_size;
        Router::new()
            .fallback(ingress_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// The single externally reachable operation: decode and dispatch.
async fn ingress_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let req = GatewayRequest::decode(request, state.max_body_size).await;

    tracing::debug!(
        request_id = %req.headers.get(X_REQUEST_ID).and_then(serde_json::Value::as_str).unwrap_or("unknown"),
        method = %req.method,
        path = %req.path,
        "request received"
    );

    state.dispatcher.dispatch(req).await
}
