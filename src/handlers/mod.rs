//! Handler code units and their resolution.
//!
//! # Data Flow
//! ```text
//! Dispatcher ──▶ resolver.rs
//!                  1. registry.rs (trusted, compiled-in) — always wins
//!                  2. process cache (DashMap, lives until shutdown)
//!                  3. code store fetch ─▶ materialize ─▶ script.rs compile
//! resolved Arc<dyn Handler> ──▶ invoked with (request, writer, utils, vars)
//! ```
//!
//! # Design Decisions
//! - The handler contract is an explicit trait, independent of how the code
//!   unit was obtained; native and scripted handlers are indistinguishable
//!   to the dispatcher
//! - Cache entries are never invalidated; picking up a changed remote
//!   handler requires a new process

pub mod builtin;
pub mod registry;
pub mod resolver;
pub mod script;

use async_trait::async_trait;
use serde_json::Map;

use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::store::StoreError;
use crate::utils::PlatformUtils;

pub use registry::LocalRegistry;
pub use resolver::{HandlerResolver, ResolveError};
pub use script::{entry_point, ScriptEngine};

/// Variables carried from the matched rule into the handler, unchanged.
pub type Vars = Map<String, serde_json::Value>;

/// Handler ids double as store document ids and scratch file names, so they
/// are restricted to a filename-safe alphabet.
pub fn is_valid_handler_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Failure inside a handler invocation. Caught at the dispatch boundary and
/// translated to a sanitized 500; never propagated to the transport.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("script execution failed: {0}")]
    Script(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

/// An invocable handler code unit.
///
/// The handler owns the response: it writes status and body through the
/// writer, and the dispatcher converts whatever was written. Returning
/// without writing produces an empty success response.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        vars: &Vars,
    ) -> Result<(), HandlerError>;
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}
