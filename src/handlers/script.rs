//! Scripted handlers.
//!
//! # Responsibilities
//! - Compile handler source text fetched from the code store
//! - Verify the expected entry function exists before accepting a unit
//! - Invoke scripts off the async runtime so a slow script suspends only its
//!   own request
//! - Expose the platform utilities to scripts as host functions
//!
//! # Design Decisions
//! - One shared engine instance; compiled units carry their own AST
//! - Scripts return a `#{status, headers, body}` map (or nothing); they
//!   cannot touch the transport directly
//! - Host utility calls are queued on a channel, never awaited in-script

use std::sync::Arc;

use async_trait::async_trait;
use rhai::{Dynamic, Engine, ImmutableString, Scope, AST};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::handlers::{Handler, HandlerError, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::utils::{mask_sensitive, PlatformUtils, UtilEvent};

/// Derive the entry-point function name for a handler id:
/// `"handle"` plus the id with its first letter capitalized.
pub fn entry_point(handler_id: &str) -> String {
    let mut chars = handler_id.chars();
    match chars.next() {
        Some(first) => format!("handle{}{}", first.to_uppercase(), chars.as_str()),
        None => "handle".to_string(),
    }
}

/// Compilation failures for handler source text.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("parse error: {0}")]
    Parse(#[from] rhai::ParseError),

    #[error("entry function `{entry}` not found")]
    MissingEntry { entry: String },
}

/// Shared script engine with the host utility functions registered.
#[derive(Clone)]
pub struct ScriptEngine {
    engine: Arc<Engine>,
}

impl ScriptEngine {
    pub fn new(utils: UnboundedSender<UtilEvent>) -> Self {
        let mut engine = Engine::new();

        engine.register_fn("log", |data: Dynamic| {
            let value = rhai::serde::from_dynamic::<Value>(&data).unwrap_or(Value::Null);
            tracing::info!(target: "switchyard::handler", data = %mask_sensitive(&value), "handler log");
        });
        engine.register_fn("log", |data: Dynamic, level: ImmutableString| {
            let value = rhai::serde::from_dynamic::<Value>(&data).unwrap_or(Value::Null);
            let masked = mask_sensitive(&value);
            match level.to_lowercase().as_str() {
                "debug" => tracing::debug!(target: "switchyard::handler", data = %masked, "handler log"),
                "warn" | "warning" => tracing::warn!(target: "switchyard::handler", data = %masked, "handler log"),
                "error" => tracing::error!(target: "switchyard::handler", data = %masked, "handler log"),
                _ => tracing::info!(target: "switchyard::handler", data = %masked, "handler log"),
            }
        });

        let tx = utils.clone();
        engine.register_fn(
            "send_mail",
            move |to: ImmutableString, subject: ImmutableString, body: Dynamic| {
                let body = rhai::serde::from_dynamic::<Value>(&body).unwrap_or(Value::Null);
                let _ = tx.send(UtilEvent::Mail {
                    to: to.to_string(),
                    subject: subject.to_string(),
                    body,
                });
            },
        );

        let tx = utils;
        engine.register_fn(
            "notify",
            move |title: ImmutableString, message: ImmutableString| {
                let _ = tx.send(UtilEvent::Notify {
                    title: Some(title.to_string()),
                    message: message.to_string(),
                });
            },
        );

        Self {
            engine: Arc::new(engine),
        }
    }

    /// Compile source text into an invocable handler, verifying the derived
    /// entry function is defined.
    pub fn compile(&self, handler_id: &str, source: &str) -> Result<ScriptHandler, ScriptError> {
        let ast = self.engine.compile(source)?;
        let entry = entry_point(handler_id);

        if !ast.iter_functions().any(|f| f.name == entry) {
            return Err(ScriptError::MissingEntry { entry });
        }

        Ok(ScriptHandler {
            engine: self.engine.clone(),
            ast: Arc::new(ast),
            entry,
        })
    }
}

/// What a script may hand back from its entry function.
#[derive(Debug, Deserialize)]
struct ScriptOutcome {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    headers: Option<std::collections::BTreeMap<String, String>>,
    #[serde(default)]
    body: Option<Value>,
}

/// A compiled script code unit.
pub struct ScriptHandler {
    engine: Arc<Engine>,
    ast: Arc<AST>,
    entry: String,
}

impl std::fmt::Debug for ScriptHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHandler")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for ScriptHandler {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        _utils: &PlatformUtils,
        vars: &Vars,
    ) -> Result<(), HandlerError> {
        let req_arg = rhai::serde::to_dynamic(req)
            .ok()
            .and_then(|value| value.try_cast::<rhai::Map>())
            .ok_or_else(|| HandlerError::Script("request is not convertible".to_string()))?;
        let vars_arg = rhai::serde::to_dynamic(vars)
            .ok()
            .and_then(|value| value.try_cast::<rhai::Map>())
            .ok_or_else(|| HandlerError::Script("vars are not convertible".to_string()))?;

        let engine = self.engine.clone();
        let ast = self.ast.clone();
        let entry = self.entry.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            engine.call_fn::<Dynamic>(&mut Scope::new(), &ast, &entry, (req_arg, vars_arg))
        })
        .await
        .map_err(|err| HandlerError::Internal(format!("script task failed: {err}")))?
        .map_err(|err| HandlerError::Script(err.to_string()))?;

        if outcome.is_unit() {
            return Ok(());
        }

        let outcome: ScriptOutcome = rhai::serde::from_dynamic(&outcome)
            .map_err(|err| HandlerError::Script(format!("unexpected return value: {err}")))?;

        if let Some(status) = outcome.status {
            res.status(u16::try_from(status).unwrap_or(500));
        }
        if let Some(headers) = outcome.headers {
            for (name, value) in headers {
                res.header(name, value);
            }
        }
        if let Some(body) = outcome.body {
            res.send(body);
        }

        Ok(())
    }
}
