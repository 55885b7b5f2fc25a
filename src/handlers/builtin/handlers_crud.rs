//! Handler CRUD: the administrative surface for stored handler code.
//!
//! All of these read or write the `handlers` collection of the document
//! store. Source text is stored JSON-string-encoded in the `code` field,
//! exactly the form the resolver decodes.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::handlers::builtin::HANDLER_TEMPLATE;
use crate::handlers::script::ScriptEngine;
use crate::handlers::{is_valid_handler_id, Handler, HandlerError, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::utils::PlatformUtils;

fn body_str<'a>(req: &'a GatewayRequest, field: &str) -> Option<&'a str> {
    req.body.get(field).and_then(Value::as_str)
}

/// Store or replace a handler's source after validating it compiles and
/// defines the expected entry function.
pub struct AddHandler {
    engine: ScriptEngine,
}

impl AddHandler {
    pub fn new(engine: ScriptEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Handler for AddHandler {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let Some(name) = body_str(req, "name") else {
            res.status(400).send(json!({"error": "Handler name is required"}));
            return Ok(());
        };
        if !is_valid_handler_id(name) {
            res.status(400).send(json!({"error": "Handler name is invalid"}));
            return Ok(());
        }
        let Some(code) = body_str(req, "code") else {
            res.status(400).send(json!({"error": "Handler code is required"}));
            return Ok(());
        };

        if let Err(err) = self.engine.compile(name, code) {
            res.status(400).send(json!({
                "error": "Code validation failed.",
                "result": err.to_string(),
            }));
            return Ok(());
        }

        let doc = json!({
            "handler_id": name,
            "code": Value::String(code.to_string()).to_string(),
        });

        if let Err(err) = utils.store.put_doc("handlers", name, doc).await {
            tracing::error!(handler = %name, error = %err, "failed to store handler");
            res.status(500).send(json!({"error": "Unable to save handler"}));
            return Ok(());
        }

        res.send(json!({"msg": "Handler added."}));
        Ok(())
    }
}

/// Remove a handler from the code store.
pub struct DeleteHandler;

#[async_trait]
impl Handler for DeleteHandler {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let Some(name) = body_str(req, "name") else {
            res.status(400).send(json!({"error": "Handler name is required"}));
            return Ok(());
        };

        if let Err(err) = utils.store.delete_doc("handlers", name).await {
            tracing::error!(handler = %name, error = %err, "failed to delete handler");
            res.status(500).send(json!({"error": "Unable to delete handler"}));
            return Ok(());
        }

        res.send(json!({"msg": "Handler deleted."}));
        Ok(())
    }
}

/// List the ids of all stored handlers.
pub struct ListHandlers;

#[async_trait]
impl Handler for ListHandlers {
    async fn handle(
        &self,
        _req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        match utils.store.list_ids("handlers").await {
            Ok(ids) => res.send(json!({"handlers": ids})),
            Err(err) => {
                tracing::error!(error = %err, "failed to list handlers");
                res.status(500).send(json!({"error": "Failed to list handlers"}));
            }
        }
        Ok(())
    }
}

/// Return one stored handler with its source decoded for editing.
pub struct LoadHandler;

#[async_trait]
impl Handler for LoadHandler {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let Some(name) = body_str(req, "name") else {
            res.status(400).send(json!({"error": "Handler name is required"}));
            return Ok(());
        };

        let doc = match utils.store.get_doc("handlers", name).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                res.status(404).send(json!({"error": "Handler not found"}));
                return Ok(());
            }
            Err(err) => {
                tracing::error!(handler = %name, error = %err, "failed to load handler");
                res.status(500).send(json!({"error": "Failed to load handler"}));
                return Ok(());
            }
        };

        let code = doc
            .get("code")
            .and_then(Value::as_str)
            .and_then(|encoded| serde_json::from_str::<String>(encoded).ok())
            .unwrap_or_default();

        res.send(json!({"name": name, "code": code}));
        Ok(())
    }
}

/// Return the starter template for new handlers.
///
/// An operator can override the compiled-in template by storing one,
/// JSON-string-encoded, in the `handler` field of `config/templates`.
pub struct HandlerTemplate;

#[async_trait]
impl Handler for HandlerTemplate {
    async fn handle(
        &self,
        _req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let stored = match utils.store.get_doc("config", "templates").await {
            Ok(doc) => doc,
            Err(err) => {
                tracing::info!(error = %err, "template document unavailable, using builtin");
                None
            }
        };

        let template = stored
            .as_ref()
            .and_then(|doc| doc.get("handler"))
            .and_then(Value::as_str)
            .and_then(|encoded| serde_json::from_str::<String>(encoded).ok())
            .unwrap_or_else(|| HANDLER_TEMPLATE.to_string());

        res.send(json!({"template": template}));
        Ok(())
    }
}
