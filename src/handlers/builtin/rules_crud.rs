//! Rule CRUD: the administrative surface for the remote rule collection.
//!
//! The mutable rules live in a single `config/rules` document mapping
//! handler id to rule; edits are read-modify-write of that document.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::handlers::builtin::RULE_TEMPLATE;
use crate::handlers::{Handler, HandlerError, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::rules::Rule;
use crate::utils::PlatformUtils;

fn rule_id(req: &GatewayRequest) -> Option<&str> {
    // Accept both the current field name and the legacy one.
    req.body
        .get("handler")
        .or_else(|| req.body.get("function"))
        .and_then(Value::as_str)
}

async fn load_catalog(utils: &PlatformUtils) -> Result<Map<String, Value>, crate::store::StoreError> {
    Ok(utils
        .store
        .get_doc("config", "rules")
        .await?
        .and_then(|doc| doc.as_object().cloned())
        .unwrap_or_default())
}

/// Add or replace one rule in the remote collection.
pub struct AddRule;

#[async_trait]
impl Handler for AddRule {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let Some(id) = rule_id(req) else {
            res.status(400).send(json!({"error": "Rule handler id is required"}));
            return Ok(());
        };

        // The document is stored as submitted, but it has to parse as a rule.
        if let Err(err) = Rule::from_value(req.body.clone()) {
            res.status(400).send(json!({
                "error": "Rule validation failed.",
                "result": err.to_string(),
            }));
            return Ok(());
        }

        let mut catalog = match load_catalog(utils).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "failed to read rule collection");
                res.status(500).send(json!({"error": "Failed to save rule"}));
                return Ok(());
            }
        };
        catalog.insert(id.to_string(), req.body.clone());

        if let Err(err) = utils
            .store
            .put_doc("config", "rules", Value::Object(catalog))
            .await
        {
            tracing::error!(rule = %id, error = %err, "failed to store rule collection");
            res.status(500).send(json!({"error": "Failed to save rule"}));
            return Ok(());
        }

        res.send(json!({"msg": "Rule added."}));
        Ok(())
    }
}

/// Remove one rule from the remote collection.
pub struct DeleteRule;

#[async_trait]
impl Handler for DeleteRule {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let Some(id) = rule_id(req) else {
            res.status(400).send(json!({"error": "Rule handler id is required"}));
            return Ok(());
        };

        let mut catalog = match load_catalog(utils).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "failed to read rule collection");
                res.status(500).send(json!({"error": "Failed to delete rule"}));
                return Ok(());
            }
        };
        catalog.remove(id);

        if let Err(err) = utils
            .store
            .put_doc("config", "rules", Value::Object(catalog))
            .await
        {
            tracing::error!(rule = %id, error = %err, "failed to store rule collection");
            res.status(500).send(json!({"error": "Failed to delete rule"}));
            return Ok(());
        }

        res.send(json!({"msg": "Rule deleted."}));
        Ok(())
    }
}

/// Return the whole rule collection, or one rule by handler id.
pub struct LoadRules;

#[async_trait]
impl Handler for LoadRules {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        let catalog = match load_catalog(utils).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "failed to read rule collection");
                res.status(500).send(json!({"error": "Failed to load rules"}));
                return Ok(());
            }
        };

        match rule_id(req) {
            None | Some("all") => res.send(json!({"rules": catalog})),
            Some(id) => match catalog.get(id) {
                Some(rule) => {
                    let mut single = Map::new();
                    single.insert(id.to_string(), rule.clone());
                    res.send(json!({"rules": single}));
                }
                None => {
                    res.status(400).send(json!({"error": "Rule not found."}));
                }
            },
        }
        Ok(())
    }
}

/// Return the starter rule document for the administrative editor.
pub struct RuleTemplate;

#[async_trait]
impl Handler for RuleTemplate {
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
            .and_then(|doc| doc.get("rule"))
            .and_then(Value::as_str)
            .and_then(|encoded| serde_json::from_str::<String>(encoded).ok())
            .unwrap_or_else(|| RULE_TEMPLATE.to_string());

        res.send(json!({"template": template}));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use crate::utils::{Mailer, Notifier};
    use std::sync::Arc;

    fn utils() -> (PlatformUtils, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            PlatformUtils {
                store: store.clone(),
                mailer: Arc::new(Mailer::new(Default::default())),
                notifier: Arc::new(Notifier::new(Default::default())),
            },
            store,
        )
    }

    fn post(body: Value) -> GatewayRequest {
        let mut req = GatewayRequest::new("POST", "/admin");
        req.body = body;
        req
    }

    #[tokio::test]
    async fn add_rule_round_trips_through_catalog() {
        let (utils, store) = utils();

        let mut res = ResponseWriter::new();
        AddRule
            .handle(
                &post(json!({"handler": "greet", "match": {"path": "greet"}})),
                &mut res,
                &utils,
                &Vars::new(),
            )
            .await
            .unwrap();

        let catalog = store.get_doc("config", "rules").await.unwrap().unwrap();
        assert_eq!(catalog["greet"]["match"]["path"], "greet");
    }

    #[tokio::test]
    async fn add_rule_rejects_documents_without_handler() {
        let (utils, store) = utils();

        let mut res = ResponseWriter::new();
        AddRule
            .handle(
                &post(json!({"match": {"path": "greet"}})),
                &mut res,
                &utils,
                &Vars::new(),
            )
            .await
            .unwrap();

        assert_eq!(res.into_response().status(), 400);
        assert!(store.get_doc("config", "rules").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_rule_removes_only_that_entry() {
        let (utils, store) = utils();
        store
            .put_doc(
                "config",
                "rules",
                json!({
                    "a": {"handler": "a", "match": {"path": "a"}},
                    "b": {"handler": "b", "match": {"path": "b"}}
                }),
            )
            .await
            .unwrap();

        let mut res = ResponseWriter::new();
        DeleteRule
            .handle(&post(json!({"handler": "a"})), &mut res, &utils, &Vars::new())
            .await
            .unwrap();

        let catalog = store.get_doc("config", "rules").await.unwrap().unwrap();
        assert!(catalog.get("a").is_none());
        assert!(catalog.get("b").is_some());
    }

    #[tokio::test]
    async fn load_rules_returns_single_or_all() {
        let (utils, store) = utils();
        store
            .put_doc(
                "config",
                "rules",
                json!({"a": {"handler": "a", "match": {"path": "a"}}}),
            )
            .await
            .unwrap();

        let mut res = ResponseWriter::new();
        LoadRules
            .handle(&post(json!({"handler": "all"})), &mut res, &utils, &Vars::new())
            .await
            .unwrap();
        assert!(res.is_written());

        let mut res = ResponseWriter::new();
        LoadRules
            .handle(&post(json!({"handler": "missing"})), &mut res, &utils, &Vars::new())
            .await
            .unwrap();
        assert_eq!(res.into_response().status(), 400);
    }

    #[tokio::test]
    async fn rule_template_prefers_stored_override() {
        let (utils, store) = utils();
        store
            .put_doc("config", "templates", json!({"rule": "\"{ \\\"handler\\\": \\\"x\\\" }\""}))
            .await
            .unwrap();

        let mut res = ResponseWriter::new();
        RuleTemplate
            .handle(&post(json!({})), &mut res, &utils, &Vars::new())
            .await
            .unwrap();

        assert!(res.is_written());
    }
}
