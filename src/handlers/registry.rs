//! Trusted local handler registry.
//!
//! The Rust analog of handler modules shipped with the deployment: handlers
//! compiled into the binary, keyed by id. The resolver consults this before
//! any other source, so a registered id always shadows remote code with the
//! same name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handlers::builtin;
use crate::handlers::script::ScriptEngine;
use crate::handlers::Handler;

/// Compiled-in handlers keyed by handler id.
#[derive(Default)]
pub struct LocalRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl LocalRegistry {
    /// An empty registry (tests and embedders that bring their own set).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard registry: liveness, status, and the admin CRUD surface.
    pub fn builtin(engine: &ScriptEngine) -> Self {
        let mut registry = Self::empty();

        registry.register("helloWorld", Arc::new(builtin::HelloWorld));
        registry.register("status", Arc::new(builtin::Status));

        registry.register("addHandler", Arc::new(builtin::AddHandler::new(engine.clone())));
        registry.register("deleteHandler", Arc::new(builtin::DeleteHandler));
        registry.register("listHandlers", Arc::new(builtin::ListHandlers));
        registry.register("loadHandler", Arc::new(builtin::LoadHandler));
        registry.register("handlerTemplate", Arc::new(builtin::HandlerTemplate));

        registry.register("addRule", Arc::new(builtin::AddRule));
        registry.register("deleteRule", Arc::new(builtin::DeleteRule));
        registry.register("loadRules", Arc::new(builtin::LoadRules));
        registry.register("ruleTemplate", Arc::new(builtin::RuleTemplate));

        registry
    }

    pub fn register(&mut self, id: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(id.into(), handler);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn builtin_registry_contains_admin_surface() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let registry = LocalRegistry::builtin(&ScriptEngine::new(tx));

        for id in [
            "helloWorld",
            "status",
            "addHandler",
            "deleteHandler",
            "listHandlers",
            "loadHandler",
            "handlerTemplate",
            "addRule",
            "deleteRule",
            "loadRules",
            "ruleTemplate",
        ] {
            assert!(registry.contains(id), "missing builtin {id}");
        }

        assert!(!registry.contains("ghost"));
    }
}
