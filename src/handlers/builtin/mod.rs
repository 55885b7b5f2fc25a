//! Builtin handlers compiled into the trusted registry.
//!
//! These are the handlers the gateway ships with: a liveness echo, a status
//! report, and the CRUD surface the administrative editor drives. All of the
//! CRUD handlers are wired as admin rules in the bootstrap config, so every
//! call to them must carry the shared secret in its body to match at all.

mod hello;
mod handlers_crud;
mod rules_crud;
mod status;

pub use hello::HelloWorld;
pub use handlers_crud::{AddHandler, DeleteHandler, HandlerTemplate, ListHandlers, LoadHandler};
pub use rules_crud::{AddRule, DeleteRule, LoadRules, RuleTemplate};
pub use status::Status;

/// Starter source for a new scripted handler.
pub const HANDLER_TEMPLATE: &str = include_str!("handler_template.rhai");

/// Starter rule document for the administrative editor.
pub const RULE_TEMPLATE: &str = include_str!("rule_template.json");
