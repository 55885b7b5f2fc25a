//! Switchyard: a dynamic HTTP handler dispatch gateway.
//!
//! One ingress, no static route table: every request is matched against a
//! declarative rule set (bootstrap config merged with a remote collection)
//! and dispatched to a handler code unit resolved from the trusted registry
//! or the remote code store.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rules;
pub mod store;
pub mod utils;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
