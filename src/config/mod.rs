//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared with the server at startup
//! ```
//!
//! # Design Decisions
//! - The bootstrap config is the trusted rule source; if it fails to load
//!   the process refuses to serve
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DispatchConfig, GatewayConfig, ListenerConfig, MailConfig, ObservabilityConfig, PushConfig,
    RuleSource, SecurityConfig, StoreConfig, TimeoutConfig,
};
