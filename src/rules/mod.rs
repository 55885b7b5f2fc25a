//! Routing rules subsystem.
//!
//! # Data Flow
//! ```text
//! Per request:
//!     store.rs builds the rule set
//!         admin rules (bootstrap config, secret injected)
//!         + remote rules (config/rules document, admin ids filtered out)
//!     → matcher.rs scans in order, first full match wins
//!     → matched Rule (handler id + vars) or no route
//! ```
//!
//! # Design Decisions
//! - The rule set is rebuilt for every request; remote edits are visible on
//!   the next request without a process restart
//! - First match wins; admin rules always precede remote rules
//! - No regex in the hot path; the wildcard grammar is four fixed shapes
//! - Malformed remote rules never match instead of failing the request

pub mod matcher;
pub mod rule;
pub mod store;

pub use rule::Rule;
pub use store::RuleStore;
