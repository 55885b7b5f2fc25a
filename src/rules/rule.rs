//! Rule data model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declarative binding from request-matching conditions to a handler id.
///
/// Rules come from two sources with the same wire shape: the bootstrap
/// configuration file (trusted; may set `admin`) and the remote rule
/// collection. The `match` map may declare `path`, `body`, and `params`
/// conditions; anything else makes the rule unmatchable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    /// Identifier of the handler code unit to invoke.
    #[serde(alias = "function")]
    pub handler: String,

    /// Match conditions, evaluated as a conjunction.
    #[serde(rename = "match", default)]
    pub match_spec: Map<String, Value>,

    /// Opaque variables handed to the handler unchanged.
    #[serde(default)]
    pub vars: Map<String, Value>,

    /// Admin rules are trusted, always first, and secret-protected.
    #[serde(default)]
    pub admin: bool,
}

impl Rule {
    /// Parse a rule from a raw store document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
