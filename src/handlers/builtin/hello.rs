//! Liveness echo handler.

use async_trait::async_trait;
use serde_json::json;

use crate::handlers::{Handler, HandlerError, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::utils::PlatformUtils;

/// Confirms the dispatch pipeline works end to end; echoes the query
/// parameters and the rule's vars.
pub struct HelloWorld;

#[async_trait]
impl Handler for HelloWorld {
    async fn handle(
        &self,
        req: &GatewayRequest,
        res: &mut ResponseWriter,
        _utils: &PlatformUtils,
        vars: &Vars,
    ) -> Result<(), HandlerError> {
        res.send(json!({
            "message": "Hello world!",
            "data": req.params,
            "vars": vars,
        }));
        Ok(())
    }
}
