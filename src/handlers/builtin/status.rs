//! Gateway status handler.

use async_trait::async_trait;
use serde_json::json;

use crate::handlers::{Handler, HandlerError, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::utils::PlatformUtils;

/// Reports the running version; wired as an admin rule.
pub struct Status;

#[async_trait]
impl Handler for Status {
    async fn handle(
        &self,
        _req: &GatewayRequest,
        res: &mut ResponseWriter,
        _utils: &PlatformUtils,
        _vars: &Vars,
    ) -> Result<(), HandlerError> {
        res.send(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "status": "operational",
        }));
        Ok(())
    }
}
