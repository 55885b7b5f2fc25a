//! HTTP ingress subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware, catch-all route)
//!     → request.rs (decode into GatewayRequest)
//!     → dispatch (rule match, handler invocation)
//!     → response.rs (handler-driven ResponseWriter → transport response)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{GatewayRequest, UuidRequestId, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::GatewayServer;
