//! HTTP gateway
//!
//! Exposes the native `/generate` route and an OpenAI-compatible
//! `/v1/chat/completions` route in front of a single configured backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod translate;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use handlers::GatewayState;
pub use server::{build_router, start_server};
