//! Re-exports from all modules
mod client;
mod config;
mod message;
mod provider;

#[cfg(feature = "gate")]
pub mod gate;

use thiserror::Error;

/// Result type for llm-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for llm-relay operations
#[derive(Debug, Error)]
pub enum Error {
    /// Backend answered with a non-success HTTP status
    #[error("Backend error ({status}): {body}")]
    Backend { status: u16, body: String },

    /// Backend answered 2xx but the body could not be translated
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// HTTP client error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound payload rejected before reaching a backend
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub use client::{Client, OllamaClient, OpenAICompatibleClient, BACKEND_TIMEOUT};
pub use config::{
    ChatDefaults, GenerationDefaults, LlmConfig, ProviderConfig, ProviderSection, ProviderType,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
pub use message::{ChatInput, ChatParams, ChatResult, Message, DEFAULT_FINISH_REASON};
pub use provider::create_client;
