//! Backend-neutral chat types
//!
//! Every request handled by the gateway passes through these types: inbound
//! payloads are translated into a [`ChatInput`], a backend client turns it
//! into a [`ChatResult`], and the result is translated back out.

use serde::{Deserialize, Serialize};

/// Finish reason reported when a backend does not supply one
pub const DEFAULT_FINISH_REASON: &str = "stop";

/// A chat message
///
/// The role is carried as a plain string. `system`, `user` and `assistant`
/// are the usual values, but any role is forwarded to the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new message
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Message::new("system", content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Message::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::new("assistant", content)
    }
}

/// Per-request overrides supplied by a gateway caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatParams {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// A fully resolved request, ready to be sent to a backend
///
/// Built by [`crate::ChatDefaults::resolve`]; sampling parameters are always
/// populated. `model` may stay `None`, in which case the backend picks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatInput {
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

/// Normalized backend response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    /// Model the backend reports having used
    pub model: Option<String>,

    /// Assistant reply text
    pub content: Option<String>,

    /// Why generation stopped (`"stop"` when the backend omits it)
    pub finish_reason: String,

    /// Untouched backend response body
    pub raw: serde_json::Value,
}
