//! Inbound/outbound payload translation
//!
//! Two request shapes map onto one [`ChatInput`]:
//! - native `POST /generate`: a single prompt plus optional system prompt
//! - OpenAI-compatible `POST /v1/chat/completions`: a full message list
//!
//! Results go back out either as the bare [`ChatResult`] or wrapped in a
//! [`ChatCompletionResponse`] envelope.

use crate::gate::error::GatewayError;
use crate::{ChatDefaults, ChatInput, ChatParams, ChatResult, Error, Message, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// System prompt used when a native request does not supply one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Prefix of generated completion ids
pub const COMPLETION_ID_PREFIX: &str = "chatcmpl_";

/// Decode a JSON request body, reporting failures as 400
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> std::result::Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Native `/generate` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl GenerateRequest {
    /// Always yields `[system, user]`, in that order
    pub fn into_chat_input(self, defaults: &ChatDefaults) -> Result<ChatInput> {
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let messages = vec![Message::system(system_prompt), Message::user(self.prompt)];
        let params = ChatParams {
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        };

        defaults.resolve(params, messages)
    }
}

/// OpenAI-compatible `/v1/chat/completions` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(alias = "max_tokens")]
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    #[serde(alias = "top_p")]
    pub top_p: Option<f32>,
}

impl ChatCompletionRequest {
    /// Messages are forwarded verbatim and in order
    pub fn into_chat_input(self, defaults: &ChatDefaults) -> Result<ChatInput> {
        if let Some(index) = self.messages.iter().position(|m| m.role.trim().is_empty()) {
            return Err(Error::InvalidRequest(format!("messages[{}].role must not be empty", index)));
        }

        let params = ChatParams {
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature.map(f64::from),
            top_p: self.top_p.map(f64::from),
        };

        defaults.resolve(params, self.messages)
    }
}

/// OpenAI-style completion envelope
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
}

/// Single entry of [`ChatCompletionResponse::choices`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionChoice {
    pub index: u32,
    pub finish_reason: String,
    pub message: Message,
}

impl ChatCompletionResponse {
    /// Wrap a backend result; `default_model` fills in when the backend names none
    pub fn from_result(result: ChatResult, default_model: Option<&str>) -> Self {
        let model = result
            .model
            .or_else(|| default_model.map(str::to_string))
            .unwrap_or_default();

        ChatCompletionResponse {
            id: format!("{}{}", COMPLETION_ID_PREFIX, uuid::Uuid::new_v4().simple()),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model,
            choices: vec![ChatCompletionChoice {
                index: 0,
                finish_reason: result.finish_reason,
                message: Message::assistant(result.content.unwrap_or_default()),
            }],
        }
    }
}
