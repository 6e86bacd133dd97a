//! HTTP request handlers for the gateway

use crate::gate::error::GatewayError;
use crate::gate::translate::{parse_body, ChatCompletionRequest, ChatCompletionResponse, GenerateRequest};
use crate::{ChatDefaults, ChatInput, ChatResult, Client};
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<dyn Client>,
    pub defaults: Arc<ChatDefaults>,
}

impl GatewayState {
    pub fn new(client: Arc<dyn Client>, defaults: ChatDefaults) -> Self {
        Self {
            client,
            defaults: Arc::new(defaults),
        }
    }

    async fn dispatch(&self, route: &str, input: ChatInput) -> Result<ChatResult, GatewayError> {
        info!(
            "{} request for model: {} ({} messages)",
            route,
            input.model.as_deref().unwrap_or("<backend default>"),
            input.messages.len()
        );

        self.client.chat(&input).await.map_err(|e| {
            error!("{} backend call to {} failed: {}", route, self.client.base_url(), e);
            GatewayError::from(e)
        })
    }
}

/// Handle native `POST /generate`
pub async fn generate_handler(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ChatResult>, GatewayError> {
    let request: GenerateRequest = parse_body(&body)?;
    let input = request.into_chat_input(&state.defaults)?;

    let result = state.dispatch("generate", input).await?;
    Ok(Json(result))
}

/// Handle OpenAI-compatible `POST /v1/chat/completions`
pub async fn chat_completions_handler(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ChatCompletionResponse>, GatewayError> {
    let request: ChatCompletionRequest = parse_body(&body)?;
    let input = request.into_chat_input(&state.defaults)?;

    let result = state.dispatch("chat.completions", input).await?;
    Ok(Json(ChatCompletionResponse::from_result(
        result,
        state.defaults.model.as_deref(),
    )))
}

/// Health check handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "ok": true,
        "ts": chrono::Utc::now().to_rfc3339()
    }))
}
