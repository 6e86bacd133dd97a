//! LLM backend client implementations

use super::{
    config::{ProviderConfig, ProviderType},
    message::{ChatInput, ChatResult, Message, DEFAULT_FINISH_REASON},
    Error, Result,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Upper bound for a single backend call
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(90);

const OLLAMA_CHAT_PATH: &str = "/api/chat";
const OPENAI_CHAT_PATH: &str = "/v1/chat/completions";

/// Build an HTTP client with specified timeout
fn build_http_client(timeout: Duration) -> std::result::Result<HttpClient, reqwest::Error> {
    HttpClient::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Send a prepared request and return the parsed JSON body.
///
/// Non-success statuses become [`Error::Backend`]; a 2xx body that is not
/// JSON becomes [`Error::MalformedResponse`].
async fn send_json(request: reqwest::RequestBuilder, backend: &str) -> Result<Value> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::Backend {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::MalformedResponse(format!("Failed to parse {} response: {}. Body: {}", backend, e, body))
    })
}

/// Trait for LLM backend clients
///
/// One call issues exactly one HTTP request. Dropping the returned future
/// aborts the request in flight.
#[async_trait::async_trait]
pub trait Client: Send + Sync {
    /// Send a chat completion request (non-streaming)
    async fn chat(&self, input: &ChatInput) -> Result<ChatResult>;

    /// Which backend family this client talks to
    fn provider_type(&self) -> ProviderType;

    /// Get the backend base URL
    fn base_url(&self) -> &str;
}

/// Ollama client implementation
pub struct OllamaClient {
    config: ProviderConfig,
    http_client: HttpClient,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(OllamaClient {
            http_client: build_http_client(BACKEND_TIMEOUT)?,
            config,
        })
    }
}

#[async_trait::async_trait]
impl Client for OllamaClient {
    async fn chat(&self, input: &ChatInput) -> Result<ChatResult> {
        let url = endpoint(&self.config.base_url, OLLAMA_CHAT_PATH);
        let request = OllamaChatRequest::from_input(input);

        tracing::debug!("POST {} (model: {:?})", url, input.model);

        let raw = send_json(self.http_client.post(&url).json(&request), "Ollama").await?;
        ollama_result(raw)
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Ollama
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Translate an Ollama `/api/chat` body. Missing fields are tolerated.
fn ollama_result(raw: Value) -> Result<ChatResult> {
    let response: OllamaChatResponse = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedResponse(format!("Unexpected Ollama response shape: {}", e)))?;

    Ok(ChatResult {
        model: response.model,
        content: response.message.and_then(|m| m.content),
        finish_reason: response
            .done_reason
            .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        raw,
    })
}

/// OpenAI-compatible client implementation
pub struct OpenAICompatibleClient {
    config: ProviderConfig,
    http_client: HttpClient,
}

impl OpenAICompatibleClient {
    /// Create a new OpenAI-compatible client
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(OpenAICompatibleClient {
            http_client: build_http_client(BACKEND_TIMEOUT)?,
            config,
        })
    }
}

#[async_trait::async_trait]
impl Client for OpenAICompatibleClient {
    async fn chat(&self, input: &ChatInput) -> Result<ChatResult> {
        let url = endpoint(&self.config.base_url, OPENAI_CHAT_PATH);
        let request = ChatRequest::from_input(input);

        tracing::debug!("POST {} (model: {:?})", url, input.model);

        let mut builder = self.http_client.post(&url).json(&request);
        if let Some(api_key) = self.config.api_key() {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let raw = send_json(builder, "OpenAI-compatible").await?;
        openai_result(raw)
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAICompatible
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Translate an OpenAI chat completion body.
///
/// `choices[0].message.content` is required; a response without it is an
/// error rather than an empty result.
fn openai_result(raw: Value) -> Result<ChatResult> {
    let response: ChatResponse = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedResponse(format!("Failed to parse OpenAI-compatible response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("No choices in OpenAI-compatible response".to_string()))?;

    Ok(ChatResult {
        model: response.model,
        content: Some(choice.message.content),
        finish_reason: choice
            .finish_reason
            .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        raw,
    })
}

// Ollama types

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [Message],
    options: OllamaOptions,
    stream: bool,
}

impl<'a> OllamaChatRequest<'a> {
    fn from_input(input: &'a ChatInput) -> Self {
        OllamaChatRequest {
            model: input.model.as_deref(),
            messages: &input.messages,
            options: OllamaOptions {
                temperature: input.temperature,
                num_predict: input.max_tokens,
                top_p: input.top_p,
            },
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: Option<OllamaMessage>,
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

// OpenAI types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    messages: &'a [Message],
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn from_input(input: &'a ChatInput) -> Self {
        ChatRequest {
            model: input.model.as_deref(),
            temperature: input.temperature,
            max_tokens: input.max_tokens,
            top_p: input.top_p,
            messages: &input.messages,
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
