//! Mock backends for gateway tests
//!
//! wiremock-based stand-ins for Ollama and OpenAI-compatible servers so the
//! gateway can be exercised without a real model server.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use llm_relay::gate::{build_router, GatewayState};
use llm_relay::{create_client, ChatDefaults, ProviderConfig};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Ollama mock server
pub struct OllamaMockServer {
    pub server: MockServer,
}

impl OllamaMockServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Respond to `/api/chat` with an arbitrary body
    pub async fn mock_chat(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `/api/chat` with an error status
    pub async fn mock_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Bodies of all requests the backend received
    pub async fn received_bodies(&self) -> Vec<Value> {
        received_bodies(&self.server).await
    }
}

/// OpenAI-compatible mock server
pub struct OpenAIMockServer {
    pub server: MockServer,
}

impl OpenAIMockServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Standard single-choice completion
    pub async fn mock_chat_completion(&self, model: &str, content: &str) {
        self.mock_chat(serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1234567890,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        }))
        .await;
    }

    /// Respond to `/v1/chat/completions` with an arbitrary body
    pub async fn mock_chat(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn received_bodies(&self) -> Vec<Value> {
        received_bodies(&self.server).await
    }
}

async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| serde_json::from_slice(&req.body).expect("backend request body is JSON"))
        .collect()
}

/// Gateway router wired to the given backend
pub fn gateway(config: ProviderConfig, defaults: ChatDefaults) -> axum::Router {
    let client = create_client(config).expect("client");
    build_router(GatewayState::new(Arc::from(client), defaults))
}

/// POST a raw JSON body and return status plus parsed response body
pub async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// GET a path and return status plus parsed response body
pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
