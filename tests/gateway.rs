//! Router-level tests for the gateway endpoints
#![cfg(feature = "gate")]

mod common;

use axum::http::StatusCode;
use common::{gateway, get_json, post_json, OllamaMockServer, OpenAIMockServer};
use llm_relay::{ChatDefaults, LlmConfig, ProviderConfig};
use serde_json::json;

#[tokio::test]
async fn healthz_reports_ok_with_fresh_timestamp() {
    let before = chrono::Utc::now() - chrono::TimeDelta::seconds(1);
    let app = gateway(ProviderConfig::ollama("http://127.0.0.1:1"), ChatDefaults::default());

    let (status, body) = get_json(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let ts = chrono::DateTime::parse_from_rfc3339(body["ts"].as_str().unwrap()).unwrap();
    assert!(ts.with_timezone(&chrono::Utc) >= before);
}

#[tokio::test]
async fn generate_round_trips_through_ollama() {
    let backend = OllamaMockServer::start().await;
    backend
        .mock_chat(json!({"model": "m", "message": {"role": "assistant", "content": "hi"}, "done_reason": "stop"}))
        .await;

    let app = gateway(ProviderConfig::ollama(backend.base_url()), ChatDefaults::default());
    let (status, body) = post_json(app, "/generate", r#"{"prompt": "hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "m");
    assert_eq!(body["content"], "hi");
    assert_eq!(body["finishReason"], "stop");
    assert_eq!(body["raw"]["message"]["content"], "hi");

    let sent = backend.received_bodies().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0]["messages"],
        json!([
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": "hello"}
        ])
    );
    assert_eq!(sent[0]["options"], json!({"temperature": 0.7, "num_predict": 512, "top_p": 1.0}));
    assert_eq!(sent[0]["stream"], false);
}

#[tokio::test]
async fn generate_tolerates_ollama_response_without_message() {
    let backend = OllamaMockServer::start().await;
    backend.mock_chat(json!({"model": "m", "done": true})).await;

    let app = gateway(ProviderConfig::ollama(backend.base_url()), ChatDefaults::default());
    let (status, body) = post_json(app, "/generate", r#"{"prompt": "hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], serde_json::Value::Null);
    assert_eq!(body["finishReason"], "stop");
}

#[tokio::test]
async fn precedence_is_the_same_for_both_routes() {
    let backend = OllamaMockServer::start().await;
    backend
        .mock_chat(json!({"model": "m", "message": {"content": "ok"}}))
        .await;

    let config = LlmConfig::from_toml_str(&format!(
        r#"
        provider = "ollama"
        model = "global-model"

        [defaults]
        max_tokens = 200
        temperature = 0.3

        [ollama]
        base_url = "{}"
        temperature = 0.4
        "#,
        backend.base_url()
    ))
    .unwrap();
    let defaults = config.chat_defaults().unwrap();

    let app = gateway(config.provider_config().unwrap(), defaults.clone());
    let (status, _) = post_json(app, "/generate", r#"{"prompt": "a", "topP": 0.5}"#).await;
    assert_eq!(status, StatusCode::OK);

    let app = gateway(config.provider_config().unwrap(), defaults);
    let (status, _) = post_json(
        app,
        "/v1/chat/completions",
        r#"{"messages": [{"role": "user", "content": "a"}], "topP": 0.5}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sent = backend.received_bodies().await;
    assert_eq!(sent.len(), 2);
    for body in &sent {
        assert_eq!(body["model"], "global-model");
        assert_eq!(body["options"], json!({"temperature": 0.4, "num_predict": 200, "top_p": 0.5}));
    }
}

#[tokio::test]
async fn chat_completions_wraps_openai_backend_result() {
    let backend = OpenAIMockServer::start().await;
    backend.mock_chat_completion("gpt-4o-mini", "Hello, world!").await;

    let app = gateway(
        ProviderConfig::openai_compatible(backend.base_url(), "sk-test"),
        ChatDefaults::default(),
    );
    let (status, body) = post_json(
        app,
        "/v1/chat/completions",
        r#"{"model": "gpt-4o-mini", "messages": [
            {"role": "system", "content": "s"},
            {"role": "user", "content": "say hello"}
        ], "maxTokens": 64}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl_"));
    assert_eq!(body["choices"].as_array().unwrap().len(), 1);
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["finishReason"], "stop");
    assert_eq!(
        body["choices"][0]["message"],
        json!({"role": "assistant", "content": "Hello, world!"})
    );

    let sent = backend.received_bodies().await;
    assert_eq!(
        sent[0],
        json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "max_tokens": 64,
            "top_p": 1.0,
            "messages": [
                {"role": "system", "content": "s"},
                {"role": "user", "content": "say hello"}
            ],
            "stream": false
        })
    );
}

#[tokio::test]
async fn chat_completions_ids_are_unique_per_call() {
    let backend = OpenAIMockServer::start().await;
    backend.mock_chat_completion("gpt-4o-mini", "hi").await;

    let config = ProviderConfig::openai_compatible(backend.base_url(), "sk-test");
    let request = r#"{"messages": [{"role": "user", "content": "hi"}]}"#;

    let (_, first) = post_json(gateway(config.clone(), ChatDefaults::default()), "/v1/chat/completions", request).await;
    let (_, second) = post_json(gateway(config, ChatDefaults::default()), "/v1/chat/completions", request).await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn empty_choices_from_openai_backend_is_bad_gateway() {
    let backend = OpenAIMockServer::start().await;
    backend.mock_chat(json!({"model": "m", "choices": []})).await;

    let app = gateway(
        ProviderConfig::openai_compatible(backend.base_url(), "sk-test"),
        ChatDefaults::default(),
    );
    let (status, body) = post_json(app, "/generate", r#"{"prompt": "hello"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);
    assert!(body["error"].as_str().unwrap().contains("choices"));
}

#[tokio::test]
async fn backend_error_status_is_surfaced() {
    let backend = OllamaMockServer::start().await;
    backend.mock_error(404, r#"{"error":"model 'nope' not found"}"#).await;

    let app = gateway(ProviderConfig::ollama(backend.base_url()), ChatDefaults::default());
    let (status, body) = post_json(app, "/generate", r#"{"prompt": "hello", "model": "nope"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn invalid_payloads_never_reach_the_backend() {
    let backend = OpenAIMockServer::start().await;
    backend.mock_chat_completion("m", "unused").await;
    let config = ProviderConfig::openai_compatible(backend.base_url(), "sk-test");

    let cases = [
        ("/v1/chat/completions", r#"{"model": "m"}"#),
        ("/v1/chat/completions", r#"{"messages": []}"#),
        ("/generate", r#"{"systemPrompt": "no prompt"}"#),
        ("/generate", "not json"),
    ];

    for (uri, body) in cases {
        let (status, response) = post_json(gateway(config.clone(), ChatDefaults::default()), uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(response["status"], 400);
    }

    assert!(backend.received_bodies().await.is_empty());
}
