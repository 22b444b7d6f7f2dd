//! HTTP-level tests for the OpenAI adapter against a real (mocked) server,
//! since `transform.rs`'s unit tests only cover the pure parsing functions
//! and never exercise request construction, auth headers or HTTP error
//! mapping.

use reasoning_gateway::core::providers::openai::{OpenAiConfig, OpenAiProvider};
use reasoning_gateway::core::providers::{ChatParams, Provider};
use reasoning_gateway::core::types::Message;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new(OpenAiConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn chat_sends_bearer_auth_and_parses_the_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(serde_json::json!({
            "model": "gpt-5",
            "messages": [{"role": "user", "content": "2+2?"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-abc",
            "choices": [{"message": {"content": "4"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 8, "completion_tokens": 1},
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .chat("gpt-5", &[Message::user("2+2?")], ChatParams::default())
        .await
        .unwrap();

    assert_eq!(result.content, "4");
    assert_eq!(result.response_id.as_deref(), Some("chatcmpl-abc"));
    assert_eq!(result.usage.input_tokens, 8);
    assert_eq!(result.usage.output_tokens, 1);
}

#[tokio::test]
async fn chat_maps_a_401_body_to_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat("gpt-5", &[Message::user("hi")], ChatParams::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 401);
}

#[tokio::test]
async fn chat_maps_a_429_body_to_a_rate_limit_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat("gpt-5", &[Message::user("hi")], ChatParams::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 429);
}

#[tokio::test]
async fn response_entry_point_forwards_previous_response_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_json(serde_json::json!({
            "model": "gpt-5",
            "input": [{"role": "user", "content": "continue"}],
            "previous_response_id": "resp_prior",
            "store": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "resp_new",
            "status": "completed",
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "ok"}]}],
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .response(
            "gpt-5",
            &[Message::user("continue")],
            reasoning_gateway::core::providers::ResponseParams {
                previous_response_id: Some("resp_prior".to_string()),
                store: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(result.content, "ok");
    assert_eq!(result.response_id.as_deref(), Some("resp_new"));
}
