use jarvis::clients::{ProviderClient, ProviderError};
use jarvis::config::ProviderConfig;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_config(base_url: String) -> ProviderConfig {
    ProviderConfig {
        base_url,
        api_key: "test-key".to_string(),
        ..ProviderConfig::default()
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn test_completion_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "max_tokens": 512,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    let reply = client.complete("gpt-4o-mini", "hi").await.unwrap();

    assert_eq!(reply, "Hello there");
}

#[tokio::test]
async fn test_reasoning_models_send_max_completion_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "o3-mini",
            "max_completion_tokens": 512,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    client.complete("o3-mini", "hi").await.unwrap();
}

#[tokio::test]
async fn test_retries_once_when_token_param_rejected() {
    let server = MockServer::start().await;

    // First attempt guesses max_tokens for a legacy-looking name and gets
    // told to use the other parameter.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "max_tokens": 512 })))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "Unsupported parameter: 'max_tokens' is not supported with this model. \
             Use 'max_completion_tokens' instead.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(
            serde_json::json!({ "max_completion_tokens": 512 }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    let reply = client.complete("gpt-4o-mini", "hi").await.unwrap();

    assert_eq!(reply, "Recovered");
}

#[tokio::test]
async fn test_generic_rejection_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid request: bad messages"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    let err = client.complete("gpt-4o-mini", "hi").await.unwrap_err();

    match err {
        ProviderError::Api { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid request"));
        }
        other => panic!("Expected Api error, got: {other}"),
    }
}

#[tokio::test]
async fn test_server_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    let err = client.complete("gpt-4o-mini", "hi").await.unwrap_err();

    match err {
        ProviderError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("Expected Api error, got: {other}"),
    }
}

#[tokio::test]
async fn test_configured_token_param_overrides_heuristic() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(
            serde_json::json!({ "max_completion_tokens": 512 }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = provider_config(server.uri());
    config.token_param = Some("max_completion_tokens".to_string());

    let client = ProviderClient::new(config).unwrap();
    // A legacy-looking model name would normally guess max_tokens.
    client.complete("gpt-4o-mini", "hi").await.unwrap();
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "chatcmpl-test", "choices": [] })),
        )
        .mount(&server)
        .await;

    let client = ProviderClient::new(provider_config(server.uri())).unwrap();
    let err = client.complete("gpt-4o-mini", "hi").await.unwrap_err();

    assert!(matches!(err, ProviderError::EmptyCompletion));
}
