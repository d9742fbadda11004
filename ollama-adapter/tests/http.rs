//! HTTP behaviour of the Ollama client against a mock daemon.

use ollama_adapter::{ChatMessage, OllamaClient, OllamaConfig, OllamaError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, model: &str) -> OllamaConfig {
    OllamaConfig {
        host: server.uri(),
        model: model.to_string(),
        temperature: 0.5,
        max_tokens: 128,
        ..OllamaConfig::default()
    }
}

#[tokio::test]
async fn chat_sends_options_and_images() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llava:7b",
            "message": {"role": "assistant", "content": "```xml\n<plan/>\n```"},
            "done": true,
            "eval_count": 12,
            "total_duration": 1000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(config_for(&server, "llava:7b")).expect("client");
    let messages = vec![
        ChatMessage::system("primer"),
        ChatMessage::user("layout").with_image("aW1n".to_string()),
        ChatMessage::user("plan it"),
    ];
    let reply = client.chat(&messages).await.expect("chat");
    assert_eq!(reply, "```xml\n<plan/>\n```");

    let requests = server.received_requests().await.expect("recorded");
    let body: serde_json::Value = requests[0].body_json().expect("json body");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["temperature"], 0.5);
    assert_eq!(body["options"]["num_predict"], 128);
    assert_eq!(body["messages"][1]["images"][0], "aW1n");
    assert!(body["messages"][2].get("images").is_none());
}

#[tokio::test]
async fn server_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(config_for(&server, "llama3.2:3b")).expect("client");
    let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(matches!(err, OllamaError::Api { status: 500, .. }));
}

#[tokio::test]
async fn health_check_accepts_implicit_latest_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "mistral:latest"}, {"name": "llava:7b"}]
        })))
        .mount(&server)
        .await;

    let plain = OllamaClient::new(config_for(&server, "mistral")).expect("client");
    plain.check_health().await.expect("mistral present");

    let tagged = OllamaClient::new(config_for(&server, "llava:7b")).expect("client");
    tagged.check_health().await.expect("llava present");

    let missing = OllamaClient::new(config_for(&server, "qwen2.5-coder:7b")).expect("client");
    let err = missing.check_health().await.unwrap_err();
    assert!(matches!(err, OllamaError::ModelNotFound { .. }));
}

#[tokio::test]
async fn unload_sets_zero_keep_alive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(config_for(&server, "llava:7b")).expect("client");
    client.unload().await.expect("unload");

    let requests = server.received_requests().await.expect("recorded");
    let body: serde_json::Value = requests[0].body_json().expect("json body");
    assert_eq!(body["keep_alive"], 0);
    assert_eq!(body["model"], "llava:7b");
}
