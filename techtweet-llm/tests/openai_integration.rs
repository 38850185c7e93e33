mod common;

use serde_json::json;
use techtweet_llm::openai::OpenAiCompatClient;
use techtweet_llm::traits::{collect_text, CompletionRequest, LlmClient, LlmError};
use techtweet_llm::Provider;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "llama-3.3-70b-versatile";

fn sse(fragments: &[&str], done: bool) -> String {
    let mut body = String::new();
    for f in fragments {
        let chunk = json!({"choices": [{"index": 0, "delta": {"content": f}}]});
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    if done {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

fn client(server: &MockServer, key: &str) -> OpenAiCompatClient {
    OpenAiCompatClient::new(
        Provider::Groq,
        key.to_string(),
        MODEL.to_string(),
        Some(&server.uri()),
    )
    .unwrap()
}

fn request() -> CompletionRequest {
    CompletionRequest::single_user("Day 3 of 100: write a tweet", 0.7, 400)
}

#[tokio::test]
async fn streams_and_folds_completion() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_test"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "stream": true,
            "max_tokens": 400,
            "messages": [{"role": "user", "content": "Day 3 of 100: write a tweet"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse(&["Rust ", "1.80 ", "is out! ", "#rustlang"], true), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server, "gsk_test").complete(&request()).await.unwrap();
    assert_eq!(text, "Rust 1.80 is out! #rustlang");
}

#[tokio::test]
async fn fragments_arrive_in_order_as_a_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse(&["a", "b", "c"], true), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let stream = client(&server, "k").stream_chat(&request()).await.unwrap();
    assert_eq!(collect_text(stream).await.unwrap(), "abc");
}

#[tokio::test]
async fn truncated_stream_fails_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse(&["half a tw"], false), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let err = client(&server, "k").complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Stream(_)), "got {err:?}");
}

#[tokio::test]
async fn rejected_key_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let err = client(&server, "bad").complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Unauthorized(_)), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, "k").complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn blank_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, "  ").complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Unauthorized(_)));
}

#[tokio::test]
#[ignore]
#[cfg(feature = "e2e")]
async fn groq_live_smoketest() {
    common::init_test_tracing();
    let key = std::env::var("GROQ_API_KEY").unwrap_or_default();
    let client = OpenAiCompatClient::groq(key).unwrap();
    let text = client
        .complete(&CompletionRequest::single_user("Say OK", 0.2, 8))
        .await
        .unwrap();
    assert!(!text.trim().is_empty());
}
