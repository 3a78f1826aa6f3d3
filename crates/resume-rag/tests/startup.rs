//! Full startup against mocked Ollama and Groq endpoints

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{corpus, resumes};
use resume_rag::server::{state::AppState, RagServer};
use resume_rag::{ChatResponse, Error, RagConfig};

async fn mock_ollama_embeddings(expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5, 0.5, 0.0]})))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn config(data_dir: &std::path::Path, ollama: &MockServer, groq: &MockServer, key_env: &str) -> RagConfig {
    let mut config = RagConfig::default();
    config.data.dir = data_dir.to_path_buf();
    config.embeddings.base_url = ollama.uri();
    config.embeddings.dimensions = 3;
    config.llm.base_url = format!("{}/openai/v1", groq.uri());
    config.llm.api_key_env = key_env.to_string();
    config
}

async fn ask(state: AppState, message: &str) -> String {
    let request = Request::post("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"message": message}).to_string()))
        .unwrap();
    let response = RagServer::new(state).router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice::<ChatResponse>(&bytes).unwrap().reply
}

#[tokio::test]
async fn test_startup_and_chat_through_groq() {
    // two short documents -> two chunks, plus one question
    let ollama = mock_ollama_embeddings(3).await;
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header_eq("authorization", "Bearer gsk_startup_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Jane Doe knows Rust."}}]
        })))
        .expect(1)
        .mount(&groq)
        .await;

    std::env::set_var("RESUME_RAG_TEST_GROQ_KEY", "gsk_startup_test");
    let dir = resumes();
    let state = AppState::new(config(dir.path(), &ollama, &groq, "RESUME_RAG_TEST_GROQ_KEY"))
        .await
        .unwrap();

    assert_eq!(state.engine().index().document_count(), 2);
    assert_eq!(ask(state, "Who knows Rust?").await, "Jane Doe knows Rust.");
}

#[tokio::test]
async fn test_missing_api_key_is_reported_per_question() {
    let ollama = mock_ollama_embeddings(3).await;
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&groq)
        .await;

    let dir = resumes();
    let state = AppState::new(config(dir.path(), &ollama, &groq, "RESUME_RAG_TEST_UNSET_KEY"))
        .await
        .unwrap();

    let reply = ask(state, "Who knows Rust?").await;
    assert!(reply.starts_with("Error: "));
    assert!(reply.contains("RESUME_RAG_TEST_UNSET_KEY"));
}

#[tokio::test]
async fn test_missing_directory_never_calls_providers() {
    let ollama = mock_ollama_embeddings(0).await;
    let groq = MockServer::start().await;

    let dir = corpus(&[]);
    let missing = dir.path().join("data");
    let err = AppState::new(config(&missing, &ollama, &groq, "UNUSED"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::DirectoryNotFound(_)));
}

#[tokio::test]
async fn test_embedding_outage_aborts_startup() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&ollama)
        .await;
    let groq = MockServer::start().await;

    let dir = resumes();
    let err = AppState::new(config(dir.path(), &ollama, &groq, "UNUSED"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::Embedding(_)));
}
