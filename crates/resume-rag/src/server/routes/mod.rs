//! API routes for the chat server

pub mod chat;
pub mod page;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let index = state.engine().index();
    let (embedder, embedding_model) = state.embedder_info();
    let (llm, llm_model) = state.llm_info();
    let (embeddings_healthy, llm_healthy) = tokio::join!(
        embedder_healthy(state.engine().embedder()),
        llm_healthy(state.engine().llm())
    );

    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "title": config.ui.title,
        "description": config.ui.description,
        "documents": index.document_count(),
        "chunks": index.len(),
        "embeddings": {
            "provider": embedder,
            "model": embedding_model,
            "dimensions": index.dimensions(),
            "healthy": embeddings_healthy,
        },
        "llm": {
            "provider": llm,
            "model": llm_model,
            "healthy": llm_healthy,
        },
        "top_k": state.engine().top_k(),
        "endpoints": {
            "GET /": "Chat page",
            "POST /api/chat": "Answer a question: {message, history} -> {reply}",
            "GET /api/info": "This document",
            "GET /health": "Liveness check"
        }
    }))
}

async fn embedder_healthy(embedder: &dyn EmbeddingProvider) -> bool {
    embedder.health_check().await.unwrap_or_else(|e| {
        tracing::warn!("Embedding provider {} health check failed: {}", embedder.name(), e);
        false
    })
}

async fn llm_healthy(llm: &dyn LlmProvider) -> bool {
    llm.health_check().await.unwrap_or_else(|e| {
        tracing::warn!("LLM provider {} health check failed: {}", llm.name(), e);
        false
    })
}
