//! Chat endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /api/chat - answer one chat turn.
///
/// Always 200: query failures come back as `Error: ...` in `reply`.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state
        .engine()
        .chat(&request.message, &request.history)
        .await;

    Json(ChatResponse { reply })
}
