//! Query and chat response types

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// A chunk returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

/// Result of one question put to the query engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The LLM completion, verbatim
    pub text: String,
    /// Chunks that were placed in the prompt, best first
    pub contexts: Vec<RetrievedChunk>,
    /// Wall-clock time for embed + search + completion
    pub processing_time_ms: u64,
}

/// Body returned by `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Answer text, or `Error: <message>` when the query failed
    pub reply: String,
}
