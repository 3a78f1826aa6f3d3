//! resume-rag: chat with a folder of resume PDFs
//!
//! Documents in a data directory are parsed, chunked and embedded into an
//! in-memory vector index at startup. Each chat question is embedded with the
//! same model, the closest chunks are retrieved and a hosted LLM (Groq by
//! default) answers from that context. An axum server exposes a small chat
//! page and JSON API.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::QueryEngine;
pub use retrieval::{IndexBuilder, VectorIndex};
pub use types::{Answer, ChatRequest, ChatResponse, Chunk, ChunkSource, Document, FileType};
