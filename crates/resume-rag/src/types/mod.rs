//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkSource, Document, FileType, Page};
pub use query::{ChatRequest, HistoryTurn};
pub use response::{Answer, ChatResponse, RetrievedChunk};
