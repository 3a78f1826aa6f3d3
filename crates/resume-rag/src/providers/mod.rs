//! Provider abstractions for embeddings and LLM completion
//!
//! Trait objects let the index and query engine switch between Ollama,
//! in-process ONNX and Groq without knowing which one is behind them.

pub mod embedding;
pub mod groq;
pub mod llm;
pub mod ollama;
#[cfg(feature = "onnx")]
pub mod onnx;
mod retry;

use std::sync::Arc;

pub use embedding::EmbeddingProvider;
pub use groq::GroqClient;
pub use llm::{LlmProvider, Prompt};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;
pub use retry::retry_request;

use crate::config::{EmbeddingBackend, EmbeddingConfig, LlmBackend, LlmConfig};
use crate::error::Result;

/// Build the configured embedding provider
pub async fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        #[cfg(feature = "onnx")]
        EmbeddingBackend::Onnx => Arc::new(OnnxEmbedder::new(config).await?),
        #[cfg(not(feature = "onnx"))]
        EmbeddingBackend::Onnx => {
            return Err(crate::error::Error::config(
                "embeddings.provider = \"onnx\" requires building with --features onnx",
            ))
        }
    };

    tracing::info!(
        "Embedding provider: {} (model: {}, {} dims)",
        embedder.name(),
        embedder.model(),
        embedder.dimensions()
    );
    Ok(embedder)
}

/// Build the configured LLM provider
pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.provider {
        LlmBackend::Groq => Arc::new(GroqClient::new(config)?),
        LlmBackend::Ollama => Arc::new(OllamaLlm::new(config)?),
    };

    tracing::info!("LLM provider: {} (model: {})", llm.name(), llm.model());
    Ok(llm)
}
