//! Application state for the chat server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::QueryEngine;
use crate::ingestion::loader::display_dir;
use crate::ingestion::{DirectoryLoader, DocumentLoader, TextChunker};
use crate::providers::{self, EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexBuilder, VectorIndex};

/// Shared application state, built once before the server starts
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    engine: QueryEngine,
    embedder_name: String,
    embedder_model: String,
    llm_name: String,
    llm_model: String,
}

impl AppState {
    /// Load the corpus, build the index and connect the providers.
    ///
    /// Fails when the data directory is missing or empty, when embedding the
    /// corpus fails, or when a provider cannot be constructed.
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let data_dir = config.data.dir.clone();
        tracing::info!("Loading documents from {}", display_dir(&data_dir).display());

        let loader = DirectoryLoader::from_config(&config.data);
        let dir = data_dir.clone();
        let documents = tokio::task::spawn_blocking(move || loader.load(&dir))
            .await
            .map_err(|e| Error::internal(format!("Document loading task failed: {}", e)))??;
        tracing::info!("Loaded {} document(s)", documents.len());

        let embedder = providers::create_embedder(&config.embeddings).await?;
        let index = IndexBuilder::new(TextChunker::from_config(&config.chunking), Arc::clone(&embedder))
            .with_batch_size(config.embeddings.batch_size)
            .with_source_dir(data_dir)
            .build(&documents)
            .await?;

        let llm = providers::create_llm(&config.llm)?;

        Ok(Self::from_parts(config, Arc::new(index), embedder, llm))
    }

    /// Assemble state from an already built index and providers
    pub fn from_parts(
        config: RagConfig,
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let embedder_name = embedder.name().to_string();
        let embedder_model = embedder.model().to_string();
        let llm_name = llm.name().to_string();
        let llm_model = llm.model().to_string();
        let engine = QueryEngine::new(index, embedder, llm, config.retrieval.top_k);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                embedder_name,
                embedder_model,
                llm_name,
                llm_model,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the query engine
    pub fn engine(&self) -> &QueryEngine {
        &self.inner.engine
    }

    /// Embedding provider name and model
    pub fn embedder_info(&self) -> (&str, &str) {
        (&self.inner.embedder_name, &self.inner.embedder_model)
    }

    /// LLM provider name and model
    pub fn llm_info(&self) -> (&str, &str) {
        (&self.inner.llm_name, &self.inner.llm_model)
    }
}
