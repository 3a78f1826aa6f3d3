//! Builds the vector index from loaded documents

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::TextChunker;
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, Document};

use super::index::VectorIndex;

const DEFAULT_BATCH_SIZE: usize = 32;

/// Chunks documents, embeds every chunk and assembles a [`VectorIndex`]
pub struct IndexBuilder {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    source_dir: PathBuf,
}

impl IndexBuilder {
    /// Create a builder using `embedder` for every chunk
    pub fn new(chunker: TextChunker, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            chunker,
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
            source_dir: PathBuf::from("."),
        }
    }

    /// Number of chunks sent per `embed_batch` call
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Directory the documents came from, reported when there is nothing to index
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Build the index. Any embedding failure aborts the whole build.
    pub async fn build(&self, documents: &[Document]) -> Result<VectorIndex> {
        if documents.is_empty() {
            return Err(Error::EmptyCorpus(self.source_dir.clone()));
        }

        let start = Instant::now();
        let mut chunks: Vec<Chunk> = Vec::new();
        for doc in documents {
            let doc_chunks = self.chunker.chunk_document(doc);
            if doc_chunks.is_empty() {
                tracing::warn!("{} produced no chunks", doc.filename);
            }
            tracing::debug!("{}: {} chunk(s)", doc.filename, doc_chunks.len());
            chunks.extend(doc_chunks);
        }

        if chunks.is_empty() {
            return Err(Error::EmptyCorpus(self.source_dir.clone()));
        }

        tracing::info!(
            "Embedding {} chunks from {} document(s) with {} ({})",
            chunks.len(),
            documents.len(),
            self.embedder.name(),
            self.embedder.model()
        );

        let dimensions = self.embedder.dimensions();
        let mut items = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Provider returned {} embeddings for {} chunks",
                    embeddings.len(),
                    batch.len()
                )));
            }
            items.extend(batch.iter().cloned().zip(embeddings));
        }

        let index = VectorIndex::new(dimensions, items)?;

        tracing::info!(
            "Index built: {} chunks, {} documents in {}ms",
            index.len(),
            index.document_count(),
            start.elapsed().as_millis()
        );

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ParsedDocument;
    use crate::types::FileType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and returns a fixed-size vector derived from text length
    struct CountingEmbedder {
        dims: usize,
        output_dims: usize,
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new(dims: usize, output_dims: usize) -> Self {
            Self {
                dims,
                output_dims,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32; self.output_dims])
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn text_doc(name: &str, text: &str) -> Document {
        ParsedDocument::from_pages(FileType::Txt, vec![(1, text.to_string())], None)
            .into_document(PathBuf::from(format!("/data/{}", name)), text.len() as u64)
    }

    #[tokio::test]
    async fn test_empty_input_is_empty_corpus() {
        let embedder = Arc::new(CountingEmbedder::new(4, 4));
        let builder = IndexBuilder::new(TextChunker::default(), embedder.clone()).with_source_dir("data");

        let err = builder.build(&[]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus(ref p) if p == &PathBuf::from("data")));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_document_is_indexed() {
        let docs = vec![
            text_doc("a.txt", "Jane Doe is a Rust engineer."),
            text_doc("b.txt", "John Roe writes Go services."),
        ];
        let embedder = Arc::new(CountingEmbedder::new(4, 4));
        let index = IndexBuilder::new(TextChunker::default(), embedder.clone())
            .with_batch_size(1)
            .build(&docs)
            .await
            .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.document_count(), 2);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_build() {
        let docs = vec![text_doc("a.txt", "Jane Doe is a Rust engineer.")];
        let embedder = Arc::new(CountingEmbedder::new(4, 3));
        let err = IndexBuilder::new(TextChunker::default(), embedder)
            .build(&docs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
