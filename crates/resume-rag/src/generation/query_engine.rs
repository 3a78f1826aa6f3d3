//! Question answering over the vector index

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::VectorIndex;
use crate::types::{Answer, HistoryTurn};

use super::prompt::PromptBuilder;

/// Embeds a question, retrieves the closest chunks and asks the LLM
pub struct QueryEngine {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl QueryEngine {
    /// `embedder` must be the provider the index was built with
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            top_k,
        }
    }

    /// The index being queried
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Provider used to embed questions
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Provider used to write answers
    pub fn llm(&self) -> &dyn LlmProvider {
        self.llm.as_ref()
    }

    /// Number of chunks placed in each prompt
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question` from the indexed documents
    pub async fn query(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidQuery("question is empty".to_string()));
        }

        let start = Instant::now();
        tracing::info!("Query received ({} chars)", question.chars().count());

        let query_embedding = self.embedder.embed(question).await?;
        let contexts = self.index.search(&query_embedding, self.top_k)?;

        if let Some(best) = contexts.first() {
            tracing::debug!(
                "Best match: {} (similarity {:.3})",
                best.chunk.source.filename,
                best.similarity
            );
        }

        let context = PromptBuilder::build_context(&contexts);
        let prompt = PromptBuilder::build_qa_prompt(question, &context);
        let text = self.llm.complete(&prompt).await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Answered with {} context chunk(s) in {}ms",
            contexts.len(),
            processing_time_ms
        );

        Ok(Answer {
            text,
            contexts,
            processing_time_ms,
        })
    }

    /// Chat entry point: the answer text, or `Error: <message>` on failure.
    ///
    /// `history` is accepted for the chat page's benefit and otherwise ignored;
    /// every question is answered on its own.
    pub async fn chat(&self, message: &str, history: &[HistoryTurn]) -> String {
        tracing::debug!("Chat turn with {} earlier exchange(s)", history.len());

        match self.query(message).await {
            Ok(answer) => answer.text,
            Err(e) => {
                tracing::warn!("Query failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}
