//! Prompt templates for question answering over retrieved chunks

use crate::providers::Prompt;
use crate::types::RetrievedChunk;

/// System message sent with every question
pub const QA_SYSTEM_PROMPT: &str = "You are an expert Q&A system that is trusted around the world.\n\
Always answer the query using the provided context information, and not prior knowledge.\n\
Some rules to follow:\n\
1. Never directly reference the given context in your answer.\n\
2. Avoid statements like 'Based on the context, ...' or 'The context information ...' or anything along those lines.";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render retrieved chunks in rank order, separated by a blank line
    pub fn build_context(results: &[RetrievedChunk]) -> String {
        results
            .iter()
            .map(|r| r.chunk.render_for_llm())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fill the QA template with `context` and `question`
    pub fn build_qa_prompt(question: &str, context: &str) -> Prompt {
        let user = format!(
            "Context information is below.\n\
             ---------------------\n\
             {context}\n\
             ---------------------\n\
             Given the context information and not prior knowledge, answer the query.\n\
             Query: {question}\n\
             Answer: "
        );

        Prompt::user(user).with_system(QA_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource, FileType};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn retrieved(filename: &str, page: Option<u32>, text: &str, similarity: f32) -> RetrievedChunk {
        let source = ChunkSource {
            filename: filename.to_string(),
            path: PathBuf::from(format!("/srv/data/{}", filename)),
            file_type: FileType::Pdf,
            page_number: page,
            page_count: page,
        };
        RetrievedChunk {
            chunk: Chunk::new(Uuid::new_v4(), text.to_string(), source, 0, text.len(), 0),
            similarity,
        }
    }

    #[test]
    fn test_build_context_keeps_rank_order() {
        let context = PromptBuilder::build_context(&[
            retrieved("jane.pdf", Some(1), "Jane knows Rust.", 0.9),
            retrieved("john.pdf", None, "John knows Go.", 0.4),
        ]);

        assert_eq!(
            context,
            "page_label: 1\nfile_name: jane.pdf\nfile_path: /srv/data/jane.pdf\n\nJane knows Rust.\n\n\
             file_name: john.pdf\nfile_path: /srv/data/john.pdf\n\nJohn knows Go."
        );
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_build_qa_prompt() {
        let prompt = PromptBuilder::build_qa_prompt("Who knows Rust?", "Jane knows Rust.");

        assert_eq!(prompt.system.as_deref(), Some(QA_SYSTEM_PROMPT));
        assert_eq!(
            prompt.user,
            "Context information is below.\n---------------------\nJane knows Rust.\n---------------------\n\
             Given the context information and not prior knowledge, answer the query.\n\
             Query: Who knows Rust?\nAnswer: "
        );
    }
}
