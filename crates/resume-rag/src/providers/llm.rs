//! LLM provider trait for completing prompts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A rendered prompt: optional system instructions plus the user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// System message
    pub system: Option<String>,
    /// User message (context + question)
    pub user: String,
}

impl Prompt {
    /// Prompt with only a user message
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    /// Attach a system message
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Trait for hosted or local LLM completion
///
/// Implementations:
/// - `GroqClient`: Groq OpenAI-compatible chat completions (llama-3.1-8b-instant)
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete the prompt and return the generated text verbatim
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
