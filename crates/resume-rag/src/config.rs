//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Document directory configuration
    pub data: DataConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Chat page text
    pub ui: UiConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file. Missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make indexing or retrieval meaningless
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::config("embeddings.dimensions must be greater than zero"));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::config("embeddings.batch_size must be greater than zero"));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
            enable_cors: true,
        }
    }
}

/// Where documents are loaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the documents
    pub dir: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Skip dot-files and dot-directories
    pub exclude_hidden: bool,
    /// Only load these extensions (empty = every supported type)
    pub required_extensions: Vec<String>,
    /// Abort loading on the first unparseable file instead of skipping it
    pub raise_on_error: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            recursive: false,
            exclude_hidden: true,
            required_extensions: Vec::new(),
            raise_on_error: false,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller trailing chunks are dropped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the LLM per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 2 }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama `/api/embeddings`
    #[default]
    Ollama,
    /// In-process ONNX model (requires the `onnx` feature)
    Onnx,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which backend computes embeddings
    pub provider: EmbeddingBackend,
    /// Ollama base URL
    pub base_url: String,
    /// Model name (Ollama tag or sentence-transformers model id)
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length (ONNX only)
    pub max_length: usize,
    /// Cache directory for downloaded models (ONNX only)
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            timeout_secs: 120,
            max_retries: 0,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("resume-rag")
                .join("models"),
        }
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Groq hosted, OpenAI-compatible chat completions
    #[default]
    Groq,
    /// Local Ollama `/api/generate`
    Ollama,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend answers questions
    pub provider: LlmBackend,
    /// Base URL of the provider API
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::Groq,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.1,
            max_tokens: None,
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Chat page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Page title
    pub title: String,
    /// Text shown under the title
    pub description: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Generative AI Resume Helper".to_string(),
            description: "Ask questions about the resume PDFs stored in the `data/` folder. \
                          This app uses Retrieval-Augmented Generation with a Groq-hosted Llama 3 model."
                .to_string(),
        }
    }
}
