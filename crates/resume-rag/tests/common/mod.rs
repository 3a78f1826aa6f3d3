//! Deterministic providers and corpus helpers shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use resume_rag::providers::{EmbeddingProvider, LlmProvider, Prompt};
use resume_rag::{Error, Result};

pub const DIMS: usize = 64;

/// Bag-of-words embedder: each lowercase word is hashed into one of `DIMS` buckets
#[derive(Default)]
pub struct HashEmbedder {
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
            v[hash as usize % DIMS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        "bag-of-words"
    }
}

/// Echoes the prompt it was given, so answers are a pure function of the prompt
#[derive(Default)]
pub struct EchoLlm {
    pub prompts: Mutex<Vec<Prompt>>,
}

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().push(prompt.clone());
        Ok(format!("ANSWER[{}]", prompt.user))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Always fails, like an unreachable hosted model
pub struct DownLlm;

#[async_trait]
impl LlmProvider for DownLlm {
    async fn complete(&self, _prompt: &Prompt) -> Result<String> {
        Err(Error::llm("service unavailable"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "down"
    }

    fn model(&self) -> &str {
        "down"
    }
}

pub const JANE: &str = "Jane Doe is a senior Rust engineer. She built distributed storage \
engines and async network services with Tokio. Contact: jane@example.com.";

pub const JOHN: &str = "John Roe is a frontend developer. He writes React and TypeScript \
and designs accessible user interfaces. Contact: john@example.com.";

/// A data directory holding the given files
pub fn corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

pub fn resumes() -> TempDir {
    corpus(&[("jane.txt", JANE), ("john.md", JOHN)])
}
