//! In-process sentence embeddings with ONNX Runtime
//!
//! Runs sentence-transformers/all-MiniLM-L6-v2 locally: tokenize, run the
//! encoder, mean-pool the last hidden state over the attention mask and
//! L2-normalise. Model and tokenizer are downloaded from the HuggingFace hub
//! on first use and cached under `embeddings.cache_dir`.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

const HF_BASE: &str = "https://huggingface.co/sentence-transformers";

/// Map Ollama-style tags onto the sentence-transformers repository name
fn hf_model_id(model: &str) -> &str {
    match model.to_lowercase().as_str() {
        "all-minilm" | "all-minilm:l6" | "all-minilm:l6-v2" | "all-minilm-l6-v2" => {
            "all-MiniLM-L6-v2"
        }
        _ => model,
    }
}

struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    max_length: usize,
}

/// ONNX-based embedding provider
pub struct OnnxEmbedder {
    model: Arc<OnnxModel>,
    model_id: String,
    dimensions: usize,
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Load (downloading on first use) the configured model
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_id = hf_model_id(&config.model).to_string();
        tracing::info!("Initializing ONNX embedder with model: {}", model_id);

        let model_dir = config.cache_dir.join(&model_id);
        tokio::fs::create_dir_all(&model_dir)
            .await
            .map_err(|e| Error::config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            download(&format!("{}/{}/resolve/main/onnx/model.onnx", HF_BASE, model_id), &model_path)
                .await?;
        }
        if !tokenizer_path.exists() {
            download(&format!("{}/{}/resolve/main/tokenizer.json", HF_BASE, model_id), &tokenizer_path)
                .await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!("ONNX embedder ready ({} dimensions)", config.dimensions);

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                max_length: config.max_length,
            }),
            model_id,
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }

    async fn run_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let embeddings = tokio::task::spawn_blocking(move || model.encode(&texts))
            .await
            .map_err(|e| Error::internal(format!("Embedding task panicked: {}", e)))??;

        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(Error::embedding(format!(
                "Model '{}' produced {} dimensions, expected {}",
                self.model_id,
                bad.len(),
                self.dimensions
            )));
        }
        Ok(embeddings)
    }
}

impl OnnxModel {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.max_length);

        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (row, encoding) in encodings.iter().enumerate() {
            let offset = row * seq_len;
            let tokens = encoding
                .get_ids()
                .iter()
                .zip(encoding.get_attention_mask())
                .zip(encoding.get_type_ids())
                .take(seq_len);
            for (col, ((&id, &mask), &kind)) in tokens.enumerate() {
                input_ids[offset + col] = id as i64;
                attention_mask[offset + col] = mask as i64;
                token_type_ids[offset + col] = kind as i64;
            }
        }

        let tensor = |name: &str, data: Vec<i64>| {
            Tensor::from_array((vec![batch_size, seq_len], data.into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("Failed to build {} tensor: {}", name, e)))
        };
        let inputs = vec![
            ("input_ids", tensor("input_ids", input_ids)?.into_dyn()),
            ("attention_mask", tensor("attention_mask", attention_mask.clone())?.into_dyn()),
            ("token_type_ids", tensor("token_type_ids", token_type_ids)?.into_dyn()),
        ];

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::embedding(format!("Inference failed: {}", e)))?;

        let named: Vec<_> = outputs.iter().collect();
        let hidden = named
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| named.first())
            .map(|(_, value)| value)
            .ok_or_else(|| Error::embedding("Model produced no output tensor"))?;

        let (shape, data) = hidden
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::embedding(format!("Failed to extract tensor: {}", e)))?;
        let hidden_size = shape.get(2).map(|&d| d as usize).unwrap_or(0);
        if hidden_size == 0 || data.len() < batch_size * seq_len * hidden_size {
            return Err(Error::embedding(format!("Unexpected output shape {:?}", shape)));
        }

        let embeddings = (0..batch_size)
            .map(|row| {
                let states = &data[row * seq_len * hidden_size..(row + 1) * seq_len * hidden_size];
                let mask = &attention_mask[row * seq_len..(row + 1) * seq_len];
                normalize(mean_pool(states, mask, hidden_size))
            })
            .collect();
        Ok(embeddings)
    }
}

/// Average the token states of one sequence, weighting each by its attention mask
fn mean_pool(states: &[f32], mask: &[i64], hidden_size: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for (token, &m) in states.chunks_exact(hidden_size).zip(mask) {
        if m > 0 {
            for (acc, &v) in pooled.iter_mut().zip(token) {
                *acc += v;
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        pooled.iter_mut().for_each(|v| *v /= count);
    }
    pooled
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

async fn download(url: &str, path: &Path) -> Result<()> {
    tracing::info!("Downloading {}", url);

    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::embedding(format!("Download of {} failed: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "Download of {} failed: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("Failed to read {}: {}", url, e)))?;
    tokio::fs::write(path, &bytes).await?;

    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run_batch(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::embedding("Empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.run_batch(batch.to_vec()).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "onnx"
    }

    fn model(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hf_model_id() {
        assert_eq!(hf_model_id("all-minilm"), "all-MiniLM-L6-v2");
        assert_eq!(hf_model_id("all-MiniLM-L6-v2"), "all-MiniLM-L6-v2");
        assert_eq!(hf_model_id("paraphrase-MiniLM-L3-v2"), "paraphrase-MiniLM-L3-v2");
    }

    #[test]
    fn test_mean_pool_ignores_padding() {
        let states = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&states, &[1, 1, 0], 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn test_normalize() {
        let v = normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
