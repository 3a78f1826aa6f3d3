//! In-memory vector index with exact cosine search

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::{Chunk, RetrievedChunk};

/// A chunk paired with its embedding
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
    norm: f32,
}

/// Immutable index over the chunks of the loaded corpus.
///
/// Built once at startup and only read afterwards, so it can be shared
/// behind an `Arc` by every request without locking.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build from `(chunk, embedding)` pairs. Every embedding must have `dimensions` values.
    pub fn new(dimensions: usize, items: Vec<(Chunk, Vec<f32>)>) -> Result<Self> {
        let mut entries = Vec::with_capacity(items.len());
        for (chunk, embedding) in items {
            if embedding.len() != dimensions {
                return Err(Error::embedding(format!(
                    "Chunk {} of '{}' has {} dimensions, index expects {}",
                    chunk.chunk_index,
                    chunk.source.filename,
                    embedding.len(),
                    dimensions
                )));
            }
            let norm = magnitude(&embedding);
            entries.push(IndexEntry {
                chunk,
                embedding,
                norm,
            });
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of distinct documents the chunks came from
    pub fn document_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.chunk.document_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Iterate over the indexed chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Return up to `top_k` chunks, most similar first.
    ///
    /// Equal scores keep insertion order, so results are deterministic.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        if query.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Query embedding has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = magnitude(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, query_norm, &entry.embedding, entry.norm)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| RetrievedChunk {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect())
    }
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with precomputed magnitudes; zero vectors score 0.0
fn cosine_similarity(a: &[f32], mag_a: f32, b: &[f32], mag_b: f32) -> f32 {
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkSource, FileType};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn chunk(doc: Uuid, index: u32, text: &str) -> Chunk {
        let source = ChunkSource {
            filename: format!("doc-{}.txt", index),
            path: PathBuf::from("/data"),
            file_type: FileType::Txt,
            page_number: None,
            page_count: None,
        };
        Chunk::new(doc, text.to_string(), source, 0, text.len(), index)
    }

    fn index() -> VectorIndex {
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();
        VectorIndex::new(
            2,
            vec![
                (chunk(doc_a, 0, "east"), vec![1.0, 0.0]),
                (chunk(doc_a, 1, "north"), vec![0.0, 1.0]),
                (chunk(doc_b, 2, "north-east"), vec![1.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let results = index().search(&[0.9, 0.1], 3).unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(texts, vec!["east", "north-east", "north"]);
        assert!((results[0].similarity - 0.9939).abs() < 1e-3);
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_top_k_bounds() {
        let idx = index();
        assert_eq!(idx.search(&[1.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(idx.search(&[1.0, 0.0], 10).unwrap().len(), 3);
        assert!(idx.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let doc = Uuid::new_v4();
        let idx = VectorIndex::new(
            2,
            vec![
                (chunk(doc, 0, "first"), vec![0.0, 2.0]),
                (chunk(doc, 1, "second"), vec![0.0, 1.0]),
            ],
        )
        .unwrap();

        let results = idx.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(results[0].chunk.content, "first");
        assert_eq!(results[1].chunk.content, "second");
    }

    #[test]
    fn test_dimension_mismatch() {
        let idx = index();
        assert!(matches!(idx.search(&[1.0, 0.0, 0.0], 1), Err(Error::Embedding(_))));

        let err = VectorIndex::new(3, vec![(chunk(Uuid::new_v4(), 0, "x"), vec![1.0])]).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let results = index().search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(results[0].similarity, 0.0);
        assert_eq!(results[0].chunk.content, "east");
    }

    #[test]
    fn test_counts() {
        let idx = index();
        assert_eq!(idx.len(), 3);
        assert!(!idx.is_empty());
        assert_eq!(idx.dimensions(), 2);
        assert_eq!(idx.document_count(), 2);
        assert_eq!(idx.chunks().count(), 3);
    }
}
