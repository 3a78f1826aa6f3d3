//! Text chunking with page and position tracking

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkSource, Document};

/// Sentence-aware text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            min_size: 50,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap).with_min_size(config.min_chunk_size)
    }

    /// Override the minimum chunk size
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Chunk a document page by page. Any document with text yields at least one chunk.
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in &doc.pages {
            let page_number = doc.total_pages.map(|_| page.page_number);
            let page_chunks = self.chunk_text_with_source(
                &page.content,
                doc,
                page_number,
                page.char_offset,
                chunks.len() as u32,
            );
            chunks.extend(page_chunks);
        }

        if chunks.is_empty() && doc.has_text() {
            let content = doc.content.trim().to_string();
            let page_number = doc
                .pages
                .first()
                .filter(|_| doc.total_pages.is_some())
                .map(|p| p.page_number);
            let source = ChunkSource::for_document(doc, page_number);
            chunks.push(Chunk::new(doc.id, content, source, 0, doc.content.len(), 0));
        }

        chunks
    }

    /// Chunk text with source information
    fn chunk_text_with_source(
        &self,
        text: &str,
        doc: &Document,
        page_number: Option<u32>,
        base_offset: usize,
        start_index: u32,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        let mut current_chunk = String::new();
        let mut current_start = 0usize;
        let mut chunk_index = start_index;
        let mut char_pos = 0usize;
        // Whether `current_chunk` holds text not already emitted in a previous chunk
        let mut has_fresh_text = false;

        for unit in self.split_into_units(text) {
            let unit_len = unit.len();

            if has_fresh_text
                && current_chunk.len() + unit_len > self.chunk_size
                && current_chunk.trim().len() >= self.min_size
            {
                chunks.push(Chunk::new(
                    doc.id,
                    current_chunk.trim().to_string(),
                    ChunkSource::for_document(doc, page_number),
                    base_offset + current_start,
                    base_offset + char_pos,
                    chunk_index,
                ));
                chunk_index += 1;

                // Start new chunk with overlap
                current_chunk = self.get_overlap_text(&current_chunk);
                current_start = char_pos - current_chunk.len();
                has_fresh_text = false;
            }

            current_chunk.push_str(unit);
            char_pos += unit_len;
            if !unit.trim().is_empty() {
                has_fresh_text = true;
            }
        }

        // Save final chunk; a tail with unseen text is kept even when shorter than min_size
        let tail = current_chunk.trim();
        if has_fresh_text && !tail.is_empty() {
            chunks.push(Chunk::new(
                doc.id,
                tail.to_string(),
                ChunkSource::for_document(doc, page_number),
                base_offset + current_start,
                base_offset + char_pos,
                chunk_index,
            ));
        }

        chunks
    }

    /// Split text into sentences, breaking sentences longer than a chunk at word bounds
    fn split_into_units<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut units = Vec::new();

        for sentence in text.split_sentence_bounds() {
            if sentence.len() <= self.chunk_size {
                units.push(sentence);
                continue;
            }

            let mut start = 0usize;
            let mut end = 0usize;
            for (offset, word) in sentence.split_word_bound_indices() {
                if offset + word.len() - start > self.chunk_size && end > start {
                    units.push(&sentence[start..end]);
                    start = end;
                }
                end = offset + word.len();
            }
            if end > start {
                units.push(&sentence[start..end]);
            }
        }

        units
    }

    /// Get overlap text from the end of a chunk
    fn get_overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len() - self.overlap;

        // Ensure we're at a valid UTF-8 character boundary
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }

        let overlap_text = &text[start..];

        // Try to start at a sentence boundary
        if let Some(pos) = overlap_text.find(". ") {
            return overlap_text[pos + 2..].to_string();
        }

        // Fall back to word boundary
        if let Some(pos) = overlap_text.find(' ') {
            return overlap_text[pos + 1..].to_string();
        }

        overlap_text.to_string()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}
