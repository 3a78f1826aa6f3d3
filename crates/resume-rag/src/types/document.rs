//! Document and chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// MIME type, as recorded in document metadata
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Txt => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// Text of a single page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
    /// Character offset in the full document text
    pub char_offset: usize,
}

/// A loaded source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// File name without directory
    pub filename: String,
    /// Path the document was read from
    pub path: PathBuf,
    /// File type
    pub file_type: FileType,
    /// Full extracted text
    pub content: String,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Total number of pages (if applicable)
    pub total_pages: Option<u32>,
    /// Page-level content; a single entry for unpaginated formats
    pub pages: Vec<Page>,
    /// File size in bytes
    pub file_size: u64,
    /// Load timestamp
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    /// Additional metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Whether the document has any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Source information for a chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkSource {
    /// File name of the originating document
    pub filename: String,
    /// Path of the originating document
    pub path: PathBuf,
    /// File type
    pub file_type: FileType,
    /// Page number (1-indexed, PDFs only)
    pub page_number: Option<u32>,
    /// Total pages in document
    pub page_count: Option<u32>,
}

impl ChunkSource {
    /// Source info for a chunk of `doc`, optionally pinned to a page
    pub fn for_document(doc: &Document, page_number: Option<u32>) -> Self {
        Self {
            filename: doc.filename.clone(),
            path: doc.path.clone(),
            file_type: doc.file_type,
            page_number,
            page_count: doc.total_pages,
        }
    }

    /// Metadata lines placed above the chunk text in the LLM context
    pub fn metadata_header(&self) -> String {
        let mut lines = Vec::with_capacity(3);
        if let Some(page) = self.page_number {
            lines.push(format!("page_label: {}", page));
        }
        lines.push(format!("file_name: {}", self.filename));
        lines.push(format!("file_path: {}", self.path.display()));
        lines.join("\n")
    }
}

/// A chunk of text from a document, the unit that is embedded and retrieved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Where the text came from
    pub source: ChunkSource,
    /// Character position in original document
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: Uuid,
        content: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            source,
            char_start,
            char_end,
            chunk_index,
        }
    }

    /// Text handed to the LLM: metadata header, blank line, content
    pub fn render_for_llm(&self) -> String {
        format!("{}\n\n{}", self.source.metadata_header(), self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("md"), FileType::Markdown);
        assert_eq!(FileType::from_extension("docx"), FileType::Unknown);
        assert_eq!(FileType::from_path(Path::new("data/cv.pdf")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("data/README")), FileType::Unknown);
        assert!(!FileType::Unknown.is_supported());
    }

    #[test]
    fn test_render_for_llm() {
        let source = ChunkSource {
            filename: "jane.pdf".to_string(),
            path: PathBuf::from("/srv/data/jane.pdf"),
            file_type: FileType::Pdf,
            page_number: Some(2),
            page_count: Some(3),
        };
        let chunk = Chunk::new(Uuid::new_v4(), "Rust engineer".to_string(), source, 0, 13, 0);

        assert_eq!(
            chunk.render_for_llm(),
            "page_label: 2\nfile_name: jane.pdf\nfile_path: /srv/data/jane.pdf\n\nRust engineer"
        );
    }
}
