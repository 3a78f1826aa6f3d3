//! PDF and plain-text file parser

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Document, FileType, Page};

/// Glyph names that leak into extracted PDF text, with the character they stand for
const GLYPH_NAMES: &[(&str, char)] = &[
    // Hyphens and dashes
    ("uni2010", '\u{2010}'),
    ("uni2011", '\u{2011}'),
    ("uni2012", '\u{2012}'),
    ("uni2013", '\u{2013}'),
    ("uni2014", '\u{2014}'),
    ("uni2015", '\u{2015}'),
    // Quotation marks
    ("uni2018", '\u{2018}'),
    ("uni2019", '\u{2019}'),
    ("uni201A", '\u{201A}'),
    ("uni201C", '\u{201C}'),
    ("uni201D", '\u{201D}'),
    ("uni201E", '\u{201E}'),
    // Bullets and symbols
    ("uni2022", '\u{2022}'),
    ("uni2026", '\u{2026}'),
    // Spaces
    ("uni00A0", '\u{00A0}'),
    ("uni2002", '\u{2002}'),
    ("uni2003", '\u{2003}'),
    ("uni2009", '\u{2009}'),
    // Other common
    ("uni2212", '\u{2212}'),
    ("uni00AE", '\u{00AE}'),
    ("uni2122", '\u{2122}'),
    ("uni00A9", '\u{00A9}'),
    ("uni20AC", '\u{20AC}'),
    // Ligatures, underscore form
    ("f_f_i", '\u{FB03}'),
    ("f_f_l", '\u{FB04}'),
    ("f_i", '\u{FB01}'),
    ("f_l", '\u{FB02}'),
    ("f_f", '\u{FB00}'),
];

/// Replace glyph names and typographic characters with plain equivalents
fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.to_string();

    for (glyph_name, char_value) in GLYPH_NAMES {
        for pattern in [format!("({})", glyph_name), format!("<{}>", glyph_name)] {
            result = result.replace(&pattern, &char_value.to_string());
        }
        if glyph_name.starts_with("uni") {
            result = result.replace(glyph_name, &char_value.to_string());
        }
    }

    result
        .replace(['\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2212}'], "-")
        .replace(['\u{2014}', '\u{2015}'], "--")
        .replace(['\u{2018}', '\u{2019}', '\u{201A}'], "'")
        .replace(['\u{201C}', '\u{201D}', '\u{201E}'], "\"")
        .replace('\u{2022}', "* ")
        .replace('\u{2026}', "...")
        .replace(['\u{00A0}', '\u{2002}', '\u{2003}', '\u{2009}'], " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}

/// Cleanup plus null removal, line trimming and blank-line removal
fn normalize_pdf_text(text: &str) -> String {
    cleanup_pdf_text(text)
        .replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parsed file with extracted text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Full extracted text (pages joined by a blank line)
    pub content: String,
    /// Content hash
    pub content_hash: String,
    /// Total pages, when text could be attributed to pages
    pub total_pages: Option<u32>,
    /// Page-level content
    pub pages: Vec<Page>,
}

impl ParsedDocument {
    /// Assemble from per-page text, skipping pages with no text
    pub(crate) fn from_pages(
        file_type: FileType,
        page_texts: Vec<(u32, String)>,
        total_pages: Option<u32>,
    ) -> Self {
        let mut content = String::new();
        let mut pages = Vec::with_capacity(page_texts.len());

        for (page_number, text) in page_texts {
            if text.trim().is_empty() {
                continue;
            }
            if !content.is_empty() {
                content.push_str("\n\n");
            }
            pages.push(Page {
                page_number,
                content: text.clone(),
                char_offset: content.len(),
            });
            content.push_str(&text);
        }

        Self {
            file_type,
            content_hash: hash_content(&content),
            content,
            total_pages,
            pages,
        }
    }

    /// Attach file identity and produce a loaded [`Document`]
    pub fn into_document(self, path: PathBuf, file_size: u64) -> Document {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let mut metadata = HashMap::new();
        metadata.insert("file_name".to_string(), serde_json::json!(filename));
        metadata.insert("file_path".to_string(), serde_json::json!(path.to_string_lossy()));
        metadata.insert("file_type".to_string(), serde_json::json!(self.file_type.mime_type()));
        metadata.insert("file_size".to_string(), serde_json::json!(file_size));

        Document {
            id: Uuid::new_v4(),
            filename,
            path,
            file_type: self.file_type,
            content: self.content,
            content_hash: self.content_hash,
            total_pages: self.total_pages,
            pages: self.pages,
            file_size,
            loaded_at: chrono::Utc::now(),
            metadata,
        }
    }
}

/// File parser for the formats the loader accepts
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        let file_type = FileType::from_extension(extension);

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Txt | FileType::Markdown => Ok(Self::parse_text(data, file_type)),
            FileType::Unknown => Err(Error::UnsupportedFileType(format!(
                "{} ({})",
                filename,
                if extension.is_empty() { "no extension" } else { extension }
            ))),
        }
    }

    /// Parse PDF document, page by page when the page tree is readable
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        if let Some((page_texts, total_pages)) = Self::extract_pdf_pages(data) {
            let parsed = ParsedDocument::from_pages(FileType::Pdf, page_texts, Some(total_pages));
            if !parsed.content.is_empty() {
                return Ok(parsed);
            }
            tracing::debug!("{}: per-page extraction produced no text, trying pdf-extract", filename);
        }

        let content = normalize_pdf_text(&Self::extract_pdf_with_timeout(filename, data)?);
        if content.is_empty() {
            return Err(Error::file_parse(filename, "No text content could be extracted from PDF"));
        }

        // Whole-document text has no reliable page breaks, so no page numbers are claimed
        Ok(ParsedDocument::from_pages(FileType::Pdf, vec![(1, content)], None))
    }

    /// Per-page text via lopdf; `None` when the file cannot be loaded
    fn extract_pdf_pages(data: &[u8]) -> Option<(Vec<(u32, String)>, u32)> {
        let doc = lopdf::Document::load_mem(data).ok()?;
        let pages = doc.get_pages();
        let total = pages.len() as u32;

        let texts = pages
            .keys()
            .map(|&page_number| {
                let text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                    tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                    String::new()
                });
                (page_number, normalize_pdf_text(&text))
            })
            .collect();

        Some((texts, total))
    }

    /// Extract PDF text with a sync timeout to prevent hangs on problematic fonts
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed on {}: {}, trying fallback", filename, e);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The worker thread cannot be killed; it is left to finish on its own
                tracing::error!("PDF extraction of {} timed out after 60s", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread for {} crashed", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
        }
    }

    /// Fallback PDF text extraction by scanning content streams directly
    fn extract_pdf_text_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let mut all_text = String::new();

        for (page_num, page_id) in doc.get_pages() {
            match doc.get_page_content(page_id) {
                Ok(content) => {
                    let text = Self::extract_text_from_content(&content);
                    if !text.is_empty() {
                        all_text.push_str(&text);
                        all_text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not get content for page {}: {}", page_num, e);
                }
            }
        }

        if all_text.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(all_text)
    }

    /// Pull literal strings shown between BT/ET operators out of a content stream
    fn extract_text_from_content(content: &[u8]) -> String {
        let content_str = String::from_utf8_lossy(content);
        let mut text = String::new();
        let mut in_text_block = false;
        let mut current_text = String::new();

        for line in content_str.lines() {
            let line = line.trim();

            if line == "BT" {
                in_text_block = true;
                continue;
            }

            if line == "ET" {
                in_text_block = false;
                if !current_text.is_empty() {
                    text.push_str(&current_text);
                    text.push(' ');
                    current_text.clear();
                }
                continue;
            }

            if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) {
                if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                    if start < end {
                        let decoded = line[start + 1..end]
                            .replace("\\n", "\n")
                            .replace("\\r", "\r")
                            .replace("\\t", "\t")
                            .replace("\\(", "(")
                            .replace("\\)", ")")
                            .replace("\\\\", "\\");
                        current_text.push_str(&decoded);
                    }
                }
            }
        }

        text
    }

    /// Parse plain text or markdown
    fn parse_text(data: &[u8], file_type: FileType) -> ParsedDocument {
        let content = String::from_utf8_lossy(data).to_string();

        ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            pages: vec![Page {
                page_number: 1,
                content: content.clone(),
                char_offset: 0,
            }],
            content,
            total_pages: None,
        }
    }
}

/// Hash content for identification
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build a PDF with one Helvetica text line per page
#[cfg(test)]
pub(crate) fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_texts.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
