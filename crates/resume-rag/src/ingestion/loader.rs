//! Directory loader: turns every supported file in a folder into a [`Document`]

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::types::{Document, FileType};

use super::parser::FileParser;

/// Anything that can produce the corpus from a directory
pub trait DocumentLoader: Send + Sync {
    /// Load every document under `dir`.
    ///
    /// Fails with [`Error::DirectoryNotFound`] when `dir` is missing and with
    /// [`Error::EmptyCorpus`] when nothing loadable is found.
    fn load(&self, dir: &Path) -> Result<Vec<Document>>;
}

/// Filesystem loader for PDF, text and Markdown files
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    recursive: bool,
    exclude_hidden: bool,
    required_extensions: Vec<String>,
    raise_on_error: bool,
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self::from_config(&DataConfig::default())
    }
}

impl DirectoryLoader {
    /// Create from configuration
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            recursive: config.recursive,
            exclude_hidden: config.exclude_hidden,
            required_extensions: config
                .required_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            raise_on_error: config.raise_on_error,
        }
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Restrict loading to the given extensions
    pub fn required_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Fail on the first file that cannot be parsed
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    }

    fn accepts(&self, path: &Path) -> bool {
        if !FileType::from_path(path).is_supported() {
            return false;
        }
        if self.required_extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.required_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    fn load_file(path: &Path) -> Result<Document> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let parsed = FileParser::parse(&filename, &data)?;
        let full_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(parsed.into_document(full_path, data.len() as u64))
    }

    /// Handle a per-file failure according to `raise_on_error`
    fn on_error(&self, path: &Path, err: Error) -> Result<()> {
        if self.raise_on_error {
            return Err(err);
        }
        tracing::warn!("Skipping {}: {}", path.display(), err);
        Ok(())
    }
}

impl DocumentLoader for DirectoryLoader {
    fn load(&self, dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let exclude_hidden = self.exclude_hidden;
        let mut documents = Vec::new();

        for entry in walker
            .into_iter()
            .filter_entry(|e| !(exclude_hidden && Self::is_hidden(e)))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    self.on_error(&path, Error::Io(e.into()))?;
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.accepts(path) {
                tracing::debug!("Ignoring unsupported file {}", path.display());
                continue;
            }

            match Self::load_file(path) {
                Ok(doc) if doc.has_text() => {
                    tracing::info!(
                        "Loaded {} ({}, {} page(s))",
                        doc.filename,
                        doc.file_type.display_name(),
                        doc.pages.len()
                    );
                    documents.push(doc);
                }
                Ok(_) => {
                    self.on_error(path, Error::file_parse(path.display().to_string(), "file has no text"))?;
                }
                Err(e) => self.on_error(path, e)?,
            }
        }

        if documents.is_empty() {
            return Err(Error::EmptyCorpus(dir.to_path_buf()));
        }

        Ok(documents)
    }
}

/// Absolute form of `dir` for log messages; the path itself when it does not exist
pub fn display_dir(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("data");
        let err = DirectoryLoader::default().load(&missing).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let dir = corpus(&[("resume.txt", "Jane")]);
        let err = DirectoryLoader::default()
            .load(&dir.path().join("resume.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryLoader::default().load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus(_)));
    }

    #[test]
    fn test_only_unsupported_files() {
        let dir = corpus(&[("photo.png", "not text"), ("notes.docx", "binary")]);
        let err = DirectoryLoader::default().load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus(_)));
    }

    #[test]
    fn test_loads_in_sorted_order_and_skips_hidden() {
        let dir = corpus(&[
            ("b.txt", "Second resume"),
            ("a.md", "# First resume"),
            (".draft.txt", "hidden"),
        ]);
        let docs = DirectoryLoader::default().load(dir.path()).unwrap();

        let names: Vec<_> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
        assert!(docs[0].path.is_absolute());
    }

    #[test]
    fn test_recursion_is_opt_in() {
        let dir = corpus(&[("top.txt", "Top level"), ("nested/deep.txt", "Nested")]);

        let flat = DirectoryLoader::default().load(dir.path()).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = DirectoryLoader::default().recursive(true).load(dir.path()).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_required_extensions() {
        let dir = corpus(&[("cv.txt", "Text resume"), ("cv.md", "Markdown resume")]);
        let docs = DirectoryLoader::default()
            .required_extensions([".MD"])
            .load(dir.path())
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_type, FileType::Markdown);
    }

    #[test]
    fn test_broken_files_are_skipped_unless_raising() {
        let dir = corpus(&[("broken.pdf", "not really a pdf"), ("ok.txt", "Jane Doe")]);

        let docs = DirectoryLoader::default().load(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "ok.txt");

        let err = DirectoryLoader::default()
            .raise_on_error(true)
            .load(dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_blank_files_do_not_count() {
        let dir = corpus(&[("blank.txt", "   \n")]);
        let err = DirectoryLoader::default().load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus(_)));
    }

    #[test]
    fn test_loads_pdf_with_pages() {
        let dir = corpus(&[("notes.txt", "Plain notes")]);
        let pdf = crate::ingestion::parser::build_pdf(&["Jane Doe", "Rust and Tokio"]);
        fs::write(dir.path().join("cv.pdf"), &pdf).unwrap();

        let docs = DirectoryLoader::default().load(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);

        let cv = docs.iter().find(|d| d.filename == "cv.pdf").unwrap();
        assert_eq!(cv.file_type, FileType::Pdf);
        assert_eq!(cv.total_pages, Some(2));
        assert_eq!(cv.file_size, pdf.len() as u64);
        assert!(cv.content.contains("Rust and Tokio"));
    }
}
