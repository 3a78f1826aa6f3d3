//! Document ingestion: directory loading, parsing and chunking

mod chunker;
pub mod loader;
mod parser;

pub use chunker::TextChunker;
pub use loader::{DirectoryLoader, DocumentLoader};
pub use parser::{FileParser, ParsedDocument};
