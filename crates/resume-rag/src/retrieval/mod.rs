//! Retrieval: index construction and similarity search

pub mod builder;
pub mod index;

pub use builder::IndexBuilder;
pub use index::VectorIndex;
