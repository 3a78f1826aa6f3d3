//! Answer generation: prompt rendering and the query engine

pub mod prompt;
pub mod query_engine;

pub use prompt::{PromptBuilder, QA_SYSTEM_PROMPT};
pub use query_engine::QueryEngine;
