//! Chat request types

use serde::{Deserialize, Serialize};

/// One completed exchange as the chat page keeps it: `[user, assistant]`
pub type HistoryTurn = (String, String);

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message
    pub message: String,

    /// Earlier turns, display-only; never used for retrieval or prompting
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"Who is Jane?"}"#).unwrap();
        assert_eq!(request.message, "Who is Jane?");
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_history_pairs() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"message":"And her email?","history":[["Who is Jane?","A Rust engineer."]]}"#,
        )
        .unwrap();
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.history[0].1, "A Rust engineer.");
    }
}
