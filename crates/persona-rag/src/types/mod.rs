//! Core types: chunks, conversation turns, and statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source document a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDocument {
    /// The resume
    Resume,
    /// The behavioral Q&A document
    Behavioral,
}

impl SourceDocument {
    /// Display name for logging
    pub fn display_name(&self) -> &str {
        match self {
            Self::Resume => "resume",
            Self::Behavioral => "behavioral Q&A",
        }
    }
}

/// A bounded span of source text used as a retrieval unit.
///
/// Created once at index-build time and never mutated; identity is
/// positional within the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text
    pub text: String,
    /// Source document the text was cut from
    pub source: SourceDocument,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, source: SourceDocument) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    /// Leading excerpt of the chunk, at most `max_chars` characters,
    /// used as a source snippet in answers.
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let cut: String = self.text.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
}

impl Role {
    /// Wire-format role for the LLM contents array ("user" / "model")
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "model",
        }
    }
}

/// One turn of a conversation, append-only once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn
    pub role: Role,
    /// Turn text
    pub content: String,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the given instant
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Process-wide LLM call counters, monotonically incremented
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ApiCallStats {
    /// Every attempted call, regardless of outcome
    pub total_calls: u64,
    /// Calls that returned usable text
    pub successful_calls: u64,
    /// Calls that failed in transport or parsing
    pub failed_calls: u64,
}

/// Session store counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Sessions ever created
    pub total_sessions: u64,
    /// Sessions currently live
    pub active_sessions: u64,
    /// Sessions removed by expiry or explicit eviction
    pub expired_sessions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_text() {
        let chunk = Chunk::new("a".repeat(300), SourceDocument::Resume);
        let excerpt = chunk.excerpt(200);
        assert_eq!(excerpt.len(), 203); // 200 chars + "..."
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_keeps_short_text_verbatim() {
        let chunk = Chunk::new("short text", SourceDocument::Behavioral);
        assert_eq!(chunk.excerpt(200), "short text");
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Assistant.wire_name(), "model");
    }
}
