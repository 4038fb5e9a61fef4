//! persona-rag: RAG chatbot core for one person's professional background
//!
//! This crate answers questions about a single individual's career by
//! retrieving relevant chunks from a small fixed document set (resume +
//! behavioral Q&A) and forwarding them, with per-session conversation
//! history, to a hosted LLM endpoint. Retrieval is routed through a
//! keyword-triggered company tier, a timeline tier, or a generic
//! similarity tier.

pub mod config;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod index;
pub mod ingestion;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::RagConfig;
pub use engine::RagEngine;
pub use error::{Error, Result};
pub use types::{ApiCallStats, Chunk, ConversationTurn, Role, SessionStats, SourceDocument};
