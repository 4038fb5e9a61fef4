//! Configuration for the RAG core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the LLM API credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the LLM endpoint URL
pub const API_URL_ENV: &str = "GEMINI_API_URL";

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Source document configuration
    #[serde(default)]
    pub documents: DocumentConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding backend configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// LLM endpoint configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Session store configuration
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Source document configuration
///
/// The document set is fixed: a resume and a behavioral Q&A file.
/// There is no multi-tenant ingestion; both files must exist for
/// initialization to succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Path to the resume text file
    pub resume_path: PathBuf,
    /// Path to the behavioral Q&A text file
    pub behavioral_path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            resume_path: PathBuf::from("data/resume.txt"),
            behavioral_path: PathBuf::from("data/behavioral_qa.txt"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding server base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM, 768 for nomic-embed-text)
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            timeout_secs: 60,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory where the persisted index lives
    pub storage_dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let storage_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("persona-rag");
        Self { storage_dir }
    }
}

/// LLM endpoint configuration
///
/// The API credential is never part of the config file; it is read
/// from the environment (`GEMINI_API_KEY`) at client construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generation endpoint URL (overridable via `GEMINI_API_URL`)
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Endpoint URL with the environment override applied
    pub fn resolved_url(&self) -> String {
        std::env::var(API_URL_ENV).unwrap_or_else(|_| self.url.clone())
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity window after which a session is evicted, in seconds
    pub inactivity_window_secs: u64,
    /// Interval between eviction sweeps, in seconds
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_window_secs: 2 * 60 * 60, // 2 hours
            sweep_interval_secs: 5 * 60,         // 5 minutes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.sessions.inactivity_window_secs, 7200);
        assert_eq!(config.sessions.sweep_interval_secs, 300);
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            enable_cors = false
        "#;
        let config: RagConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.chunking.chunk_size, 1000);
    }
}
