//! Error types for the RAG core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document missing or unreadable
    #[error("Failed to load document '{path}': {message}")]
    DocumentLoad { path: String, message: String },

    /// Embedding backend failed its capability check
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Embedding or persistence failure while building the index
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Query attempted before the index was built
    #[error("Knowledge base not initialized")]
    NotInitialized,

    /// Transport failure or timeout talking to the LLM endpoint
    #[error("Network error calling LLM endpoint: {0}")]
    Network(String),

    /// Malformed or candidate-less LLM response body
    #[error("Unexpected LLM response: {0}")]
    Protocol(String),

    /// No API credential configured
    #[error("LLM API key is not configured")]
    MissingCredential,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document load error
    pub fn document_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an index build error
    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Natural-language message suitable for direct display to the user.
    ///
    /// The orchestrator surfaces every sub-component failure as
    /// conversational text rather than propagating it past the core
    /// boundary, so each variant maps to an apology sentence instead
    /// of a code or a stack trace.
    pub fn user_message(&self) -> String {
        match self {
            Error::NotInitialized => {
                "The knowledge base is not ready yet. Please try again in a moment.".to_string()
            }
            Error::Network(_) => {
                "Sorry, I encountered a network error. Could you please repeat that?".to_string()
            }
            Error::Protocol(_) => {
                "Sorry, I received an unexpected response. Could you please try again?".to_string()
            }
            Error::MissingCredential => {
                "Sorry, I am not fully configured yet and cannot answer questions right now."
                    .to_string()
            }
            Error::EmbeddingUnavailable(_) => {
                "Sorry, the knowledge base is unavailable right now. Please try again later."
                    .to_string()
            }
            _ => "Sorry, I encountered an error processing your message. Please try again."
                .to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::DocumentLoad { path, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "document_load_error",
                format!("Failed to load '{}': {}", path, message),
            ),
            Error::EmbeddingUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "embedding_unavailable",
                msg.clone(),
            ),
            Error::IndexBuild(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "index_build_error",
                msg.clone(),
            ),
            Error::NotInitialized => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_initialized",
                self.to_string(),
            ),
            Error::Network(msg) => (StatusCode::BAD_GATEWAY, "network_error", msg.clone()),
            Error::Protocol(msg) => (StatusCode::BAD_GATEWAY, "protocol_error", msg.clone()),
            Error::MissingCredential => (
                StatusCode::SERVICE_UNAVAILABLE,
                "missing_credential",
                self.to_string(),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
