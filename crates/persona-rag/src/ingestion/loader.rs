//! Fixed two-document loader
//!
//! The document set is static: the resume and the behavioral Q&A file.
//! If either is missing or unreadable, initialization aborts with no
//! partial index.

use std::path::Path;

use crate::config::DocumentConfig;
use crate::error::{Error, Result};
use crate::types::SourceDocument;

/// Load both source documents in their fixed order (resume first).
pub fn load_documents(config: &DocumentConfig) -> Result<Vec<(String, SourceDocument)>> {
    let resume = read_document(&config.resume_path)?;
    let behavioral = read_document(&config.behavioral_path)?;

    tracing::info!(
        "Loaded source documents ({} + {} chars)",
        resume.len(),
        behavioral.len()
    );

    Ok(vec![
        (resume, SourceDocument::Resume),
        (behavioral, SourceDocument::Behavioral),
    ])
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::document_load(path.to_string_lossy(), e.to_string()))
}
