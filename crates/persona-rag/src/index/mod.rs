//! In-memory vector index over the embedded chunks
//!
//! Built once per process from the two source documents, persisted to
//! disk as JSON, and reloaded on later startups when the recorded
//! content fingerprint still matches the source documents. Read-only
//! after build; callers may query it concurrently.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Persisted index file name inside the storage directory
const INDEX_FILE: &str = "index.json";

/// A chunk plus its embedding vector, owned exclusively by the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    /// The source chunk
    pub chunk: Chunk,
    /// Dense vector representation
    pub embedding: Vec<f32>,
}

/// A search hit: chunk plus similarity score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more similar)
    pub score: f32,
}

/// On-disk index representation
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    /// SHA-256 over the source documents the index was built from
    fingerprint: String,
    /// Embedding dimensions
    dimensions: usize,
    /// Embedded chunks in original insertion order
    entries: Vec<EmbeddedChunk>,
}

/// Immutable vector index
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// SHA-256 fingerprint over the source documents, in order.
    ///
    /// A persisted index is only reused when this matches, so editing
    /// a source file invalidates the stale index instead of silently
    /// serving old chunks.
    pub fn fingerprint(documents: &[(String, crate::types::SourceDocument)]) -> String {
        let mut hasher = Sha256::new();
        for (text, source) in documents {
            hasher.update(source.display_name().as_bytes());
            hasher.update([0u8]);
            hasher.update(text.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Build the index: load a matching persisted copy if one exists,
    /// otherwise embed `chunks` and persist the result.
    pub async fn build(
        chunks: Vec<Chunk>,
        fingerprint: &str,
        storage_dir: &Path,
        embedder: &Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        if let Some(index) = Self::load(storage_dir, fingerprint) {
            tracing::info!(
                "Loaded persisted index ({} chunks, fingerprint match)",
                index.len()
            );
            return Ok(index);
        }

        tracing::info!("Building vector index over {} chunks...", chunks.len());
        let index = Self::embed(chunks, embedder).await?;
        index.persist(storage_dir, fingerprint)?;
        tracing::info!("Vector index built and persisted ({} chunks)", index.len());
        Ok(index)
    }

    /// Embed all chunks into a fresh index
    async fn embed(chunks: Vec<Chunk>, embedder: &Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::index_build("no chunks to index"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| Error::index_build(e.to_string()))?;

        if embeddings.len() != chunks.len() {
            return Err(Error::index_build(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = embeddings.first().map(|v| v.len()).unwrap_or(0);
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Try to load a persisted index whose fingerprint matches.
    fn load(storage_dir: &Path, fingerprint: &str) -> Option<Self> {
        let path = Self::index_path(storage_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return None,
        };

        let persisted: PersistedIndex = match serde_json::from_str(&content) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Ignoring unreadable persisted index: {}", e);
                return None;
            }
        };

        if persisted.fingerprint != fingerprint {
            tracing::info!("Persisted index is stale (source documents changed), rebuilding");
            return None;
        }

        Some(Self {
            entries: persisted.entries,
            dimensions: persisted.dimensions,
        })
    }

    /// Persist the index to the storage directory
    fn persist(&self, storage_dir: &Path, fingerprint: &str) -> Result<()> {
        std::fs::create_dir_all(storage_dir).map_err(|e| Error::index_build(e.to_string()))?;

        let persisted = PersistedIndex {
            fingerprint: fingerprint.to_string(),
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };
        let content =
            serde_json::to_string(&persisted).map_err(|e| Error::index_build(e.to_string()))?;
        std::fs::write(Self::index_path(storage_dir), content)
            .map_err(|e| Error::index_build(e.to_string()))?;
        Ok(())
    }

    fn index_path(storage_dir: &Path) -> PathBuf {
        storage_dir.join(INDEX_FILE)
    }

    /// Search for the `k` most similar chunks, ordered by descending
    /// similarity. Ties keep original chunk insertion order.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort preserves insertion order between equal scores.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        results
    }

    /// Embed the query text and search
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        embedder: &Arc<dyn EmbeddingProvider>,
    ) -> Result<Vec<ScoredChunk>> {
        let query_embedding = embedder.embed(query).await?;
        Ok(self.search(&query_embedding, k))
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::testing::MockEmbedder;
    use crate::types::SourceDocument;

    fn embedder() -> Arc<dyn EmbeddingProvider> {
        Arc::new(MockEmbedder::new())
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new(
                "Meta Technical Program Manager, anomaly detection platform",
                SourceDocument::Resume,
            ),
            Chunk::new(
                "Copart Technical Product Manager, generative AI platform",
                SourceDocument::Resume,
            ),
            Chunk::new(
                "Tell me about a time you resolved a team conflict",
                SourceDocument::Behavioral,
            ),
        ]
    }

    fn docs() -> Vec<(String, SourceDocument)> {
        vec![
            ("resume text".to_string(), SourceDocument::Resume),
            ("behavioral text".to_string(), SourceDocument::Behavioral),
        ]
    }

    #[tokio::test]
    async fn search_ranks_by_similarity_and_respects_k() {
        let dir = tempfile::tempdir().unwrap();
        let fp = VectorIndex::fingerprint(&docs());
        let index = VectorIndex::build(chunks(), &fp, dir.path(), &embedder())
            .await
            .unwrap();

        let query = MockEmbedder::embed_sync("Copart generative AI platform product");
        let results = index.search(&query, 2);
        assert_eq!(results.len(), 2);
        assert!(results[0].chunk.text.contains("Copart"));
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn equal_scores_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let same = vec![
            Chunk::new("identical text", SourceDocument::Resume),
            Chunk::new("identical text", SourceDocument::Behavioral),
        ];
        let fp = VectorIndex::fingerprint(&docs());
        let index = VectorIndex::build(same, &fp, dir.path(), &embedder())
            .await
            .unwrap();

        let query = MockEmbedder::embed_sync("identical text");
        let results = index.search(&query, 2);
        assert_eq!(results[0].chunk.source, SourceDocument::Resume);
        assert_eq!(results[1].chunk.source, SourceDocument::Behavioral);
    }

    #[tokio::test]
    async fn matching_fingerprint_reloads_without_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let fp = VectorIndex::fingerprint(&docs());

        let first = Arc::new(MockEmbedder::new());
        let provider: Arc<dyn EmbeddingProvider> = first.clone();
        let built = VectorIndex::build(chunks(), &fp, dir.path(), &provider)
            .await
            .unwrap();
        assert!(first.call_count() > 0);

        let second = Arc::new(MockEmbedder::new());
        let provider: Arc<dyn EmbeddingProvider> = second.clone();
        let reloaded = VectorIndex::build(chunks(), &fp, dir.path(), &provider)
            .await
            .unwrap();
        assert_eq!(second.call_count(), 0, "reload must not re-embed");
        assert_eq!(reloaded.len(), built.len());
    }

    #[tokio::test]
    async fn changed_fingerprint_forces_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let fp = VectorIndex::fingerprint(&docs());
        VectorIndex::build(chunks(), &fp, dir.path(), &embedder())
            .await
            .unwrap();

        let changed = vec![("edited resume".to_string(), SourceDocument::Resume)];
        let new_fp = VectorIndex::fingerprint(&changed);
        assert_ne!(fp, new_fp);

        let counted = Arc::new(MockEmbedder::new());
        let provider: Arc<dyn EmbeddingProvider> = counted.clone();
        VectorIndex::build(chunks(), &new_fp, dir.path(), &provider)
            .await
            .unwrap();
        assert!(counted.call_count() > 0, "stale index must be rebuilt");
    }

    #[tokio::test]
    async fn empty_chunk_set_is_a_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = VectorIndex::build(Vec::new(), "fp", dir.path(), &embedder()).await;
        assert!(matches!(result, Err(Error::IndexBuild(_))));
    }
}
