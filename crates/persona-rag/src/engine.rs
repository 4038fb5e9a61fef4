//! Orchestrator: wires retrieval, sessions, and the LLM gateway
//!
//! `answer` is the single inbound operation for question handling; all
//! sub-component failures are converted to a conversational apology
//! with an empty source list rather than propagated past this
//! boundary. Only initialization failures surface as errors.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::gateway::prompt::SYSTEM_INSTRUCTION;
use crate::gateway::{LlmGateway, LlmProvider};
use crate::index::VectorIndex;
use crate::ingestion::{load_documents, RecursiveChunker};
use crate::retrieval;
use crate::session::SessionStore;
use crate::types::{ApiCallStats, SessionStats};

/// Leading characters of each retrieved chunk returned as a source
/// snippet alongside the answer
const SNIPPET_CHARS: usize = 200;

/// The RAG engine: owns the index, the session store, and the gateway
pub struct RagEngine {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    gateway: Arc<dyn LlmProvider>,
    sessions: SessionStore,
    /// Built index; `None` until initialization succeeds. Readers
    /// clone the `Arc` and query without holding the lock.
    index: RwLock<Option<Arc<VectorIndex>>>,
    /// Serializes concurrent initialization attempts; queries stay
    /// lock-free on the `index` read path.
    build_lock: tokio::sync::Mutex<()>,
}

impl RagEngine {
    /// Create an engine. The knowledge base is not built yet; call
    /// `initialize_knowledge_base` (or let the first question trigger
    /// it at the server layer).
    pub fn new(config: RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let gateway: Arc<dyn LlmProvider> = Arc::new(LlmGateway::new(&config.llm));
        Self::with_gateway(config, embedder, gateway)
    }

    /// Create an engine with an explicit generation provider
    pub fn with_gateway(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        gateway: Arc<dyn LlmProvider>,
    ) -> Self {
        let sessions = SessionStore::new(&config.sessions);
        Self {
            config,
            embedder,
            gateway,
            sessions,
            index: RwLock::new(None),
            build_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Build the knowledge base: load documents, chunk, embed or
    /// reload the persisted index. Idempotent; a second call when
    /// already initialized is a no-op success. Concurrent callers
    /// block behind the first and then observe the built index.
    pub async fn initialize_knowledge_base(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let _guard = self.build_lock.lock().await;
        // Another caller may have finished while we waited.
        if self.is_initialized() {
            return Ok(());
        }

        self.embedder.health_check().await?;

        let documents = load_documents(&self.config.documents)?;
        let chunker = RecursiveChunker::new(
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        );
        let chunks = chunker.chunk_documents(&documents);
        tracing::info!("Documents split into {} chunks", chunks.len());

        let fingerprint = VectorIndex::fingerprint(&documents);
        let index = VectorIndex::build(
            chunks,
            &fingerprint,
            &self.config.index.storage_dir,
            &self.embedder,
        )
        .await?;

        *self.index.write() = Some(Arc::new(index));
        tracing::info!("Knowledge base initialized");
        Ok(())
    }

    /// Whether the knowledge base has been built
    pub fn is_initialized(&self) -> bool {
        self.index.read().is_some()
    }

    /// Answer a question for a session.
    ///
    /// Returns the answer text and up to k leading excerpts of the
    /// retrieved chunks. Failures come back as a user-safe apology
    /// with no sources; they are never raised past this boundary.
    pub async fn answer(&self, session_id: &str, question: &str) -> (String, Vec<String>) {
        let index = match self.index.read().clone() {
            Some(index) => index,
            None => return (Error::NotInitialized.user_message(), Vec::new()),
        };

        // Refresh last-activity before anything else so eviction
        // timing reflects true last use.
        self.sessions.touch(session_id);

        let retrieved = match retrieval::retrieve(question, &index, &self.embedder).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                tracing::error!("Retrieval failed for session {}: {}", session_id, e);
                return (e.user_message(), Vec::new());
            }
        };

        let context_documents: Vec<String> =
            retrieved.iter().map(|r| r.chunk.text.clone()).collect();

        let is_first_call = self.sessions.is_first_call(session_id);
        let instruction = if is_first_call {
            self.sessions
                .snapshot_system_instruction(session_id, SYSTEM_INSTRUCTION)
        } else {
            self.sessions
                .system_instruction(session_id, SYSTEM_INSTRUCTION)
        };
        let history = self.sessions.history(session_id);

        let answer = match self
            .gateway
            .generate(
                session_id,
                question,
                &context_documents,
                &history,
                &instruction,
                is_first_call,
            )
            .await
        {
            Ok(answer) => answer,
            Err(e) => return (e.user_message(), Vec::new()),
        };

        self.sessions
            .append_exchange(session_id, question, &answer, &instruction);

        let sources = retrieved
            .iter()
            .map(|r| r.chunk.excerpt(SNIPPET_CHARS))
            .collect();

        (answer, sources)
    }

    /// Caller signals "new chat": drop the session's state
    pub fn end_session(&self, session_id: &str) -> bool {
        self.sessions.evict(session_id)
    }

    /// LLM call counters
    pub fn api_stats(&self) -> ApiCallStats {
        self.gateway.stats()
    }

    /// Session store counters
    pub fn session_stats(&self) -> SessionStats {
        self.sessions.stats()
    }

    /// The session store (for the periodic sweep task)
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Engine configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}
