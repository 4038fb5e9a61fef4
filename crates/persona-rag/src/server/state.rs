//! Application state for the chat server

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::RagConfig;
use crate::embeddings::{EmbeddingProvider, HttpEmbedder};
use crate::engine::RagEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RagEngine>,
}

impl AppState {
    /// Create application state with the HTTP embedding backend and
    /// start the periodic session sweep task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: RagConfig) -> Self {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbedder::new(&config.embeddings));
        Self::with_embedder(config, embedder)
    }

    /// Create application state with an explicit embedding provider
    pub fn with_embedder(config: RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let sweep_interval = Duration::from_secs(config.sessions.sweep_interval_secs);
        let engine = Arc::new(RagEngine::new(config, embedder));

        let state = Self { engine };
        state.spawn_session_sweeper(sweep_interval);
        state
    }

    /// Background task evicting sessions past the inactivity window
    fn spawn_session_sweeper(&self, interval: Duration) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so sweeps
            // start one full interval after boot.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = engine.sessions().evict_expired(Utc::now());
                if evicted > 0 {
                    tracing::info!("Session sweep evicted {} expired sessions", evicted);
                }
            }
        });
    }

    /// The RAG engine
    pub fn engine(&self) -> &Arc<RagEngine> {
        &self.engine
    }
}
