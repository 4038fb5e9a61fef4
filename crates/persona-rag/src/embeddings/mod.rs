//! Embedding provider trait and the HTTP embedding backend
//!
//! Embedding is delegated to a fixed sentence-embedding model served
//! over HTTP (Ollama-style API). `health_check` is the explicit
//! capability probe: if the backend is unreachable, initialization
//! fails with `EmbeddingUnavailable` instead of silently degrading.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Check the backend is loaded and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// HTTP embedder talking to an Ollama-style embeddings endpoint
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create a new HTTP embedder from config
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::EmbeddingUnavailable(format!(
                "Embedding backend returned HTTP {}",
                status
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            Error::EmbeddingUnavailable(format!("Invalid embedding response: {}", e))
        })?;

        if body.embedding.is_empty() {
            return Err(Error::EmbeddingUnavailable(
                "Embedding backend returned an empty vector".to_string(),
            ));
        }

        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => Err(Error::EmbeddingUnavailable(format!(
                "Embedding backend returned HTTP {}",
                resp.status()
            ))),
            Err(e) => Err(Error::EmbeddingUnavailable(format!(
                "Embedding backend unreachable: {}",
                e
            ))),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.2, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_backend() {
        // Reserved TLD guarantees resolution failure without touching
        // a real endpoint.
        let config = EmbeddingConfig {
            base_url: "http://persona-rag.invalid".to_string(),
            timeout_secs: 1,
            ..EmbeddingConfig::default()
        };
        let embedder = HttpEmbedder::new(&config);
        let result = embedder.health_check().await;
        assert!(matches!(result, Err(Error::EmbeddingUnavailable(_))));
    }
}
