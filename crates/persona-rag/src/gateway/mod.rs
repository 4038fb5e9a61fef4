//! LLM gateway: builds payloads, issues the HTTPS call, tracks stats
//!
//! One outbound call per `generate` invocation, single attempt, 30s
//! timeout. The credential comes from the environment; without it
//! every call fails fast with `MissingCredential` and no network
//! attempt is made.

pub mod payload;
pub mod prompt;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::{LlmConfig, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::types::{ApiCallStats, ConversationTurn};

use payload::{build_continuation, build_first_call, GenerateRequest, GenerateResponse};

/// Trait for generating grounded answers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate an answer for a session turn.
    ///
    /// `is_first_call` selects the payload shape: system instruction
    /// plus one grounded user turn, or the frozen instruction plus the
    /// replayed history.
    async fn generate(
        &self,
        session_id: &str,
        question: &str,
        context_documents: &[String],
        history: &[ConversationTurn],
        system_instruction: &str,
        is_first_call: bool,
    ) -> Result<String>;

    /// Snapshot of the call counters
    fn stats(&self) -> ApiCallStats;
}

/// Gemini-style generation client with process-wide call counters
pub struct LlmGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    total_calls: AtomicU64,
    successful_calls: AtomicU64,
    failed_calls: AtomicU64,
}

impl LlmGateway {
    /// Create a gateway from config, reading the credential from
    /// `GEMINI_API_KEY`.
    pub fn new(config: &LlmConfig) -> Self {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; generation calls will fail fast",
                API_KEY_ENV
            );
        }
        Self::from_parts(config.resolved_url(), api_key, config.timeout_secs)
    }

    /// Create a gateway with explicit parts (used by tests)
    pub fn from_parts(url: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            url,
            api_key,
            total_calls: AtomicU64::new(0),
            successful_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
        }
    }

    /// Whether a credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single HTTP attempt: send, check status, parse, extract text
    async fn issue(&self, api_key: &str, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("X-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Network(format!(
                "LLM endpoint returned HTTP {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("Unparseable response body: {}", e)))?;

        body.into_text()
            .ok_or_else(|| Error::Protocol("No candidates in response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for LlmGateway {
    /// No retry; failures surface immediately.
    async fn generate(
        &self,
        session_id: &str,
        question: &str,
        context_documents: &[String],
        history: &[ConversationTurn],
        system_instruction: &str,
        is_first_call: bool,
    ) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingCredential)?;

        let request = if is_first_call {
            build_first_call(system_instruction, question, context_documents)
        } else {
            build_continuation(system_instruction, history, question, context_documents)
        };

        let call_number = self.total_calls.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            "LLM call #{} for session {} ({})",
            call_number,
            session_id,
            if is_first_call { "first" } else { "continuation" }
        );

        match self.issue(api_key, &request).await {
            Ok(text) => {
                self.successful_calls.fetch_add(1, Ordering::SeqCst);
                Ok(text)
            }
            Err(e) => {
                self.failed_calls.fetch_add(1, Ordering::SeqCst);
                tracing::error!("LLM call failed: {}", e);
                Err(e)
            }
        }
    }

    fn stats(&self) -> ApiCallStats {
        ApiCallStats {
            total_calls: self.total_calls.load(Ordering::SeqCst),
            successful_calls: self.successful_calls.load(Ordering::SeqCst),
            failed_calls: self.failed_calls.load(Ordering::SeqCst),
        }
    }
}
