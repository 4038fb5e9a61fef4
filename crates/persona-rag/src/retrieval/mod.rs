//! Retrieval routing: company, timeline, or generic similarity search
//!
//! Pure semantic similarity confuses similarly-worded company
//! experiences, so questions naming a known company are answered with
//! a hand-authored expanded query biased toward that company's chunk
//! cluster. Timeline questions get a broader search and defer company
//! disambiguation to the system instruction's authoritative timeline.
//! Everything else takes the generic path. The alias list is closed
//! and hand-maintained; adding an employer means adding a row here.

use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::index::{ScoredChunk, VectorIndex};

/// Results returned for company-targeted and generic searches
pub const COMPANY_K: usize = 4;

/// Results returned for timeline searches (broader, the model picks)
pub const TIMELINE_K: usize = 6;

/// Ordered `(alias, expanded query)` table for company dispatch.
///
/// Evaluated top to bottom; the first alias found anywhere in the
/// lowercased question wins, so more specific aliases must precede
/// their prefixes ("stealth startup" before "startup"). This order is
/// part of the retrieval contract.
pub const COMPANY_ALIASES: &[(&str, &str)] = &[
    (
        "stealth startup",
        "Stealth Startup AI Product Lead travel concierge",
    ),
    (
        "startup",
        "Stealth Startup AI Product Lead travel concierge",
    ),
    (
        "meta",
        "Meta Technical Program Manager Global Security GPS anomaly detection",
    ),
    (
        "facebook",
        "Meta Technical Program Manager Global Security GPS anomaly detection",
    ),
    (
        "copart",
        "Copart Technical Product Manager Generative AI platform",
    ),
    ("scale ai", "Scale AI Product Manager"),
    (
        "fidelity",
        "Fidelity International Limited Global Infrastructure Automation",
    ),
];

/// Temporal keywords triggering the broader timeline search
pub const TIMELINE_KEYWORDS: &[&str] = &[
    "most recent",
    "last company",
    "current",
    "latest",
    "recent experience",
    "previous",
    "earliest",
    "first",
];

/// How a question will be retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalPlan {
    /// Question names a known company: search its expanded query
    Company {
        /// Hand-authored query biased toward the company's chunks
        query: &'static str,
    },
    /// Question asks about ordering in time: broader raw-question search
    Timeline,
    /// Generic raw-question search
    Generic,
}

impl RetrievalPlan {
    /// Number of chunks this plan retrieves
    pub fn k(&self) -> usize {
        match self {
            Self::Timeline => TIMELINE_K,
            _ => COMPANY_K,
        }
    }
}

/// Classify a question into a retrieval plan.
///
/// Priority is strict: company match, then timeline match, then
/// generic.
pub fn classify(question: &str) -> RetrievalPlan {
    let lowered = question.to_lowercase();

    for (alias, query) in COMPANY_ALIASES {
        if lowered.contains(alias) {
            return RetrievalPlan::Company { query };
        }
    }

    if TIMELINE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return RetrievalPlan::Timeline;
    }

    RetrievalPlan::Generic
}

/// Classify the question and run the corresponding search against the
/// index. Returns the retrieved chunks in rank order.
pub async fn retrieve(
    question: &str,
    index: &VectorIndex,
    embedder: &Arc<dyn EmbeddingProvider>,
) -> Result<Vec<ScoredChunk>> {
    let plan = classify(question);

    match &plan {
        RetrievalPlan::Company { query } => {
            tracing::debug!("Company retrieval via expanded query: \"{}\"", query);
            index.retrieve(query, COMPANY_K, embedder).await
        }
        RetrievalPlan::Timeline => {
            tracing::debug!("Timeline retrieval (k={})", TIMELINE_K);
            index.retrieve(question, TIMELINE_K, embedder).await
        }
        RetrievalPlan::Generic => index.retrieve(question, COMPANY_K, embedder).await,
    }
}
