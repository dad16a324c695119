//! Verification lookup pipeline.
//!
//! A free-text query runs through up to three stages, each returning
//! `Option<LookupResult>`, and the first hit short-circuits:
//!
//! 1. exact/structural — repository substring filter over name/batch
//! 2. disease — medicines whose symptom tags contain the query
//! 3. fuzzy — similarity-scored suggestions, ranked and truncated
//!
//! Exactly one classification comes back per query. Repository errors
//! propagate untouched; no stage retries and no partial results.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{repository, DatabaseError};
use crate::matching::{self, MatchField, MatchReason};
use crate::models::Medicine;

/// Default cap on fuzzy suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Error, Debug)]
pub enum LookupError {
    /// The caller must reject empty queries before invoking the
    /// pipeline; this guard keeps a blank query from scanning the
    /// whole registry anyway.
    #[error("Lookup query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A fuzzy candidate. Transient — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub medicine: Medicine,
    /// 0..=100.
    pub similarity: f64,
    pub match_reason: MatchReason,
    pub match_field: MatchField,
}

/// The single classification a query resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupResult {
    /// A name or batch number contained the query: the entry is in the
    /// registry and presumed authentic.
    #[serde(rename = "medicine")]
    ExactMedicine { medicine: Medicine },
    /// The query looked like a disease/symptom; these medicines treat it.
    #[serde(rename = "disease")]
    DiseaseMatches { query: String, medicines: Vec<Medicine> },
    /// Nothing matched structurally; closest registry entries by
    /// similarity, best first.
    #[serde(rename = "similar")]
    SimilarSuggestions { query: String, suggestions: Vec<SimilarityMatch> },
    #[serde(rename = "no_match")]
    NoMatch { query: String },
}

/// Staged matcher over the medicine repository. Stateless between
/// calls; safe to share and invoke in parallel.
#[derive(Debug, Clone, Copy)]
pub struct LookupPipeline {
    pub suggestion_limit: usize,
    pub fuzzy_threshold: f64,
}

impl Default for LookupPipeline {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            fuzzy_threshold: matching::DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

type Stage = fn(&LookupPipeline, &Connection, &str) -> Result<Option<LookupResult>, DatabaseError>;

impl LookupPipeline {
    /// Classify `query` against the registry. Expects a trimmed,
    /// lowercased, non-empty query; blank input fails fast.
    pub fn lookup(&self, conn: &Connection, query: &str) -> Result<LookupResult, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        // Stage order is the contract: exact preempts disease preempts
        // fuzzy. Kept as an explicit list so tests can rely on it.
        let stages: [Stage; 3] = [
            Self::stage_exact,
            Self::stage_disease,
            Self::stage_fuzzy,
        ];

        for stage in stages {
            if let Some(result) = stage(self, conn, query)? {
                return Ok(result);
            }
        }

        Ok(LookupResult::NoMatch { query: query.to_string() })
    }

    /// Stage A: repository-level substring filter over name and batch
    /// number. First match wins, in the repository's deterministic
    /// (name, id) order.
    fn stage_exact(
        &self,
        conn: &Connection,
        query: &str,
    ) -> Result<Option<LookupResult>, DatabaseError> {
        let mut matches = repository::get_medicines_matching(conn, query)?;
        if matches.is_empty() {
            return Ok(None);
        }
        tracing::debug!(query, hits = matches.len(), "exact stage matched");
        Ok(Some(LookupResult::ExactMedicine { medicine: matches.remove(0) }))
    }

    /// Stage B: medicines whose disease tags contain the query.
    fn stage_disease(
        &self,
        conn: &Connection,
        query: &str,
    ) -> Result<Option<LookupResult>, DatabaseError> {
        let query_lower = query.to_lowercase();
        let medicines: Vec<Medicine> = repository::get_all_medicines(conn)?
            .into_iter()
            .filter(|med| {
                med.diseases
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&query_lower))
            })
            .collect();

        if medicines.is_empty() {
            return Ok(None);
        }
        tracing::debug!(query, hits = medicines.len(), "disease stage matched");
        Ok(Some(LookupResult::DiseaseMatches {
            query: query.to_string(),
            medicines,
        }))
    }

    /// Stage C: similarity-score every entry's name, then its batch
    /// number (skipped when the name already matched, so each medicine
    /// appears at most once). Stable-sorted by similarity descending,
    /// truncated to the limit.
    fn stage_fuzzy(
        &self,
        conn: &Connection,
        query: &str,
    ) -> Result<Option<LookupResult>, DatabaseError> {
        let mut suggestions: Vec<SimilarityMatch> = Vec::new();

        for medicine in repository::get_all_medicines(conn)? {
            if let Some(outcome) =
                matching::score_with_threshold(query, &medicine.name, self.fuzzy_threshold)
            {
                suggestions.push(SimilarityMatch {
                    medicine,
                    similarity: outcome.similarity,
                    match_reason: outcome.reason,
                    match_field: MatchField::Name,
                });
                continue;
            }

            if let Some(outcome) =
                matching::score_with_threshold(query, &medicine.batch_number, self.fuzzy_threshold)
            {
                suggestions.push(SimilarityMatch {
                    medicine,
                    similarity: outcome.similarity,
                    match_reason: outcome.reason,
                    match_field: MatchField::BatchNumber,
                });
            }
        }

        if suggestions.is_empty() {
            return Ok(None);
        }

        // Vec::sort_by is stable: equal scores keep encounter order.
        suggestions.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        suggestions.truncate(self.suggestion_limit);

        tracing::debug!(query, hits = suggestions.len(), "fuzzy stage matched");
        Ok(Some(LookupResult::SimilarSuggestions {
            query: query.to_string(),
            suggestions,
        }))
    }
}
