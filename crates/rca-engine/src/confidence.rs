//! Confidence scoring
//!
//! ```text
//! confidence = completeness × (w_evidence × density + w_certainty × certainty)
//! ```
//!
//! - `completeness`: 1 when the chain reaches a terminal node, else
//!   `incomplete_chain_factor`
//! - `density`: distinct evidence strings across all findings over
//!   `evidence_cap`, capped at 1
//! - `certainty`: per category, the noisy-OR of its results' certainties
//!   (`1 - Π(1 - cᵢ)`), averaged over categories
//!
//! Adding a result to an existing category never lowers either term, so the
//! score is non-decreasing in same-category evidence.

use crate::config::ScoringConfig;
use crate::error::ScoreError;
use indexmap::IndexMap;
use rca_model::{Category, ErrorChain, Finding, MatchResult};
use std::collections::BTreeSet;

/// Combines chain completeness, evidence density and certainty
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    weights: ScoringConfig,
}

impl ConfidenceScorer {
    /// Create scorer with validated weights
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidWeights`] if the weights are rejected
    pub fn new(weights: ScoringConfig) -> Result<Self, ScoreError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    #[inline]
    #[must_use]
    pub fn weights(&self) -> &ScoringConfig {
        &self.weights
    }

    /// Score one run, rounded to 4 decimals
    ///
    /// # Errors
    /// Returns [`ScoreError::NoMatchResults`] when `results` is empty
    pub fn score(
        &self,
        chain: &ErrorChain,
        findings: &[Finding],
        results: &[MatchResult],
    ) -> Result<f64, ScoreError> {
        if results.is_empty() {
            return Err(ScoreError::NoMatchResults);
        }

        let completeness = if chain.is_complete() {
            1.0
        } else {
            self.weights.incomplete_chain_factor
        };
        let density = evidence_density(findings, self.weights.evidence_cap);
        let certainty = mean_category_certainty(results);

        let raw = completeness
            * (self.weights.w_evidence * density + self.weights.w_certainty * certainty);
        let score = (raw.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0;

        tracing::debug!(completeness, density, certainty, score, "Scored analysis");
        Ok(score)
    }
}

#[allow(clippy::cast_precision_loss)]
fn evidence_density(findings: &[Finding], cap: usize) -> f64 {
    let distinct: BTreeSet<&str> = findings
        .iter()
        .flat_map(|f| f.evidence.iter().map(String::as_str))
        .collect();
    (distinct.len() as f64 / cap.max(1) as f64).min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn mean_category_certainty(results: &[MatchResult]) -> f64 {
    let mut doubt: IndexMap<&Category, f64> = IndexMap::new();
    for result in results {
        *doubt.entry(result.category()).or_insert(1.0) *= 1.0 - result.certainty();
    }
    if doubt.is_empty() {
        return 0.0;
    }
    doubt.values().map(|d| 1.0 - d).sum::<f64>() / doubt.len() as f64
}
