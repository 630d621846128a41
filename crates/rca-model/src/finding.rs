//! Per-category findings

use crate::matching::{Category, Severity};
use serde::{Deserialize, Serialize};

/// Categorized, evidence-backed observation surfaced in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub narrative: String,
    /// Highest severity among the merged results
    pub severity: Severity,
    /// Distinct evidence strings, first-seen order
    pub evidence: Vec<String>,
    /// Distinct remediation hints, first-seen order
    pub recommendations: Vec<String>,
    /// Number of match results merged into this finding
    pub match_count: usize,
}
