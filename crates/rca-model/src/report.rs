//! Final analysis report
//!
//! The report carries no wall-clock values: two runs over the same input
//! serialize to the same bytes.

use crate::chain::ErrorChain;
use crate::environment::Environment;
use crate::finding::Finding;
use crate::matching::Severity;
use serde::{Deserialize, Serialize};

/// Mod/library reference seen in the log
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryReference {
    pub mod_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Exception type observed in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Fully qualified type, e.g. `java.lang.NoSuchMethodError`
    pub exception_type: String,
    /// Message of the first occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub occurrence_count: usize,
    /// Sequence index of the first occurrence
    pub first_event: usize,
    /// Severity implied by the log level of the first occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Continuation lines following the first occurrence, newline-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// A matcher that failed in isolation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherFailure {
    pub matcher: String,
    pub error: String,
}

/// Provenance of the analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_source: Option<String>,
    pub log_size_bytes: usize,
    /// Blake3 hex digest of the raw input
    pub log_digest: String,
    pub line_count: usize,
    pub event_count: usize,
    pub malformed_lines: usize,
    pub matchers_run: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matcher_failures: Vec<MatcherFailure>,
}

/// Root-cause analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    #[serde(flatten)]
    pub chain: ErrorChain,
    pub findings: Vec<Finding>,
    pub root_cause_analysis: String,
    pub environment: Environment,
    /// Confidence in [0, 1]
    pub confidence_score: f64,
    pub metadata: ReportMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<ExceptionInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Report {
    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Single-line JSON rendering
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Finding for `category`, if any
    #[must_use]
    pub fn finding(&self, category: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.category.as_str() == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainNode;
    use crate::matching::{Category, Severity};
    use pretty_assertions::assert_eq;

    fn sample() -> Report {
        let node = ChainNode {
            position: 1,
            description: "Mod loading aborted".to_string(),
            severity: Severity::Fatal,
            category: Category::new("loading_abort"),
            first_event: 4,
            last_event: 4,
        };
        Report {
            summary: "startup failed".to_string(),
            chain: ErrorChain::new(vec![node], true, false),
            findings: vec![Finding {
                category: Category::new("loading_abort"),
                narrative: "Mod loading aborted".to_string(),
                severity: Severity::Fatal,
                evidence: vec!["aborting mod loading".to_string()],
                recommendations: Vec::new(),
                match_count: 1,
            }],
            root_cause_analysis: "unknown".to_string(),
            environment: Environment::new().with("forge", "47.2.0"),
            confidence_score: 0.5,
            metadata: ReportMetadata::default(),
            libraries: Vec::new(),
            exceptions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn required_top_level_fields_present() {
        let json = serde_json::to_value(sample()).unwrap();
        for field in [
            "summary",
            "error_chain",
            "findings",
            "root_cause_analysis",
            "environment",
            "confidence_score",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn json_roundtrip_preserves_report() {
        let report = sample();
        let text = report.to_json_pretty().unwrap();
        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn finding_lookup_by_category() {
        let report = sample();
        assert!(report.finding("loading_abort").is_some());
        assert!(report.finding("mod_conflict").is_none());
    }
}
