//! Matcher output types
//!
//! - [`Severity`]: low → fatal, totally ordered
//! - [`CausalRole`]: where a detection sits in the causal chain
//! - [`Category`]: anomaly category tag (e.g. `mod_conflict`)
//! - [`MatchResult`]: one detection with its evidence

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Severity of a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Fatal,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Fatal => "fatal",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown severity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: '{0}'")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "info" | "warning" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "fatal" | "critical" => Ok(Self::Fatal),
            other => Err(SeverityParseError(other.to_string())),
        }
    }
}

/// Position of a detection in the causal chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CausalRole {
    /// Can head a chain
    Root,
    /// Propagates the failure
    Intermediate,
    /// Final observable failure
    Terminal,
}

/// Anomaly category tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single detection produced by a matcher
///
/// Event references are kept sorted and unique, so [`MatchResult::span`] is
/// the first and last referenced sequence index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    category: Category,
    severity: Severity,
    role: CausalRole,
    summary: String,
    events: Vec<usize>,
    evidence: Vec<String>,
    hints: Vec<String>,
    certainty: f64,
    matcher_rank: usize,
}

impl MatchResult {
    /// Create a result with no evidence yet
    ///
    /// A terminal result is always fatal; any other severity passed with
    /// [`CausalRole::Terminal`] is raised to [`Severity::Fatal`].
    #[must_use]
    pub fn new(
        category: Category,
        severity: Severity,
        role: CausalRole,
        summary: impl Into<String>,
    ) -> Self {
        let severity = if role == CausalRole::Terminal {
            Severity::Fatal
        } else {
            severity
        };
        Self {
            category,
            severity,
            role,
            summary: summary.into(),
            events: Vec::new(),
            evidence: Vec::new(),
            hints: Vec::new(),
            certainty: 0.5,
            matcher_rank: 0,
        }
    }

    /// Add referenced event sequence indices
    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = usize>) -> Self {
        self.events.extend(events);
        self.events.sort_unstable();
        self.events.dedup();
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Matcher certainty, clamped to [0, 1]
    #[must_use]
    pub fn with_certainty(mut self, certainty: f64) -> Self {
        self.certainty = if certainty.is_finite() {
            certainty.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Declaration position of the producing matcher (tie-breaker)
    #[must_use]
    pub fn with_matcher_rank(mut self, rank: usize) -> Self {
        self.matcher_rank = rank;
        self
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[inline]
    #[must_use]
    pub fn role(&self) -> CausalRole {
        self.role
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Referenced sequence indices, ascending
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[usize] {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    #[inline]
    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    #[inline]
    #[must_use]
    pub fn certainty(&self) -> f64 {
        self.certainty
    }

    #[inline]
    #[must_use]
    pub fn matcher_rank(&self) -> usize {
        self.matcher_rank
    }

    /// Earliest referenced event
    #[inline]
    #[must_use]
    pub fn first_event(&self) -> Option<usize> {
        self.events.first().copied()
    }

    /// Latest referenced event
    #[inline]
    #[must_use]
    pub fn last_event(&self) -> Option<usize> {
        self.events.last().copied()
    }

    /// `(first, last)` referenced events, `None` when nothing is referenced
    #[inline]
    #[must_use]
    pub fn span(&self) -> Option<(usize, usize)> {
        Some((self.first_event()?, self.last_event()?))
    }

    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}
