//! Analysis configuration
//!
//! Loaded from TOML, then overridden from the process environment:
//!
//! | variable            | field           |
//! |---------------------|-----------------|
//! | `RCA_DEADLINE_MS`   | `deadline_ms`   |
//! | `RCA_MAX_LOG_BYTES` | `max_log_bytes` |
//! | `RCA_MATCHERS`      | `matchers` (comma list) |

use crate::error::{ConfigError, ScoreError};
use rca_matchers::MatcherRegistry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Weights of the confidence formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight of evidence density
    pub w_evidence: f64,
    /// Weight of matcher certainty
    pub w_certainty: f64,
    /// Distinct evidence strings at which density saturates
    pub evidence_cap: usize,
    /// Completeness factor applied when no terminal node is reached
    pub incomplete_chain_factor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            w_evidence: 0.4,
            w_certainty: 0.6,
            evidence_cap: 6,
            incomplete_chain_factor: 0.6,
        }
    }
}

impl ScoringConfig {
    /// Check weights are in [0, 1] and sum to 1
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidWeights`] describing the first violation
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in [
            ("w_evidence", self.w_evidence),
            ("w_certainty", self.w_certainty),
            ("incomplete_chain_factor", self.incomplete_chain_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoreError::InvalidWeights(format!(
                    "{name} = {value} is outside [0, 1]"
                )));
            }
        }
        let sum = self.w_evidence + self.w_certainty;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ScoreError::InvalidWeights(format!(
                "w_evidence + w_certainty = {sum}, expected 1"
            )));
        }
        if self.evidence_cap == 0 {
            return Err(ScoreError::InvalidWeights(
                "evidence_cap must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Deadline for the whole run in milliseconds
    pub deadline_ms: u64,
    /// Inputs larger than this are rejected before parsing
    pub max_log_bytes: usize,
    /// Matchers to run; empty runs every built-in matcher
    pub matchers: Vec<String>,
    /// Confidence weights
    pub scoring: ScoringConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 5_000,
            max_log_bytes: 10 * 1024 * 1024,
            matchers: Vec::new(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With run deadline
    #[inline]
    #[must_use]
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = deadline_ms;
        self
    }

    /// With input size limit
    #[inline]
    #[must_use]
    pub fn with_max_log_bytes(mut self, max: usize) -> Self {
        self.max_log_bytes = max;
        self
    }

    /// With matcher selection
    #[must_use]
    pub fn with_matchers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matchers = names.into_iter().map(Into::into).collect();
        self
    }

    /// With scoring weights
    #[inline]
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Deadline as a duration
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `RCA_*` overrides from the process environment
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] for unparseable values
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply `RCA_*` overrides from `lookup`
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] for unparseable values
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RCA_DEADLINE_MS") {
            self.deadline_ms = parse_override("RCA_DEADLINE_MS", &value)?;
        }
        if let Some(value) = lookup("RCA_MAX_LOG_BYTES") {
            self.max_log_bytes = parse_override("RCA_MAX_LOG_BYTES", &value)?;
        }
        if let Some(value) = lookup("RCA_MATCHERS") {
            self.matchers = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(self)
    }

    /// Validate limits, weights and matcher names
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_log_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_log_bytes must be positive".to_string(),
            ));
        }
        self.scoring.validate()?;
        MatcherRegistry::select(&self.matchers)?;
        Ok(())
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Serialize`] if rendering fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            var: var.to_string(),
            value: value.to_string(),
        })
}
