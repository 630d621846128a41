//! Error types for the analysis engine
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - Chain reconstruction and scoring
//! - Whole-run failures (no evidence, deadline, oversized input)

use rca_matchers::MatcherError;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Pipeline stage that raised an error
///
/// Aggregation and assembly cannot fail and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Parse,
    Match,
    Chain,
    Score,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parse => "parse",
            Self::Match => "match",
            Self::Chain => "chain",
            Self::Score => "score",
        };
        f.write_str(s)
    }
}

/// Chain reconstruction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// Reconstructed chain violates strict log ordering
    #[error("node {position} starts at event {first} which does not follow event {previous_last}")]
    OutOfOrder {
        position: usize,
        first: usize,
        previous_last: usize,
    },
}

/// Confidence scoring errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    /// Confidence is undefined without any match result
    #[error("confidence undefined: no match results")]
    NoMatchResults,

    /// Weights outside [0, 1] or not summing to 1
    #[error("invalid scoring weights: {0}")]
    InvalidWeights(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::AnalysisConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Environment override could not be parsed
    #[error("invalid value for {var}: '{value}'")]
    InvalidOverride { var: String, value: String },

    /// Matcher selection names an unknown matcher
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    /// Scoring weights rejected
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Value out of range
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Rendering the effective config failed
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error raised inside a pipeline stage
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Worker task cancelled or lost
    #[error("task failed: {0}")]
    Task(String),
}

/// Errors that abort an analysis run; no report is emitted
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No matcher produced a result
    #[error("no evidence: none of {matchers} matcher(s) produced a result")]
    NoEvidence { matchers: usize },

    /// A stage failed
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// Whole-run deadline exceeded; the analysis is incomplete
    #[error("analysis exceeded deadline of {deadline_ms}ms")]
    DeadlineExceeded { deadline_ms: u64 },

    /// Input rejected before parsing
    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error reading an input file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Environment snapshot could not be loaded
    #[error("invalid environment snapshot {path}: {reason}")]
    Environment { path: PathBuf, reason: String },
}

impl AnalysisError {
    /// Create stage error
    pub fn stage(stage: Stage, source: impl Into<StageError>) -> Self {
        Self::Stage {
            stage,
            source: source.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create environment snapshot error
    pub fn environment(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Environment {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if the run failed for lack of evidence
    #[inline]
    #[must_use]
    pub fn is_no_evidence(&self) -> bool {
        matches!(self, Self::NoEvidence { .. })
    }

    /// Stage that raised the error, if any
    #[must_use]
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
