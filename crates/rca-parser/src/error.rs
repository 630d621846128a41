//! Error types for line parsing
//!
//! A [`LineParseError`] never fails a run: the parser recovers by emitting a
//! malformed [`rca_model::LogEvent`] and counting the line.

/// Errors while tokenizing a single line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineParseError {
    /// No header and not a continuation line
    #[error("line {seq}: no recognizable header")]
    NoHeader { seq: usize },

    /// Header matched but the timestamp did not parse
    #[error("line {seq}: invalid timestamp '{value}'")]
    InvalidTimestamp { seq: usize, value: String },

    /// Binary or control characters in the line
    #[error("line {seq}: contains control characters")]
    ControlCharacters { seq: usize },
}

impl LineParseError {
    /// Create invalid timestamp error
    pub fn invalid_timestamp(seq: usize, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            seq,
            value: value.into(),
        }
    }

    /// Sequence index of the offending line
    #[must_use]
    pub fn seq(&self) -> usize {
        match self {
            Self::NoHeader { seq }
            | Self::InvalidTimestamp { seq, .. }
            | Self::ControlCharacters { seq } => *seq,
        }
    }
}
