//! Error types for matchers and the matcher registry

/// Errors raised by a matcher or while building a registry
///
/// A detection failure is isolated to the matcher that raised it; the other
/// matchers of the run are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// Matcher could not complete detection
    #[error("matcher '{matcher}' failed: {reason}")]
    Detection { matcher: String, reason: String },

    /// Matcher produced a result it cannot reference back to the log
    #[error("matcher '{matcher}' referenced event {seq} outside a log of {len} events")]
    EventOutOfRange {
        matcher: String,
        seq: usize,
        len: usize,
    },

    /// Result breaks the match result contract
    #[error("matcher '{matcher}' produced an invalid result: {reason}")]
    InvalidResult { matcher: String, reason: String },

    /// Selection named a matcher that is not registered
    #[error("unknown matcher: '{name}' (available: {available})")]
    UnknownMatcher { name: String, available: String },

    /// Two matchers registered under the same name
    #[error("matcher already registered: '{0}'")]
    DuplicateName(String),
}

impl MatcherError {
    /// Create detection error for matcher
    pub fn detection(matcher: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Detection {
            matcher: matcher.into(),
            reason: reason.into(),
        }
    }

    /// Create invalid result error for matcher
    pub fn invalid_result(matcher: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResult {
            matcher: matcher.into(),
            reason: reason.into(),
        }
    }

    /// Create unknown matcher error listing the available names
    pub fn unknown(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownMatcher {
            name: name.into(),
            available: available.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MatcherError::detection("duplicate_mod", "bad input");
        assert_eq!(err.to_string(), "matcher 'duplicate_mod' failed: bad input");
    }

    #[test]
    fn unknown_lists_available() {
        let err = MatcherError::unknown("nope", &["a", "b"]);
        assert_eq!(err.to_string(), "unknown matcher: 'nope' (available: a, b)");
    }
}
