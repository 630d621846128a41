//! # Startup Anomaly Matchers
//!
//! Each [`Matcher`] detects one anomaly category over the full, immutable
//! event sequence. Matchers never see each other's output, so a run can
//! execute them concurrently in any order.
//!
//! ## Example
//!
//! ```
//! use rca_matchers::MatcherRegistry;
//! use rca_parser::parse_log;
//!
//! let registry = MatcherRegistry::with_defaults();
//! let parsed = parse_log("[10:00:00] [main/FATAL] [FMLLoader/]: Loading errors encountered, aborting mod loading");
//!
//! let abort = registry.get("loading_abort").unwrap();
//! let results = abort.detect(&parsed.events).unwrap();
//! assert_eq!(results.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod builtin;
mod error;
mod registry;

pub use error::MatcherError;
pub use registry::MatcherRegistry;

use rca_model::{CausalRole, Category, LogEvent, MatchResult};

/// Detector for one anomaly category
///
/// Implement this trait to add a category; register the implementation in a
/// [`MatcherRegistry`].
pub trait Matcher: Send + Sync + 'static {
    /// Unique name used for configuration and diagnostics
    fn name(&self) -> &'static str;

    /// Category tag of every result this matcher emits
    fn category(&self) -> Category;

    /// Detect the category in `events`
    ///
    /// Absence of the pattern is an empty result, not an error.
    ///
    /// # Errors
    /// Returns [`MatcherError`] when detection itself cannot complete
    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError>;
}

/// Check a matcher's results before they enter the chain
///
/// Every result must reference at least one event inside the log, and a
/// terminal result must be fatal.
///
/// # Errors
/// Returns [`MatcherError::EventOutOfRange`] for the first reference past the
/// end of the log and [`MatcherError::InvalidResult`] for a contract breach
pub fn validate_results(
    matcher: &str,
    results: &[MatchResult],
    len: usize,
) -> Result<(), MatcherError> {
    for result in results {
        if result.events().is_empty() {
            return Err(MatcherError::invalid_result(
                matcher,
                format!("'{}' result references no log event", result.category()),
            ));
        }
        if let Some(&seq) = result.events().iter().find(|&&seq| seq >= len) {
            return Err(MatcherError::EventOutOfRange {
                matcher: matcher.to_string(),
                seq,
                len,
            });
        }
        if result.role() == CausalRole::Terminal && !result.is_fatal() {
            return Err(MatcherError::invalid_result(
                matcher,
                format!("terminal '{}' result is {}, not fatal", result.category(), result.severity()),
            ));
        }
    }
    Ok(())
}
