//! Terminal startup failure markers

use super::{events_with, ABORT_MARKERS};
use crate::{Matcher, MatcherError};
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};

/// Loader abort, crash report or fatal main-thread exception
///
/// All markers are folded into one terminal result; its span starts at the
/// first marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadingAbortMatcher;

impl LoadingAbortMatcher {
    pub const NAME: &'static str = "loading_abort";
    pub const CERTAINTY: f64 = 0.90;
}

impl Matcher for LoadingAbortMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("loading_abort")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let markers: Vec<&LogEvent> = events_with(events, ABORT_MARKERS).collect();
        if markers.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = MatchResult::new(
            self.category(),
            Severity::Fatal,
            CausalRole::Terminal,
            "Mod loading aborted",
        )
        .with_events(markers.iter().map(|e| e.seq()))
        .with_certainty(Self::CERTAINTY);

        for marker in markers {
            result = result.with_evidence(marker.message());
        }

        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rca_parser::parse_log;

    #[test]
    fn markers_fold_into_one_terminal() {
        let parsed = parse_log(
            "[10:00:00] [main/FATAL] [FMLLoader/]: Loading errors encountered, aborting mod loading\n\
             [10:00:01] [main/INFO]: cleanup\n\
             [10:00:02] [main/FATAL]: Crash report saved to ./crash-reports/crash.txt\n",
        );
        let results = LoadingAbortMatcher.detect(&parsed.events).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].role(), CausalRole::Terminal);
        assert!(results[0].is_fatal());
        assert_eq!(results[0].events(), &[0, 2]);
        assert_eq!(results[0].evidence().len(), 2);
    }

    #[test]
    fn absent_pattern_is_empty() {
        let parsed = parse_log("[10:00:00] [main/INFO]: Mod loading complete\n");
        assert!(LoadingAbortMatcher.detect(&parsed.events).unwrap().is_empty());
    }
}
