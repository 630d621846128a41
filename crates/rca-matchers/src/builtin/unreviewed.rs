//! Early aborts with no reported cause

use super::{contains_any, DuplicateModMatcher, MissingDependencyMatcher, ABORT_MARKERS, COMPLETE_MARKERS};
use crate::{Matcher, MatcherError};
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};

/// Abort before loading completed with no cause ahead of it
///
/// A cause is an ERROR/FATAL line, a duplicated mod id or a missing
/// dependency, whatever level those were logged at. Without one nothing in
/// the log explains the failure, which points at a combination of mods that
/// has not been checked for compatibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreviewedDependencyMatcher;

impl UnreviewedDependencyMatcher {
    pub const NAME: &'static str = "unreviewed_dependency";
    pub const CERTAINTY: f64 = 0.40;
}

impl Matcher for UnreviewedDependencyMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("unreviewed_dependency")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let Some(abort_at) = events
            .iter()
            .position(|e| contains_any(e.message(), ABORT_MARKERS))
        else {
            return Ok(Vec::new());
        };

        let before = &events[..abort_at];
        if before.iter().any(|e| contains_any(e.message(), COMPLETE_MARKERS)) {
            return Ok(Vec::new());
        }
        if before.iter().any(LogEvent::is_error) {
            return Ok(Vec::new());
        }
        if !DuplicateModMatcher.detect(before)?.is_empty()
            || !MissingDependencyMatcher.detect(before)?.is_empty()
        {
            return Ok(Vec::new());
        }

        let abort = &events[abort_at];
        let stage = before
            .iter()
            .rev()
            .find_map(LogEvent::stage)
            .unwrap_or("startup");

        let result = MatchResult::new(
            self.category(),
            Severity::Medium,
            CausalRole::Intermediate,
            format!("Startup aborted during {stage} with no reported cause"),
        )
        .with_events([abort.seq()])
        .with_evidence(format!("abort before loading completed: {}", abort.message()))
        .with_certainty(Self::CERTAINTY)
        .with_hint("Review recently added mods for compatibility with each other and the loader");

        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rca_parser::parse_log;

    #[test]
    fn silent_early_abort() {
        let parsed = parse_log(
            "[10:00:00] [main/INFO] [ModDiscoverer/SCAN]: Scanning for mod candidates\n\
             [10:00:01] [main/FATAL] [FMLLoader/]: Loading errors encountered, aborting mod loading\n",
        );
        let results = UnreviewedDependencyMatcher.detect(&parsed.events).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].events(), &[1]);
        assert_eq!(results[0].summary(), "Startup aborted during SCAN with no reported cause");
    }

    #[test]
    fn preceding_error_explains_abort() {
        let parsed = parse_log(
            "[10:00:00] [main/ERROR]: Found duplicate mods\n\
             [10:00:01] [main/FATAL]: aborting mod loading\n",
        );
        assert!(UnreviewedDependencyMatcher.detect(&parsed.events).unwrap().is_empty());
    }

    #[test]
    fn abort_after_completion_ignored() {
        let parsed = parse_log(
            "[10:00:00] [main/INFO]: Mod loading complete\n\
             [10:00:01] [main/FATAL]: Game crashed\n",
        );
        assert!(UnreviewedDependencyMatcher.detect(&parsed.events).unwrap().is_empty());
    }

    #[test]
    fn duplicate_declarations_explain_abort() {
        let parsed = parse_log(
            "[10:00:00] [main/INFO] [ModDiscoverer/SCAN]: Scanning for mod candidates\n\
             [10:00:01] [main/DEBUG] [ModFile/LOADING]: Found valid mod file rubidium-0.7.1.jar with {rubidium} mods - versions {0.7.1}\n\
             [10:00:02] [main/DEBUG] [ModFile/LOADING]: Found valid mod file embeddium-0.3.18.jar with {rubidium} mods - versions {0.3.18}\n\
             [10:00:03] [main/FATAL] [FMLLoader/]: Loading errors encountered, aborting mod loading\n",
        );
        assert!(UnreviewedDependencyMatcher.detect(&parsed.events).unwrap().is_empty());
    }
}
