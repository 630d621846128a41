//! Java exceptions thrown during startup

use super::{contains_any, ABORT_MARKERS};
use crate::{Matcher, MatcherError};
use indexmap::IndexMap;
use rca_model::{CausalRole, Category, LogEvent, LogLevel, MatchResult, Severity};
use rca_parser::find_exception;

struct Occurrences {
    message: Option<String>,
    events: Vec<usize>,
}

/// Exception types with occurrence counts; one result per type
///
/// Lines logged below WARN are ignored: loaders print recoverable
/// exceptions at DEBUG while probing optional integrations.
///
/// Crash reports repeat the trace after the abort. The result spans only
/// the occurrences ahead of the first abort marker, unless the type never
/// appears before it; the count still covers every occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionMatcher;

impl ExceptionMatcher {
    pub const NAME: &'static str = "exception";
    pub const CERTAINTY: f64 = 0.60;
}

impl Matcher for ExceptionMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("exception")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let mut seen: IndexMap<String, Occurrences> = IndexMap::new();
        let abort_at = events
            .iter()
            .find(|e| contains_any(e.message(), ABORT_MARKERS))
            .map(LogEvent::seq);

        for event in events {
            if event.level().is_some_and(|level| level < LogLevel::Warn) {
                continue;
            }
            let Some((ty, message)) = find_exception(event.message()) else {
                continue;
            };
            seen.entry(ty.to_string())
                .or_insert_with(|| Occurrences {
                    message: message.map(str::to_string),
                    events: Vec::new(),
                })
                .events
                .push(event.seq());
        }

        let results = seen
            .into_iter()
            .map(|(ty, occurrences)| {
                let count = occurrences.events.len();
                let span = before_abort(occurrences.events, abort_at);
                let evidence = match &occurrences.message {
                    Some(message) => format!("{ty}: {message}"),
                    None => ty.clone(),
                };
                MatchResult::new(
                    self.category(),
                    Severity::High,
                    CausalRole::Intermediate,
                    format!("{ty} thrown ({count} occurrence{})", if count == 1 { "" } else { "s" }),
                )
                .with_events(span)
                .with_evidence(evidence)
                .with_certainty(Self::CERTAINTY)
                .with_hint(format!("Inspect the stack trace of {ty} for the mod that raised it"))
            })
            .collect();

        Ok(results)
    }
}

fn before_abort(occurrences: Vec<usize>, abort_at: Option<usize>) -> Vec<usize> {
    let Some(abort_at) = abort_at else {
        return occurrences;
    };
    let early: Vec<usize> = occurrences.iter().copied().filter(|&seq| seq < abort_at).collect();
    if early.is_empty() {
        occurrences
    } else {
        early
    }
}
