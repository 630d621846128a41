//! Missing or unsupported mandatory dependencies

use super::contains_any;
use crate::{Matcher, MatcherError};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};
use regex::Regex;

const HEADER_PHRASES: &[&str] = &[
    "missing or unsupported mandatory dependencies",
    "missing mandatory dependencies",
];

static FORGE_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Mod ID: '(?P<id>[^']+)', Requested by: '(?P<by>[^']+)'(?:, Expected range: '(?P<range>[^']*)')?(?:, Actual version: '(?P<actual>[^']*)')?",
    )
    .expect("forge dependency regex")
});

static FABRIC_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?P<by>[\w\-]+)\)[^(]* requires .*?\((?P<id>[\w\-]+)\), which is missing")
        .expect("fabric dependency regex")
});

#[derive(Default)]
struct Missing {
    events: Vec<usize>,
    evidence: Vec<String>,
    requested_by: Vec<String>,
}

/// Mandatory dependency reported missing or out of range by the loader
///
/// One result per missing mod id. A bare "missing dependencies" header with
/// no itemized lines yields a single unattributed result.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingDependencyMatcher;

impl MissingDependencyMatcher {
    pub const NAME: &'static str = "missing_dependency";
    pub const CERTAINTY: f64 = 0.85;
}

impl Matcher for MissingDependencyMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("dependency_conflict")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let mut missing: IndexMap<String, Missing> = IndexMap::new();
        let mut headers = Vec::new();

        for event in events {
            let message = event.message();
            if contains_any(message, HEADER_PHRASES) {
                headers.push(event);
            }

            let requests = FORGE_REQUEST
                .captures_iter(message)
                .chain(FABRIC_REQUEST.captures_iter(message));
            for caps in requests {
                let entry = missing.entry(caps["id"].to_string()).or_default();
                if !entry.events.contains(&event.seq()) {
                    entry.events.push(event.seq());
                }
                let evidence = match (caps.name("range"), caps.name("actual")) {
                    (Some(range), Some(actual)) => format!(
                        "'{}' requires '{}' {} (found {})",
                        &caps["by"],
                        &caps["id"],
                        range.as_str(),
                        actual.as_str()
                    ),
                    _ => format!("'{}' requires '{}'", &caps["by"], &caps["id"]),
                };
                if !entry.evidence.contains(&evidence) {
                    entry.evidence.push(evidence);
                }
                entry.requested_by.push(caps["by"].to_string());
            }
        }

        if missing.is_empty() {
            let Some(first) = headers.first() else {
                return Ok(Vec::new());
            };
            let result = MatchResult::new(
                self.category(),
                Severity::High,
                CausalRole::Intermediate,
                "Mandatory dependencies missing",
            )
            .with_events([first.seq()])
            .with_evidence(first.message())
            .with_certainty(Self::CERTAINTY);
            return Ok(vec![result]);
        }

        let results = missing
            .into_iter()
            .map(|(mod_id, entry)| {
                let mut result = MatchResult::new(
                    self.category(),
                    Severity::High,
                    CausalRole::Intermediate,
                    format!("Missing mandatory dependency '{mod_id}'"),
                )
                .with_events(entry.events)
                .with_certainty(Self::CERTAINTY);
                for evidence in entry.evidence {
                    result = result.with_evidence(evidence);
                }
                result.with_hint(format!(
                    "Install a version of '{mod_id}' accepted by {}",
                    entry.requested_by.join(", ")
                ))
            })
            .collect();

        Ok(results)
    }
}
