//! Duplicate mod identifier detection

use crate::{Matcher, MatcherError};
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};
use rca_parser::{declarations, jar_files};
use regex::Regex;

static DUPLICATE_REPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Mod ID: '([^']+)' from mod files: (.+)").expect("duplicate report regex")
});

#[derive(Default)]
struct Claims {
    /// Declaring files with the line that declared them
    files: IndexMap<String, usize>,
    /// Loader's own duplicate reports
    reports: IndexSet<usize>,
}

/// Two or more mod files declaring the same mod id
///
/// Fires on either distinct declaration lines for one id or the loader's
/// explicit `Mod ID: 'x' from mod files: a, b` report. One fatal result is
/// emitted per duplicated id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateModMatcher;

impl DuplicateModMatcher {
    pub const NAME: &'static str = "duplicate_mod";
    pub const CERTAINTY: f64 = 0.95;
}

impl Matcher for DuplicateModMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("mod_conflict")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let mut claims: IndexMap<String, Claims> = IndexMap::new();

        for event in events {
            for (mod_id, file) in declarations(event) {
                claims
                    .entry(mod_id.to_lowercase())
                    .or_default()
                    .files
                    .entry(file)
                    .or_insert(event.seq());
            }

            for caps in DUPLICATE_REPORT.captures_iter(event.message()) {
                let claim = claims.entry(caps[1].to_lowercase()).or_default();
                claim.reports.insert(event.seq());
                for file in jar_files(&caps[2]) {
                    claim.files.entry(file.to_string()).or_insert(event.seq());
                }
            }
        }

        let results = claims
            .into_iter()
            .filter(|(_, claim)| claim.files.len() >= 2 || !claim.reports.is_empty())
            .map(|(mod_id, claim)| self.result(&mod_id, &claim, events))
            .collect();

        Ok(results)
    }
}

impl DuplicateModMatcher {
    fn result(&self, mod_id: &str, claim: &Claims, events: &[LogEvent]) -> MatchResult {
        let files: Vec<&str> = claim.files.keys().map(String::as_str).collect();

        let mut result = MatchResult::new(
            self.category(),
            Severity::Fatal,
            CausalRole::Intermediate,
            format!(
                "Duplicate mod id '{mod_id}' declared by {} files",
                files.len()
            ),
        )
        .with_events(claim.files.values().copied())
        .with_events(claim.reports.iter().copied())
        .with_certainty(Self::CERTAINTY);

        for file in &files {
            result = result.with_evidence(format!("{file} declares mod id '{mod_id}'"));
        }
        for &seq in &claim.reports {
            if let Some(event) = events.get(seq) {
                result = result.with_evidence(event.message());
            }
        }

        result.with_hint(format!(
            "Keep only one of the files declaring '{mod_id}': {}",
            files.join(", ")
        ))
    }
}
