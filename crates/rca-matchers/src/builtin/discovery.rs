//! Mod discovery (scan phase start)

use super::contains_any;
use crate::{Matcher, MatcherError};
use once_cell::sync::Lazy;
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};
use regex::Regex;

const SCAN_PHRASES: &[&str] = &[
    "scanning for mod candidates",
    "scanning for mods",
    "discovering mods",
];

static FABRIC_LOADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Loading \d+ mods?:?").expect("fabric loading regex"));

/// Start of the loader's mod scan; the causal root of a loading chain
///
/// Only the first scan-start line is referenced, so the result never
/// overlaps the declarations that follow it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModDiscoveryMatcher;

impl ModDiscoveryMatcher {
    pub const NAME: &'static str = "mod_discovery";
    pub const CERTAINTY: f64 = 0.70;
}

impl Matcher for ModDiscoveryMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("mod_discovery")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let Some(scan) = events.iter().find(|e| {
            contains_any(e.message(), SCAN_PHRASES) || FABRIC_LOADING.is_match(e.message())
        }) else {
            return Ok(Vec::new());
        };

        let result = MatchResult::new(
            self.category(),
            Severity::Low,
            CausalRole::Root,
            "Mod discovery started",
        )
        .with_events([scan.seq()])
        .with_evidence(scan.message())
        .with_certainty(Self::CERTAINTY);

        Ok(vec![result])
    }
}
