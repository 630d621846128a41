//! Mod files lacking a descriptor

use super::contains_any;
use crate::{Matcher, MatcherError};
use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};

const DESCRIPTORS: &[&str] = &["mods.toml", "fabric.mod.json", "quilt.mod.json", "mcmod.info"];

const ABSENCE: &[&str] = &[
    "missing",
    "not found",
    "unable to find",
    "could not find",
    "does not contain",
    "no such",
];

const INVALID_FILE: &[&str] = &["not a valid mod file", "invalid mod file"];

/// Entry lacking a required descriptor file; one result per offending line
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingMetadataMatcher;

impl MissingMetadataMatcher {
    pub const NAME: &'static str = "missing_metadata";
    pub const CERTAINTY: f64 = 0.50;
}

impl Matcher for MissingMetadataMatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> Category {
        Category::new("missing_metadata")
    }

    fn detect(&self, events: &[LogEvent]) -> Result<Vec<MatchResult>, MatcherError> {
        let results = events
            .iter()
            .filter(|e| {
                let message = e.message();
                contains_any(message, INVALID_FILE)
                    || (contains_any(message, DESCRIPTORS) && contains_any(message, ABSENCE))
            })
            .map(|event| {
                let summary = match event.fields().mod_file.as_deref() {
                    Some(file) => format!("Mod file {file} has no valid descriptor"),
                    None => "Mod descriptor missing".to_string(),
                };
                MatchResult::new(self.category(), Severity::Low, CausalRole::Intermediate, summary)
                    .with_events([event.seq()])
                    .with_evidence(event.message())
                    .with_certainty(Self::CERTAINTY)
                    .with_hint("Check that the file is a mod built for this loader")
            })
            .collect();

        Ok(results)
    }
}
