//! Finding aggregation
//!
//! One [`Finding`] per category. Evidence and hints are merged in first-seen
//! order with duplicates dropped; "first seen" follows log position, so the
//! output does not depend on the order matchers finished in.

use indexmap::{IndexMap, IndexSet};
use rca_model::{Category, Finding, MatchResult, Severity};

struct Group<'a> {
    severity: Severity,
    first_event: usize,
    rank: usize,
    summaries: IndexSet<&'a str>,
    evidence: IndexSet<&'a str>,
    hints: IndexSet<&'a str>,
    count: usize,
}

/// Groups match results into findings
#[derive(Debug, Clone, Copy, Default)]
pub struct FindingAggregator;

impl FindingAggregator {
    /// Create aggregator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Aggregate results, ordered by severity (highest first) then earliest
    /// log position
    #[must_use]
    pub fn aggregate(&self, results: &[MatchResult]) -> Vec<Finding> {
        let mut ordered: Vec<&MatchResult> = results.iter().collect();
        ordered.sort_by_key(|r| (r.first_event().unwrap_or(usize::MAX), r.matcher_rank()));

        let mut groups: IndexMap<&Category, Group<'_>> = IndexMap::new();
        for result in ordered {
            let first_event = result.first_event().unwrap_or(usize::MAX);
            let group = groups.entry(result.category()).or_insert_with(|| Group {
                severity: result.severity(),
                first_event,
                rank: result.matcher_rank(),
                summaries: IndexSet::new(),
                evidence: IndexSet::new(),
                hints: IndexSet::new(),
                count: 0,
            });

            group.severity = group.severity.max(result.severity());
            group.first_event = group.first_event.min(first_event);
            group.summaries.insert(result.summary());
            group.evidence.extend(result.evidence().iter().map(String::as_str));
            group.hints.extend(result.hints().iter().map(String::as_str));
            group.count += 1;
        }

        let mut findings: Vec<(usize, usize, Finding)> = groups
            .into_iter()
            .map(|(category, group)| {
                let finding = Finding {
                    category: category.clone(),
                    narrative: narrative(&group),
                    severity: group.severity,
                    evidence: group.evidence.iter().map(|s| (*s).to_string()).collect(),
                    recommendations: group.hints.iter().map(|s| (*s).to_string()).collect(),
                    match_count: group.count,
                };
                (group.first_event, group.rank, finding)
            })
            .collect();

        findings.sort_by(|(a_pos, a_rank, a), (b_pos, b_rank, b)| {
            b.severity
                .cmp(&a.severity)
                .then(a_pos.cmp(b_pos))
                .then(a_rank.cmp(b_rank))
        });

        tracing::debug!(findings = findings.len(), "Aggregated findings");
        findings.into_iter().map(|(_, _, f)| f).collect()
    }
}

fn narrative(group: &Group<'_>) -> String {
    let summaries: Vec<&str> = group.summaries.iter().copied().collect();
    match group.count {
        1 => summaries.join("; "),
        n => format!("{} ({n} detections)", summaries.join("; ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rca_model::CausalRole;
    use rca_test_utils::result;

    #[test]
    fn one_finding_per_category() {
        let results = vec![
            result("missing_metadata", Severity::Low, CausalRole::Intermediate, &[3]),
            result("missing_metadata", Severity::Low, CausalRole::Intermediate, &[1]),
            result("mod_conflict", Severity::Fatal, CausalRole::Intermediate, &[2]),
        ];
        let findings = FindingAggregator::new().aggregate(&results);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].category.as_str(), "mod_conflict");
        assert_eq!(findings[1].match_count, 2);
        assert_eq!(
            findings[1].evidence,
            vec![
                "missing_metadata at line 1".to_string(),
                "missing_metadata at line 3".to_string()
            ]
        );
        assert_eq!(findings[1].narrative, "missing_metadata detected (2 detections)");
    }

    #[test]
    fn evidence_and_hints_deduplicated() {
        let a = result("exception", Severity::High, CausalRole::Intermediate, &[1])
            .with_evidence("shared")
            .with_hint("check logs");
        let b = result("exception", Severity::High, CausalRole::Intermediate, &[2])
            .with_evidence("shared")
            .with_hint("check logs");
        let findings = FindingAggregator::new().aggregate(&[a, b]);

        assert_eq!(findings[0].evidence.len(), 3);
        assert_eq!(findings[0].recommendations, vec!["check logs".to_string()]);
    }

    #[test]
    fn severity_then_position_order() {
        let results = vec![
            result("late_high", Severity::High, CausalRole::Intermediate, &[9]),
            result("low", Severity::Low, CausalRole::Root, &[0]),
            result("early_high", Severity::High, CausalRole::Intermediate, &[4]),
        ];
        let findings = FindingAggregator::new().aggregate(&results);
        let order: Vec<&str> = findings.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(order, vec!["early_high", "late_high", "low"]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let results = vec![
            result("a", Severity::High, CausalRole::Intermediate, &[1]),
            result("b", Severity::High, CausalRole::Intermediate, &[2]),
            result("a", Severity::Medium, CausalRole::Intermediate, &[5]),
        ];
        let mut reversed = results.clone();
        reversed.reverse();

        let aggregator = FindingAggregator::new();
        assert_eq!(aggregator.aggregate(&results), aggregator.aggregate(&reversed));
    }
}
