//! Error-chain reconstruction
//!
//! Log position is the only clock. Results are ordered by their earliest
//! referenced event, ties broken by matcher declaration order, then walked
//! from a head toward a terminal failure.
//!
//! # Head selection
//! Among root-role results (or every result when no root exists), the
//! earliest one from which a terminal result is reachable heads the chain;
//! when none reaches a terminal, the earliest candidate does. A chain headed
//! by a non-root result is flagged unrooted.
//!
//! # Walk
//! The next node is the earliest intermediate or terminal result starting
//! after the previous node's last event. An intermediate that would overrun
//! the earliest still-reachable terminal is skipped, so adding results never
//! disconnects a terminal. The walk stops at the first terminal.

use crate::error::ChainError;
use rca_model::{CausalRole, ChainNode, ErrorChain, MatchResult};

/// Result with a resolved event span
#[derive(Clone, Copy)]
struct Placed<'a> {
    first: usize,
    last: usize,
    result: &'a MatchResult,
}

/// Builds an [`ErrorChain`] from match results
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainBuilder;

impl ChainBuilder {
    /// Create chain builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct the chain
    ///
    /// Results without event references are ignored. An empty input yields
    /// an empty, incomplete chain.
    ///
    /// # Errors
    /// Returns [`ChainError::OutOfOrder`] if the output is not strictly
    /// ordered by log position
    pub fn build(&self, results: &[MatchResult]) -> Result<ErrorChain, ChainError> {
        let placed = order(results);

        let Some(head) = select_head(&placed) else {
            return Ok(ErrorChain::empty());
        };

        let rooted = head.result.role() == CausalRole::Root;
        let mut chain = vec![head];
        let mut complete = head.result.role() == CausalRole::Terminal;
        let mut previous_last = head.last;

        if !complete {
            for candidate in placed.iter().copied() {
                if candidate.first <= previous_last {
                    continue;
                }
                match candidate.result.role() {
                    CausalRole::Root => continue,
                    CausalRole::Terminal => {
                        chain.push(candidate);
                        complete = true;
                        break;
                    }
                    CausalRole::Intermediate => {
                        let overruns = earliest_terminal_after(&placed, previous_last)
                            .is_some_and(|terminal| candidate.last >= terminal);
                        if overruns {
                            continue;
                        }
                        chain.push(candidate);
                        previous_last = candidate.last;
                    }
                }
            }
        }

        let nodes: Vec<ChainNode> = chain
            .iter()
            .enumerate()
            .map(|(i, p)| ChainNode::from_result(i + 1, p.result))
            .collect();

        verify_order(&nodes)?;

        tracing::debug!(
            nodes = nodes.len(),
            complete,
            rooted,
            "Reconstructed error chain"
        );
        Ok(ErrorChain::new(nodes, complete, rooted))
    }
}

/// Sort by earliest event, then matcher rank, then input order
fn order(results: &[MatchResult]) -> Vec<Placed<'_>> {
    let mut placed: Vec<(usize, Placed<'_>)> = results
        .iter()
        .enumerate()
        .filter_map(|(index, result)| {
            result
                .span()
                .map(|(first, last)| (index, Placed { first, last, result }))
        })
        .collect();

    placed.sort_by_key(|(index, p)| (p.first, p.result.matcher_rank(), *index));
    placed.into_iter().map(|(_, p)| p).collect()
}

fn earliest_terminal_after(placed: &[Placed<'_>], position: usize) -> Option<usize> {
    placed
        .iter()
        .filter(|p| p.result.role() == CausalRole::Terminal && p.first > position)
        .map(|p| p.first)
        .next()
}

fn reaches_terminal(placed: &[Placed<'_>], candidate: &Placed<'_>) -> bool {
    candidate.result.role() == CausalRole::Terminal
        || earliest_terminal_after(placed, candidate.last).is_some()
}

fn select_head<'a>(placed: &[Placed<'a>]) -> Option<Placed<'a>> {
    let roots: Vec<Placed<'a>> = placed
        .iter()
        .copied()
        .filter(|p| p.result.role() == CausalRole::Root)
        .collect();
    let candidates = if roots.is_empty() { placed } else { &roots[..] };

    candidates
        .iter()
        .copied()
        .find(|p| reaches_terminal(placed, p))
        .or_else(|| candidates.first().copied())
}

fn verify_order(nodes: &[ChainNode]) -> Result<(), ChainError> {
    for pair in nodes.windows(2) {
        if pair[1].first_event <= pair[0].last_event {
            return Err(ChainError::OutOfOrder {
                position: pair[1].position,
                first: pair[1].first_event,
                previous_last: pair[0].last_event,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rca_model::Severity;
    use rca_test_utils::result;

    fn categories(chain: &ErrorChain) -> Vec<&str> {
        chain.nodes().iter().map(|n| n.category.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_empty_chain() {
        let chain = ChainBuilder::new().build(&[]).unwrap();
        assert!(chain.is_empty());
        assert!(!chain.is_complete());
    }

    #[test]
    fn root_to_terminal() {
        let results = vec![
            result("loading_abort", Severity::Fatal, CausalRole::Terminal, &[7]),
            result("mod_discovery", Severity::Low, CausalRole::Root, &[1]),
            result("mod_conflict", Severity::Fatal, CausalRole::Intermediate, &[2, 3, 6]),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();

        assert_eq!(categories(&chain), vec!["mod_discovery", "mod_conflict", "loading_abort"]);
        assert!(chain.is_complete());
        assert!(chain.is_rooted());
        assert!(chain.is_strictly_ordered());
        assert_eq!(chain.nodes()[2].position, 3);
    }

    #[test]
    fn no_terminal_marks_incomplete() {
        let results = vec![
            result("mod_discovery", Severity::Low, CausalRole::Root, &[0]),
            result("missing_metadata", Severity::Low, CausalRole::Intermediate, &[2]),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_complete());
        assert!(chain.check_complete().is_err());
    }

    #[test]
    fn no_root_heads_with_earliest_result() {
        let results = vec![result(
            "missing_metadata",
            Severity::Low,
            CausalRole::Intermediate,
            &[1],
        )];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_rooted());
        assert!(!chain.is_complete());
    }

    #[test]
    fn lone_terminal_is_complete_chain() {
        let results = vec![result("loading_abort", Severity::Fatal, CausalRole::Terminal, &[4])];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.is_complete());
        assert!(!chain.is_rooted());
    }

    #[test]
    fn intermediate_overrunning_terminal_is_skipped() {
        let results = vec![
            result("mod_discovery", Severity::Low, CausalRole::Root, &[0]),
            result("exception", Severity::High, CausalRole::Intermediate, &[2, 9]),
            result("loading_abort", Severity::Fatal, CausalRole::Terminal, &[5]),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(categories(&chain), vec!["mod_discovery", "loading_abort"]);
        assert!(chain.is_complete());
    }

    #[test]
    fn overlapping_intermediates_keep_earliest() {
        let results = vec![
            result("mod_discovery", Severity::Low, CausalRole::Root, &[0]),
            result("a", Severity::High, CausalRole::Intermediate, &[1, 3]),
            result("b", Severity::High, CausalRole::Intermediate, &[2]),
            result("c", Severity::High, CausalRole::Intermediate, &[4]),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(categories(&chain), vec!["mod_discovery", "a", "c"]);
    }

    #[test]
    fn ties_broken_by_matcher_rank() {
        let results = vec![
            result("mod_discovery", Severity::Low, CausalRole::Root, &[0]),
            result("late", Severity::High, CausalRole::Intermediate, &[2]).with_matcher_rank(4),
            result("early", Severity::High, CausalRole::Intermediate, &[2]).with_matcher_rank(1),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(categories(&chain), vec!["mod_discovery", "early"]);
    }

    #[test]
    fn root_reaching_terminal_preferred() {
        let results = vec![
            result("wide_root", Severity::Low, CausalRole::Root, &[0, 9]),
            result("mod_discovery", Severity::Low, CausalRole::Root, &[1]),
            result("loading_abort", Severity::Fatal, CausalRole::Terminal, &[5]),
        ];
        let chain = ChainBuilder::new().build(&results).unwrap();
        assert_eq!(categories(&chain), vec!["mod_discovery", "loading_abort"]);
    }

    #[test]
    fn results_without_events_ignored() {
        let bare = rca_model::MatchResult::new(
            "loading_abort".into(),
            Severity::Fatal,
            CausalRole::Terminal,
            "no events",
        );
        let chain = ChainBuilder::new().build(&[bare]).unwrap();
        assert!(chain.is_empty());
    }
}
