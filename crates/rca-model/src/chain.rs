//! Error chain types

use crate::matching::{Category, MatchResult, Severity};
use serde::{Deserialize, Serialize};

/// One step of an [`ErrorChain`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    /// 1-based ordinal position in the chain
    pub position: usize,
    pub description: String,
    pub severity: Severity,
    pub category: Category,
    /// Earliest referenced log event
    pub first_event: usize,
    /// Latest referenced log event
    pub last_event: usize,
}

impl ChainNode {
    /// Build a node from a match result
    ///
    /// Results without event references map to position 0 in the log.
    #[must_use]
    pub fn from_result(position: usize, result: &MatchResult) -> Self {
        let (first_event, last_event) = result.span().unwrap_or((0, 0));
        Self {
            position,
            description: result.summary().to_string(),
            severity: result.severity(),
            category: result.category().clone(),
            first_event,
            last_event,
        }
    }
}

/// Raised when the chain does not reach a terminal failure
///
/// Non-fatal: the report is still emitted with the chain flagged incomplete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("incomplete error chain: no terminal failure reached after {length} node(s)")]
pub struct IncompleteChainError {
    pub length: usize,
}

/// Ordered causal chain from root cause to final outcome
///
/// Nodes are strictly ordered by log position: each node's `first_event`
/// is greater than the previous node's `last_event`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorChain {
    #[serde(rename = "error_chain")]
    nodes: Vec<ChainNode>,
    #[serde(rename = "chain_complete")]
    complete: bool,
    #[serde(rename = "chain_rooted")]
    rooted: bool,
}

impl ErrorChain {
    #[must_use]
    pub fn new(nodes: Vec<ChainNode>, complete: bool, rooted: bool) -> Self {
        Self {
            complete: complete && !nodes.is_empty(),
            rooted: rooted && !nodes.is_empty(),
            nodes,
        }
    }

    /// Chain with no nodes (always incomplete)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A terminal failure node was reached
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The head node had causal role root
    #[inline]
    #[must_use]
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    #[must_use]
    pub fn head(&self) -> Option<&ChainNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn tail(&self) -> Option<&ChainNode> {
        self.nodes.last()
    }

    /// Earliest node with at least `severity`
    #[must_use]
    pub fn first_at_least(&self, severity: Severity) -> Option<&ChainNode> {
        self.nodes.iter().find(|n| n.severity >= severity)
    }

    /// Check that every node starts after the previous one ends
    #[must_use]
    pub fn is_strictly_ordered(&self) -> bool {
        self.nodes
            .windows(2)
            .all(|w| w[1].first_event > w[0].last_event && w[1].position == w[0].position + 1)
    }

    /// # Errors
    /// `IncompleteChainError` if no terminal failure was reached
    pub fn check_complete(&self) -> Result<(), IncompleteChainError> {
        if self.complete {
            Ok(())
        } else {
            Err(IncompleteChainError {
                length: self.nodes.len(),
            })
        }
    }
}
