//! startup-rca data model
//!
//! Immutable types shared by every stage of the analysis pipeline.
//!
//! # Core Concepts
//!
//! - [`LogEvent`]: One parsed log line with its extracted fields
//! - [`MatchResult`]: A matcher's detection, with evidence and a causal role
//! - [`ErrorChain`]: Ordered causal chain from root cause to terminal failure
//! - [`Finding`]: Per-category aggregation of match results
//! - [`Report`]: The final analysis document
//!
//! # Pipeline
//!
//! ```text
//! raw log → Parser → [LogEvent] → Matchers → [MatchResult]
//!                                              ├─→ Chain Builder → ErrorChain ─┐
//!                                              └─→ Aggregator    → [Finding]  ─┼─→ Scorer → Report
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod chain;
mod environment;
mod event;
mod finding;
mod matching;
mod report;

pub use chain::{ChainNode, ErrorChain, IncompleteChainError};
pub use environment::Environment;
pub use event::{EventFields, LogEvent, LogLevel, LogTimestamp};
pub use finding::Finding;
pub use matching::{CausalRole, Category, MatchResult, Severity, SeverityParseError};
pub use report::{
    ExceptionInfo, LibraryReference, MatcherFailure, Report, ReportMetadata,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn match_result_into_chain_node() {
        let event = LogEvent::new(3, "[main/FATAL]: aborting");
        let result = MatchResult::new(
            Category::new("loading_abort"),
            Severity::Low,
            CausalRole::Terminal,
            "Mod loading aborted",
        )
        .with_events([event.seq()]);

        let node = ChainNode::from_result(1, &result);
        assert_eq!(node.position, 1);
        assert_eq!(node.severity, Severity::Fatal);
        assert_eq!(node.first_event, 3);

        let chain = ErrorChain::new(vec![node], true, false);
        assert!(chain.check_complete().is_ok());
    }
}
