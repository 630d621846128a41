//! # Startup RCA Engine
//!
//! Turns a raw startup log into a root-cause analysis [`Report`]:
//!
//! ```text
//! ┌────────┐   ┌──────────────┐   ┌───────┐   ┌──────────┐   ┌────────────┐   ┌────────┐
//! │ parser │──▶│ matchers (∥) │──▶│ chain │──▶│ findings │──▶│ confidence │──▶│ report │
//! └────────┘   └──────────────┘   └───────┘   └──────────┘   └────────────┘   └────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rca_engine::{AnalysisConfig, AnalysisInput, Analyzer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::new(AnalysisConfig::default())?;
//! let log = std::fs::read_to_string("logs/debug.log")?;
//! let report = analyzer.analyze(AnalysisInput::new(log)).await?;
//! println!("{}", report.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod analyzer;
pub mod chain;
pub mod confidence;
pub mod config;
pub mod environment;
pub mod error;
pub mod findings;
pub mod report;

pub use analyzer::{AnalysisInput, Analyzer};
pub use chain::ChainBuilder;
pub use confidence::ConfidenceScorer;
pub use config::{AnalysisConfig, ScoringConfig};
pub use environment::{load_environment, SnapshotFormat};
pub use error::{AnalysisError, ChainError, ConfigError, ScoreError, Stage, StageError};
pub use findings::FindingAggregator;
pub use report::{ReportAssembler, ReportParts};

pub use rca_model::Report;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
