//! Analysis pipeline driver
//!
//! ```text
//! parse ─▶ matchers (concurrent) ─▶ chain ─▶ findings ─▶ confidence ─▶ report
//! ```
//!
//! Matchers run as blocking tasks over one shared event slice and join at a
//! barrier; everything after the barrier is sequential. A matcher error or
//! panic is recorded in the report metadata and does not affect the others.
//! The deadline bounds the whole run.

use crate::chain::ChainBuilder;
use crate::config::AnalysisConfig;
use crate::confidence::ConfidenceScorer;
use crate::error::{AnalysisError, ConfigError, Stage, StageError};
use crate::findings::FindingAggregator;
use crate::report::{ReportAssembler, ReportParts};
use rca_matchers::{validate_results, Matcher, MatcherError, MatcherRegistry};
use rca_model::{Environment, LogEvent, MatchResult, MatcherFailure, Report, ReportMetadata};
use rca_parser::{collect_exceptions, collect_libraries, LogParser, ParsedLog};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;

/// Input of one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    /// Raw log text
    pub log: String,
    /// Opaque environment snapshot
    pub environment: Environment,
    /// Label of the log's origin (file name, URL, ...)
    pub source: Option<String>,
}

impl AnalysisInput {
    /// Create input from raw log text
    #[must_use]
    pub fn new(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            ..Self::default()
        }
    }

    /// With environment snapshot
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// With source label
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Outcome of one matcher task
struct MatcherOutcome {
    rank: usize,
    name: &'static str,
    result: Result<Vec<MatchResult>, MatcherError>,
}

/// Startup log analyzer
///
/// Holds no per-run state; one analyzer can serve any number of runs.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    registry: MatcherRegistry,
    scorer: ConfidenceScorer,
}

impl Analyzer {
    /// Create analyzer running the matchers selected by `config`
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration is invalid
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = MatcherRegistry::select(&config.matchers)?;
        Self::with_registry(config, registry)
    }

    /// Create analyzer with a custom matcher registry
    ///
    /// The config's matcher selection is applied to `registry`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for invalid weights or unknown matcher names
    pub fn with_registry(
        config: AnalysisConfig,
        registry: MatcherRegistry,
    ) -> Result<Self, ConfigError> {
        let scorer = ConfidenceScorer::new(config.scoring)?;
        let registry = registry.retain_named(&config.matchers)?;
        Ok(Self {
            config,
            registry,
            scorer,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// Run the full pipeline
    ///
    /// # Errors
    /// - [`AnalysisError::InputTooLarge`] before parsing
    /// - [`AnalysisError::NoEvidence`] when no matcher produced a result
    /// - [`AnalysisError::DeadlineExceeded`] when the deadline passes
    /// - [`AnalysisError::Stage`] when a stage fails
    pub async fn analyze(&self, input: AnalysisInput) -> Result<Report, AnalysisError> {
        let span = tracing::info_span!(
            "analysis",
            source = input.source.as_deref().unwrap_or("<input>"),
            bytes = input.log.len()
        );

        let deadline = self.config.deadline();
        let started = Instant::now();

        let run = async {
            match tokio::time::timeout(deadline, self.run(input, started)).await {
                Ok(result) => result,
                Err(_) => Err(self.deadline_exceeded()),
            }
        };

        let result = run.instrument(span).await;
        if let Err(e) = &result {
            tracing::error!("Analysis failed: {}", e);
        }
        result
    }

    async fn run(&self, input: AnalysisInput, started: Instant) -> Result<Report, AnalysisError> {
        let AnalysisInput {
            log,
            environment,
            source,
        } = input;

        if log.len() > self.config.max_log_bytes {
            return Err(AnalysisError::InputTooLarge {
                size: log.len(),
                limit: self.config.max_log_bytes,
            });
        }

        let log_size_bytes = log.len();
        let log_digest = blake3::hash(log.as_bytes()).to_hex().to_string();

        // 1. Parse
        let parsed: ParsedLog = tokio::task::spawn_blocking(move || LogParser::new().parse(&log))
            .await
            .map_err(|e| AnalysisError::stage(Stage::Parse, StageError::Task(e.to_string())))?;
        tracing::info!(
            "Parsed {} events from {} lines ({} malformed)",
            parsed.events.len(),
            parsed.line_count,
            parsed.malformed_lines
        );
        self.check_deadline(started)?;

        let ParsedLog {
            events,
            line_count,
            malformed_lines,
        } = parsed;
        let events: Arc<[LogEvent]> = events.into();

        // 2. Match
        let (results, failures) = self.run_matchers(&events).await?;
        tracing::info!(
            "Matchers produced {} results ({} failed)",
            results.len(),
            failures.len()
        );
        self.check_deadline(started)?;

        if results.is_empty() {
            return Err(AnalysisError::NoEvidence {
                matchers: self.registry.len(),
            });
        }

        // 3. Chain
        let chain = ChainBuilder::new()
            .build(&results)
            .map_err(|e| AnalysisError::stage(Stage::Chain, e))?;

        // 4. Findings
        let findings = FindingAggregator::new().aggregate(&results);

        // 5. Confidence
        let confidence = self
            .scorer
            .score(&chain, &findings, &results)
            .map_err(|e| AnalysisError::stage(Stage::Score, e))?;
        tracing::info!(
            "Chain of {} node(s), {} finding(s), confidence {:.4}",
            chain.len(),
            findings.len(),
            confidence
        );
        self.check_deadline(started)?;

        // 6. Report
        let mut warnings = Vec::new();
        if let Err(incomplete) = chain.check_complete() {
            tracing::warn!("{}", incomplete);
            warnings.push(incomplete.to_string());
        }
        if malformed_lines > 0 {
            warnings.push(format!("{malformed_lines} malformed line(s) recovered"));
        }
        warnings.extend(failures.iter().map(|f| f.error.clone()));

        let metadata = ReportMetadata {
            log_source: source,
            log_size_bytes,
            log_digest,
            line_count,
            event_count: events.len(),
            malformed_lines,
            matchers_run: self.registry.names().iter().map(|n| (*n).to_string()).collect(),
            matcher_failures: failures,
        };

        Ok(ReportAssembler::new().assemble(ReportParts {
            chain,
            findings,
            confidence,
            environment,
            metadata,
            libraries: collect_libraries(&events),
            exceptions: collect_exceptions(&events),
            warnings,
        }))
    }

    /// Run every matcher concurrently and collect results in rank order
    async fn run_matchers(
        &self,
        events: &Arc<[LogEvent]>,
    ) -> Result<(Vec<MatchResult>, Vec<MatcherFailure>), AnalysisError> {
        let mut tasks = JoinSet::new();
        for (rank, matcher) in self.registry.iter() {
            let matcher: Arc<dyn Matcher> = Arc::clone(matcher);
            let events = Arc::clone(events);
            tasks.spawn_blocking(move || detect_isolated(rank, matcher.as_ref(), &events));
        }

        let mut outcomes = Vec::with_capacity(self.registry.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| AnalysisError::stage(Stage::Match, StageError::Task(e.to_string())))?;
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|o| o.rank);

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(found) => {
                    tracing::debug!(matcher = outcome.name, results = found.len(), "Matcher finished");
                    results.extend(
                        found
                            .into_iter()
                            .map(|r| r.with_matcher_rank(outcome.rank)),
                    );
                }
                Err(e) => {
                    tracing::warn!(matcher = outcome.name, "Matcher failed: {}", e);
                    failures.push(MatcherFailure {
                        matcher: outcome.name.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok((results, failures))
    }

    fn check_deadline(&self, started: Instant) -> Result<(), AnalysisError> {
        if started.elapsed() >= self.config.deadline() {
            return Err(self.deadline_exceeded());
        }
        Ok(())
    }

    fn deadline_exceeded(&self) -> AnalysisError {
        AnalysisError::DeadlineExceeded {
            deadline_ms: self.config.deadline_ms,
        }
    }
}

/// Run one matcher, turning a panic into a [`MatcherError`]
fn detect_isolated(rank: usize, matcher: &dyn Matcher, events: &[LogEvent]) -> MatcherOutcome {
    let name = matcher.name();
    let result = catch_unwind(AssertUnwindSafe(|| matcher.detect(events)))
        .unwrap_or_else(|_| Err(MatcherError::detection(name, "matcher panicked")))
        .and_then(|found| validate_results(name, &found, events.len()).map(|()| found));
    MatcherOutcome { rank, name, result }
}
