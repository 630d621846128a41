//! Report assembly
//!
//! A pure transformation: the summary line and root-cause narrative are
//! derived from the chain and findings; nothing upstream is modified.

use rca_model::{
    ChainNode, Environment, ErrorChain, ExceptionInfo, Finding, LibraryReference, Report,
    ReportMetadata, Severity,
};

/// Everything the assembler needs for one report
#[derive(Debug, Clone, Default)]
pub struct ReportParts {
    pub chain: ErrorChain,
    pub findings: Vec<Finding>,
    pub confidence: f64,
    pub environment: Environment,
    pub metadata: ReportMetadata,
    pub libraries: Vec<LibraryReference>,
    pub exceptions: Vec<ExceptionInfo>,
    pub warnings: Vec<String>,
}

/// Renders analysis results into a [`Report`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    /// Create assembler
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assemble the final report
    #[must_use]
    pub fn assemble(&self, parts: ReportParts) -> Report {
        let summary = summary(&parts.chain, &parts.findings, parts.confidence);
        let root_cause_analysis = root_cause(&parts.chain, &parts.findings);

        Report {
            summary,
            chain: parts.chain,
            findings: parts.findings,
            root_cause_analysis,
            environment: parts.environment,
            confidence_score: parts.confidence,
            metadata: parts.metadata,
            libraries: parts.libraries,
            exceptions: parts.exceptions,
            warnings: parts.warnings,
        }
    }
}

/// Most significant node: first with severity high or above, else the head
fn cause(chain: &ErrorChain) -> Option<&ChainNode> {
    chain.first_at_least(Severity::High).or_else(|| chain.head())
}

fn summary(chain: &ErrorChain, findings: &[Finding], confidence: f64) -> String {
    let counts = format!(
        "{} finding(s), confidence {confidence:.2}",
        findings.len()
    );
    match (cause(chain), chain.tail()) {
        (Some(cause), Some(tail)) if chain.is_complete() && cause.position != tail.position => {
            format!(
                "Startup failed: {} led to {} ({counts})",
                cause.description, tail.description
            )
        }
        (Some(cause), _) if chain.is_complete() => {
            format!("Startup failed: {} ({counts})", cause.description)
        }
        (Some(cause), _) => format!(
            "Startup anomalies detected, no terminal failure reached: {} ({counts})",
            cause.description
        ),
        (None, _) => format!("No error chain reconstructed ({counts})"),
    }
}

fn root_cause(chain: &ErrorChain, findings: &[Finding]) -> String {
    let Some(cause) = cause(chain) else {
        return "No root cause identified: no match result references the log".to_string();
    };

    let mut text = format!(
        "{} [{}, {}] at log event {}",
        cause.description, cause.category, cause.severity, cause.first_event
    );

    if let Some(finding) = findings.iter().find(|f| f.category == cause.category) {
        if !finding.evidence.is_empty() {
            text.push_str(". Evidence: ");
            text.push_str(&finding.evidence.join("; "));
        }
    }

    if chain.len() > 1 {
        let path: Vec<&str> = chain.nodes().iter().map(|n| n.description.as_str()).collect();
        text.push_str(". Chain: ");
        text.push_str(&path.join(" -> "));
    }

    if !chain.is_complete() {
        text.push_str(". The chain does not reach a terminal failure");
    }
    text.push('.');
    text
}
