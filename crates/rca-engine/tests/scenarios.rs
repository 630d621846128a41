//! End-to-end scenarios over realistic startup logs.
//!
//! Core guarantees exercised here:
//! - A duplicate mod id followed by a loader abort is reconstructed as a
//!   three-step chain with high confidence.
//! - A lone low-severity complaint yields a low-confidence report, not an
//!   error.
//! - Logs with no recognizable pattern fail explicitly with no report.
//! - Two runs over the same input serialize to identical bytes.
//! - An exception repeated in the crash report after the abort still sits
//!   in the chain ahead of it.
//! - A fatal conflict found at DEBUG level rules out an unexplained abort.

use pretty_assertions::assert_eq;
use rca_engine::{AnalysisConfig, AnalysisError, AnalysisInput, Analyzer};
use rca_model::{Environment, Severity};
use rca_test_utils::{fixtures, LogBuilder};
use serde_json::json;

fn analyzer() -> Analyzer {
    Analyzer::new(AnalysisConfig::default()).unwrap()
}

/// Tenet: a duplicate identifier plus an abort marker is a resolved failure.
///
/// The scan, the conflicting declarations and the abort must line up as one
/// chain, and the conflict finding must carry every declaring file.
#[tokio::test]
async fn duplicate_mod_then_abort() {
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD))
        .await
        .unwrap();

    let chain: Vec<&str> = report
        .chain
        .nodes()
        .iter()
        .map(|n| n.category.as_str())
        .collect();
    assert_eq!(chain, vec!["mod_discovery", "mod_conflict", "loading_abort"]);
    assert!(report.chain.is_complete());
    assert!(report.chain.is_rooted());
    assert!(report.chain.is_strictly_ordered());

    let conflict = report.finding("mod_conflict").unwrap();
    assert_eq!(conflict.severity, Severity::Fatal);
    assert!(conflict.evidence.len() >= 2);
    assert!(conflict
        .evidence
        .iter()
        .any(|e| e.contains("embeddium-0.3.18.jar")));

    assert!(report.confidence_score >= 0.8, "confidence {}", report.confidence_score);
    assert!(report.warnings.is_empty());
    assert!(report.root_cause_analysis.starts_with("Duplicate mod id 'rubidium'"));
}

/// Tenet: a single low-severity complaint is reported, never escalated.
#[tokio::test]
async fn missing_metadata_only() {
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::MISSING_METADATA_ONLY))
        .await
        .unwrap();

    assert!(report.chain.len() <= 1);
    assert!(!report.chain.is_complete());
    assert!(report.confidence_score < 0.3, "confidence {}", report.confidence_score);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category.as_str(), "missing_metadata");
    assert!(report
        .warnings
        .iter()
        .any(|w| w.starts_with("incomplete error chain")));
}

/// Tenet: no evidence means no report.
#[tokio::test]
async fn empty_log_has_no_evidence() {
    let err = analyzer().analyze(AnalysisInput::new("")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoEvidence { matchers: 7 }));
}

/// Tenet: unrecognizable noise is tolerated by the parser but is not
/// evidence.
#[tokio::test]
async fn noise_has_no_evidence() {
    let err = analyzer()
        .analyze(AnalysisInput::new(fixtures::NOISE))
        .await
        .unwrap_err();
    assert!(err.is_no_evidence());
}

#[tokio::test]
async fn missing_dependency_chain() {
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::FORGE_MISSING_DEPENDENCY))
        .await
        .unwrap();

    let dependency = report.finding("dependency_conflict").unwrap();
    assert_eq!(dependency.severity, Severity::High);
    assert!(dependency.recommendations[0].contains("geckolib"));
    assert_eq!(report.chain.len(), 3);
    assert!(report.finding("unreviewed_dependency").is_none());
}

#[tokio::test]
async fn silent_abort_is_unreviewed_dependency() {
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::SILENT_ABORT))
        .await
        .unwrap();

    assert!(report.finding("unreviewed_dependency").is_some());
    assert!(report.chain.is_complete());
    // The unreviewed result shares the abort line and yields to the terminal.
    assert_eq!(
        report.chain.tail().map(|n| n.category.as_str()),
        Some("loading_abort")
    );
}

/// Tenet: a trace printed again after the crash does not push the exception
/// out of the chain.
#[tokio::test]
async fn exception_repeated_after_crash_stays_in_chain() {
    let log = LogBuilder::new()
        .info("ModDiscoverer/SCAN", "Scanning for mod candidates")
        .error("ModLoader/", "Failed to create mod instance: java.lang.NoSuchMethodError: getPointer")
        .fatal("Minecraft/", "Game crashed!")
        .raw("java.lang.NoSuchMethodError: getPointer")
        .build();

    let report = analyzer().analyze(AnalysisInput::new(log)).await.unwrap();

    let chain: Vec<&str> = report
        .chain
        .nodes()
        .iter()
        .map(|n| n.category.as_str())
        .collect();
    assert_eq!(chain, vec!["mod_discovery", "exception", "loading_abort"]);
    assert!(report.root_cause_analysis.starts_with("java.lang.NoSuchMethodError"));
    assert_eq!(report.exceptions[0].occurrence_count, 2);
}

/// Tenet: an abort is unexplained only when no fatal cause precedes it.
#[tokio::test]
async fn debug_duplicate_declarations_are_a_cause() {
    let log = LogBuilder::new()
        .info("ModDiscoverer/SCAN", "Scanning for mod candidates")
        .mod_file("rubidium-0.7.1.jar", "rubidium", "0.7.1")
        .mod_file("embeddium-0.3.18.jar", "rubidium", "0.3.18")
        .fatal("FMLLoader/", "Loading errors encountered, aborting mod loading")
        .build();

    let report = analyzer().analyze(AnalysisInput::new(log)).await.unwrap();

    assert_eq!(report.finding("mod_conflict").map(|f| f.severity), Some(Severity::Fatal));
    assert!(report.finding("unreviewed_dependency").is_none());
    assert!(report.chain.is_complete());
}

/// Tenet: identical input yields byte-identical output.
#[tokio::test]
async fn reports_are_deterministic() {
    let environment = Environment::new()
        .with("forge", "47.2.0")
        .with("mods", json!(["embeddium", "rubidium", "jei"]));
    let input = AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD)
        .with_environment(environment)
        .with_source("debug.log");

    let first = analyzer().analyze(input.clone()).await.unwrap();
    let second = analyzer().analyze(input).await.unwrap();

    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
}

#[tokio::test]
async fn environment_passes_through_verbatim() {
    let environment = Environment::new().with("java", json!({"vendor": "temurin", "major": 17}));
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD).with_environment(environment.clone()))
        .await
        .unwrap();

    assert_eq!(report.environment, environment);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["environment"]["java"]["major"], json!(17));
}

#[tokio::test]
async fn zero_deadline_exceeded() {
    let analyzer = Analyzer::new(AnalysisConfig::new().with_deadline_ms(0)).unwrap();
    let err = analyzer
        .analyze(AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::DeadlineExceeded { deadline_ms: 0 }));
}

#[test]
fn unknown_matcher_rejected() {
    let config = AnalysisConfig::new().with_matchers(["duplicate_mod", "telepathy"]);
    assert!(Analyzer::new(config).is_err());
}

#[tokio::test]
async fn matcher_selection_limits_findings() {
    let config = AnalysisConfig::new().with_matchers(["duplicate_mod", "loading_abort"]);
    let report = Analyzer::new(config)
        .unwrap()
        .analyze(AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD))
        .await
        .unwrap();

    assert_eq!(report.metadata.matchers_run, vec!["duplicate_mod", "loading_abort"]);
    assert!(report.finding("mod_discovery").is_none());
    assert!(!report.chain.is_rooted());
    assert!(report.chain.is_complete());
}

#[tokio::test]
async fn malformed_lines_do_not_fail_the_run() {
    let log = LogBuilder::new()
        .info("ModDiscoverer/SCAN", "Scanning for mod candidates")
        .raw("\u{0}\u{1}binary garbage")
        .raw("no header here")
        .mod_file("a-1.0.jar", "alpha", "1.0")
        .mod_file("b-2.0.jar", "alpha", "2.0")
        .error("ModSorter/LOADING", "Found duplicate mods")
        .fatal("FMLLoader/", "Loading errors encountered, aborting mod loading")
        .build();

    let report = analyzer().analyze(AnalysisInput::new(log)).await.unwrap();

    assert_eq!(report.metadata.malformed_lines, 2);
    assert!(report.warnings.iter().any(|w| w == "2 malformed line(s) recovered"));
    assert!(report.chain.is_complete());
    assert_eq!(report.libraries.len(), 2);
}

#[tokio::test]
async fn required_top_level_fields() {
    let report = analyzer()
        .analyze(AnalysisInput::new(fixtures::FORGE_DUPLICATE_MOD))
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    for field in [
        "summary",
        "error_chain",
        "findings",
        "root_cause_analysis",
        "environment",
        "confidence_score",
    ] {
        assert!(json.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(json["error_chain"][0]["severity"], json!("low"));
    assert!(json["error_chain"][0]["description"].is_string());
}
