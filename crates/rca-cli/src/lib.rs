//! `startup-rca` command line
//!
//! ```text
//! startup-rca analyze <LOG> [--env FILE] [--config FILE] [--source LABEL] [--compact] [--output FILE]
//! startup-rca matchers
//! startup-rca config [--config FILE]
//! ```
//!
//! The report goes to stdout (or `--output`); logs go to stderr. Exit code is
//! 0 when a report is produced, 2 when the log holds no evidence and 1 on any
//! other failure.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use rca_engine::{load_environment, AnalysisConfig, AnalysisError, AnalysisInput, Analyzer};
use rca_matchers::MatcherRegistry;
use rca_model::Environment;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Exit code when the log contains no recognizable evidence
pub const EXIT_NO_EVIDENCE: u8 = 2;

/// Exit code for every other failure
pub const EXIT_FAILURE: u8 = 1;

/// Reads the log from stdin when given as the log path
const STDIN: &str = "-";

/// Build the command line definition
#[must_use]
pub fn command() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .value_name("FILE")
        .value_parser(clap::value_parser!(PathBuf))
        .help("TOML configuration file");

    Command::new("startup-rca")
        .version(rca_engine::VERSION)
        .about("Root-cause analysis for application startup logs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit diagnostics on stderr as JSON lines"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Analyze a startup log and print the JSON report")
                .arg(
                    Arg::new("log")
                        .required(true)
                        .value_name("LOG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Log file to analyze, or '-' for stdin"),
                )
                .arg(
                    Arg::new("env")
                        .long("env")
                        .short('e')
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Environment snapshot (.json, .yaml/.yml or .toml)"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("source")
                        .long("source")
                        .value_name("LABEL")
                        .help("Label recorded as the log source (defaults to the log path)"),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Print the report on a single line"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Write the report to FILE instead of stdout"),
                ),
        )
        .subcommand(Command::new("matchers").about("List the built-in matchers in declaration order"))
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as TOML")
                .arg(config_arg),
        )
}

/// Options of the `analyze` subcommand
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub log: PathBuf,
    pub environment: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub source: Option<String>,
    pub compact: bool,
    pub output: Option<PathBuf>,
}

impl AnalyzeOptions {
    /// Options for analyzing `log` with everything else defaulted
    #[must_use]
    pub fn new(log: impl Into<PathBuf>) -> Self {
        Self {
            log: log.into(),
            ..Self::default()
        }
    }

    fn from_matches(args: &ArgMatches) -> Self {
        Self {
            log: args.get_one::<PathBuf>("log").cloned().unwrap_or_default(),
            environment: args.get_one::<PathBuf>("env").cloned(),
            config: args.get_one::<PathBuf>("config").cloned(),
            source: args.get_one::<String>("source").cloned(),
            compact: args.get_flag("compact"),
            output: args.get_one::<PathBuf>("output").cloned(),
        }
    }
}

/// Install the stderr subscriber
///
/// The filter comes from `RCA_LOG`, then `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("RCA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded in tests.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Dispatch a parsed command line
///
/// # Errors
/// Returns the failure of the selected subcommand
pub async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("analyze", args)) => {
            let options = AnalyzeOptions::from_matches(args);
            let rendered = analyze(&options).await?;
            match &options.output {
                Some(path) => tokio::fs::write(path, rendered.as_bytes())
                    .await
                    .with_context(|| format!("writing report to {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Some(("matchers", _)) => print!("{}", render_matchers(&MatcherRegistry::with_defaults())),
        Some(("config", args)) => {
            let config = effective_config(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
            print!("{}", config.to_toml_string()?);
        }
        _ => anyhow::bail!("no subcommand given"),
    }
    Ok(())
}

/// Run one analysis and render the report as JSON
///
/// # Errors
/// Fails when any input cannot be loaded or the analysis itself fails
pub async fn analyze(options: &AnalyzeOptions) -> anyhow::Result<String> {
    let config = effective_config(options.config.as_deref())?;
    tracing::debug!(log = %options.log.display(), deadline_ms = config.deadline_ms, "Starting analysis");
    let analyzer = Analyzer::new(config)?;

    let log = read_log(&options.log, analyzer.config().max_log_bytes).await?;
    let environment = match &options.environment {
        Some(path) => load_environment(path)?,
        None => Environment::new(),
    };
    let source = options
        .source
        .clone()
        .unwrap_or_else(|| options.log.display().to_string());

    let input = AnalysisInput::new(log)
        .with_environment(environment)
        .with_source(source);
    let report = analyzer.analyze(input).await?;

    let rendered = if options.compact {
        report.to_json()?
    } else {
        report.to_json_pretty()?
    };
    Ok(rendered)
}

/// Configuration file (or defaults) with `RCA_*` overrides applied
///
/// # Errors
/// Fails when the file cannot be loaded or an override is invalid
pub fn effective_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let config = match path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// One line per matcher: rank, name and category
#[must_use]
pub fn render_matchers(registry: &MatcherRegistry) -> String {
    let mut out = String::new();
    for (rank, matcher) in registry.iter() {
        let _ = writeln!(out, "{rank}\t{:<24}{}", matcher.name(), matcher.category());
    }
    out
}

/// Exit code for a failed run
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis) if analysis.is_no_evidence() => EXIT_NO_EVIDENCE,
        _ => EXIT_FAILURE,
    }
}

/// Log text from a file or stdin; invalid UTF-8 is replaced, not rejected
///
/// A file larger than `limit` is rejected from its metadata without being
/// read. Stdin has no size up front and is checked by the analyzer.
async fn read_log(path: &Path, limit: usize) -> anyhow::Result<String> {
    let bytes = if path.as_os_str() == STDIN {
        let mut bytes = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut tokio::io::stdin(), &mut bytes)
            .await
            .context("reading log from stdin")?;
        bytes
    } else {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| AnalysisError::io_error(path, e))?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > limit {
            return Err(AnalysisError::InputTooLarge { size, limit }.into());
        }
        tokio::fs::read(path)
            .await
            .map_err(|e| AnalysisError::io_error(path, e))?
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rca_test_utils::fixtures;
    use std::fs;

    #[test]
    fn command_definition_is_valid() {
        command().debug_assert();
    }

    #[test]
    fn analyze_arguments() {
        let matches = command()
            .try_get_matches_from([
                "startup-rca",
                "analyze",
                "debug.log",
                "--env",
                "env.yaml",
                "--compact",
                "-o",
                "report.json",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "analyze");

        let options = AnalyzeOptions::from_matches(args);
        assert_eq!(options.log, PathBuf::from("debug.log"));
        assert_eq!(options.environment, Some(PathBuf::from("env.yaml")));
        assert_eq!(options.output, Some(PathBuf::from("report.json")));
        assert!(options.compact);
        assert!(options.config.is_none());
    }

    #[test]
    fn log_path_required() {
        assert!(command().try_get_matches_from(["startup-rca", "analyze"]).is_err());
    }

    #[tokio::test]
    async fn analyze_file_with_environment() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("debug.log");
        let env = dir.path().join("env.json");
        fs::write(&log, fixtures::FORGE_DUPLICATE_MOD).unwrap();
        fs::write(&env, r#"{"forge": "47.2.0"}"#).unwrap();

        let options = AnalyzeOptions {
            environment: Some(env),
            source: Some("client/debug.log".to_string()),
            compact: true,
            ..AnalyzeOptions::new(&log)
        };
        let rendered = analyze(&options).await.unwrap();

        assert!(!rendered.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["environment"]["forge"], "47.2.0");
        assert_eq!(json["metadata"]["log_source"], "client/debug.log");
        assert_eq!(json["chain_complete"], true);
    }

    #[tokio::test]
    async fn no_evidence_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("noise.log");
        fs::write(&log, fixtures::NOISE).unwrap();

        let err = analyze(&AnalyzeOptions::new(&log)).await.unwrap_err();
        assert_eq!(exit_code(&err), EXIT_NO_EVIDENCE);
    }

    #[tokio::test]
    async fn missing_log_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze(&AnalyzeOptions::new(dir.path().join("absent.log")))
            .await
            .unwrap_err();
        assert_eq!(exit_code(&err), EXIT_FAILURE);
        assert!(err.to_string().contains("absent.log"));
    }

    #[tokio::test]
    async fn oversized_log_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("debug.log");
        let config = dir.path().join("rca.toml");
        fs::write(&log, fixtures::FORGE_DUPLICATE_MOD).unwrap();
        fs::write(&config, "max_log_bytes = 16\n").unwrap();

        let options = AnalyzeOptions {
            config: Some(config),
            ..AnalyzeOptions::new(&log)
        };
        let err = analyze(&options).await.unwrap_err();

        let size = fixtures::FORGE_DUPLICATE_MOD.len();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InputTooLarge { size: s, limit: 16 }) if *s == size
        ));
        assert_eq!(exit_code(&err), EXIT_FAILURE);
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rca.toml");
        fs::write(&path, "deadline_ms = 250\nmatchers = [\"loading_abort\"]\n").unwrap();

        let config = effective_config(Some(&path)).unwrap();
        assert_eq!(config.deadline_ms, 250);
        assert_eq!(config.matchers, vec!["loading_abort".to_string()]);
    }

    #[test]
    fn matchers_listing_in_declaration_order() {
        let listing = render_matchers(&MatcherRegistry::with_defaults());
        let names: Vec<&str> = listing
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .collect();
        assert_eq!(names, MatcherRegistry::with_defaults().names());
    }
}
