//! Environment snapshot loading
//!
//! The snapshot is opaque: any flat mapping is accepted and passed through
//! to the report untouched. The format is chosen by file extension.

use crate::error::AnalysisError;
use rca_model::Environment;
use std::path::Path;

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    /// Format for a path's extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse snapshot text in this format
    ///
    /// # Errors
    /// Returns the parser's message when the text is not a mapping
    pub fn parse(self, text: &str) -> Result<Environment, String> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Load an environment snapshot from `.json`, `.yaml`/`.yml` or `.toml`
///
/// # Errors
/// Returns [`AnalysisError::Io`] if the file cannot be read and
/// [`AnalysisError::Environment`] for unsupported or malformed content
pub fn load_environment(path: impl AsRef<Path>) -> Result<Environment, AnalysisError> {
    let path = path.as_ref();
    let format = SnapshotFormat::from_path(path).ok_or_else(|| {
        AnalysisError::environment(path, "unsupported extension, expected json, yaml or toml")
    })?;
    let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io_error(path, e))?;
    let environment = format
        .parse(&text)
        .map_err(|reason| AnalysisError::environment(path, reason))?;

    tracing::debug!(path = %path.display(), entries = environment.len(), "Loaded environment snapshot");
    Ok(environment)
}
