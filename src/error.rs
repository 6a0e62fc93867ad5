//! Configuration errors surfaced while preparing a rewrite pass.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading settings or compiling the exclusion pattern.
///
/// Rewriting itself never fails; every error in this enum is detected before the first URL
/// is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The exclusion pattern is not a valid regular expression.
  #[error("invalid exclusion pattern `{pattern}`: {source}")]
  InvalidExcludePattern {
    /// Pattern as supplied by the host.
    pattern: String,
    /// Underlying regex compilation error.
    #[source]
    source: regex::Error,
  },
  /// Failed to read a settings file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Read {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse a JSON settings file.
  #[error("failed to parse {}: {source}", path.display())]
  ParseJson {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// Failed to parse a YAML settings file.
  #[error("failed to parse {}: {source}", path.display())]
  ParseYaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
}
