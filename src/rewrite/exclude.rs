use regex::Regex;

use crate::config::DEFAULT_EXCLUDES;
use crate::error::ConfigError;

/// Compiled exclusion rule; a URL containing a match anywhere is left alone.
#[derive(Debug, Clone)]
pub struct ExcludePattern {
  regex: Regex,
}

impl ExcludePattern {
  /// Compile a host-supplied pattern, failing fast on invalid syntax.
  pub fn new(pattern: &str) -> Result<Self, ConfigError> {
    let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidExcludePattern {
      pattern: pattern.to_string(),
      source,
    })?;
    Ok(Self { regex })
  }

  /// Returns `true` when the URL must not be rewritten.
  pub fn is_excluded(&self, url: &str) -> bool {
    self.regex.is_match(url)
  }

  /// Source text of the compiled pattern.
  pub fn as_str(&self) -> &str {
    self.regex.as_str()
  }
}

impl Default for ExcludePattern {
  fn default() -> Self {
    use std::sync::OnceLock;

    static DEFAULT: OnceLock<Regex> = OnceLock::new();
    let regex = DEFAULT
      .get_or_init(|| Regex::new(DEFAULT_EXCLUDES).expect("invalid default exclusion regex"))
      .clone();
    Self { regex }
  }
}
