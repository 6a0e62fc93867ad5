//! Settings loader describing which origins get rewritten and when rewriting is skipped.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "tiny-cdn.json";

/// Exclusion pattern applied when the host does not supply one.
pub const DEFAULT_EXCLUDES: &str = r"\.php";

/// Capability that turns rewriting off for the current principal by default.
pub const DEFAULT_CAPABILITY: &str = "edit_pages";

/// Environment variable overriding [`CdnSettings::includes_url`].
pub const ENV_INCLUDES_URL: &str = "TINY_CDN_INCLUDES_URL";
/// Environment variable overriding [`CdnSettings::content_url`].
pub const ENV_CONTENT_URL: &str = "TINY_CDN_CONTENT_URL";
/// Environment variable overriding [`CdnSettings::excludes`].
pub const ENV_EXCLUDES: &str = "TINY_CDN_EXCLUDES";
/// Environment variable overriding [`CdnSettings::capability`].
pub const ENV_CAPABILITY: &str = "TINY_CDN_CAPABILITY";
/// Environment variable overriding [`CdnSettings::disable`].
pub const ENV_DISABLE: &str = "TINY_CDN_DISABLE";

/// Injected configuration source for the rewrite engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CdnSettings {
  /// CDN base replacing the internal-library origin. `None` disables that substitution.
  pub includes_url: Option<String>,
  /// CDN base replacing the content origin. `None` disables that substitution.
  pub content_url: Option<String>,
  /// Regular expression; any URL containing a match is never rewritten.
  pub excludes: String,
  /// Principals holding this capability always see origin URLs.
  pub capability: String,
  /// Force-disable switch for every request.
  pub disable: bool,
}

impl Default for CdnSettings {
  fn default() -> Self {
    Self {
      includes_url: None,
      content_url: None,
      excludes: DEFAULT_EXCLUDES.into(),
      capability: DEFAULT_CAPABILITY.into(),
      disable: false,
    }
  }
}

impl CdnSettings {
  /// Attempt to load settings from `tiny-cdn.json` inside the provided directory.
  ///
  /// A missing file falls back to defaults silently; an unreadable or malformed one falls back
  /// with a warning, so the host keeps serving origin URLs.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(settings) => settings,
      Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
        Self::default()
      }
      Err(err) => {
        tracing::warn!(error = %err, "ignoring unusable settings file");
        Self::default()
      }
    }
  }

  /// Read settings from a specific JSON or YAML file.
  ///
  /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as JSON.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
        path: path.to_path_buf(),
        source,
      })
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::ParseJson {
        path: path.to_path_buf(),
        source,
      })
    }
  }

  /// Overlay values from the `TINY_CDN_*` process environment.
  pub fn apply_env_overrides(self) -> Self {
    self.apply_overrides_from(|key| std::env::var(key).ok())
  }

  /// Overlay values produced by `lookup`, keyed by the `TINY_CDN_*` variable names.
  ///
  /// Blank values are ignored.
  pub fn apply_overrides_from<F>(mut self, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let read = |key: &str| {
      lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    if let Some(value) = read(ENV_INCLUDES_URL) {
      self.includes_url = Some(value);
    }
    if let Some(value) = read(ENV_CONTENT_URL) {
      self.content_url = Some(value);
    }
    if let Some(value) = read(ENV_EXCLUDES) {
      self.excludes = value;
    }
    if let Some(value) = read(ENV_CAPABILITY) {
      self.capability = value;
    }
    if let Some(value) = read(ENV_DISABLE) {
      self.disable = parse_flag(&value);
    }

    self
  }
}

fn parse_flag(value: &str) -> bool {
  matches!(
    value.to_ascii_lowercase().as_str(),
    "1" | "true" | "yes" | "on"
  )
}

/// Canonical local origins that get replaced by their CDN counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteOrigins {
  /// Base URL of the platform's internal script library.
  pub includes_url: String,
  /// Base URL of themes, plugins and uploads.
  pub content_url: String,
}

impl SiteOrigins {
  /// Derive both origins from the site URL using the platform's default directory names.
  pub fn from_site_url(site_url: &str) -> Self {
    let base = site_url.trim_end_matches('/');
    Self {
      includes_url: format!("{base}/wp-includes"),
      content_url: format!("{base}/wp-content"),
    }
  }
}
