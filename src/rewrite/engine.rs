//! Literal origin substitution guarded by the exclusion pattern and the bypass flag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::exclude::ExcludePattern;
use crate::config::{CdnSettings, SiteOrigins};
use crate::error::ConfigError;

/// A local origin and the CDN base that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginMapping {
  /// Canonical local base URL searched for in each URL.
  pub source: String,
  /// CDN base URL written in its place.
  pub target: String,
}

impl OriginMapping {
  /// Pair a local origin with its CDN replacement.
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      target: target.into(),
    }
  }

  /// Replace every occurrence of the source origin. An empty source never matches.
  fn apply(&self, url: &str) -> String {
    if self.source.is_empty() {
      return url.to_string();
    }
    url.replace(&self.source, &self.target)
  }
}

/// Request-scoped rewrite settings, read-only once built.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
  includes: Option<OriginMapping>,
  content: Option<OriginMapping>,
  excludes: ExcludePattern,
  bypass: bool,
}

impl RewriteConfig {
  /// Configuration with no origin mappings and the given exclusion pattern.
  pub fn new(excludes: ExcludePattern) -> Self {
    Self {
      includes: None,
      content: None,
      excludes,
      bypass: false,
    }
  }

  /// Build the pass configuration from settings, failing fast on an invalid exclusion pattern.
  pub fn from_settings(
    settings: &CdnSettings,
    origins: &SiteOrigins,
    bypass: bool,
  ) -> Result<Self, ConfigError> {
    let excludes = ExcludePattern::new(&settings.excludes)?;
    let includes = settings
      .includes_url
      .as_ref()
      .map(|target| OriginMapping::new(origins.includes_url.as_str(), target.as_str()));
    let content = settings
      .content_url
      .as_ref()
      .map(|target| OriginMapping::new(origins.content_url.as_str(), target.as_str()));

    Ok(Self {
      includes,
      content,
      excludes,
      bypass,
    })
  }

  /// Configuration that returns every input unchanged.
  pub fn passthrough() -> Self {
    Self::new(ExcludePattern::default()).with_bypass(true)
  }

  /// Set the internal-library origin mapping.
  pub fn with_includes(mut self, mapping: OriginMapping) -> Self {
    self.includes = Some(mapping);
    self
  }

  /// Set the content origin mapping.
  pub fn with_content(mut self, mapping: OriginMapping) -> Self {
    self.content = Some(mapping);
    self
  }

  /// Set the bypass flag.
  pub fn with_bypass(mut self, bypass: bool) -> Self {
    self.bypass = bypass;
    self
  }

  /// Whether every rewrite is skipped for this pass.
  pub fn is_bypassed(&self) -> bool {
    self.bypass
  }

  /// Internal-library origin mapping, when configured.
  pub fn includes(&self) -> Option<&OriginMapping> {
    self.includes.as_ref()
  }

  /// Content origin mapping, when configured.
  pub fn content(&self) -> Option<&OriginMapping> {
    self.content.as_ref()
  }

  /// Exclusion pattern in effect.
  pub fn excludes(&self) -> &ExcludePattern {
    &self.excludes
  }

  fn skips(&self, url: &str) -> bool {
    self.bypass || self.excludes.is_excluded(url)
  }

  fn replace_includes(&self, url: String) -> String {
    match &self.includes {
      Some(mapping) => mapping.apply(&url),
      None => url,
    }
  }

  fn replace_content(&self, url: String) -> String {
    match &self.content {
      Some(mapping) => mapping.apply(&url),
      None => url,
    }
  }
}

/// Rewrite a script or stylesheet URL: includes origin first, then content origin.
pub fn rewrite_asset(url: &str, cfg: &RewriteConfig) -> String {
  if cfg.skips(url) {
    return url.to_string();
  }

  let rewritten = cfg.replace_content(cfg.replace_includes(url.to_string()));
  if rewritten != url {
    tracing::trace!(from = url, to = %rewritten, "rewrote asset url");
  }
  rewritten
}

/// Rewrite a URL that can only live under the content origin.
pub fn rewrite_content_only(url: &str, cfg: &RewriteConfig) -> String {
  if cfg.skips(url) {
    return url.to_string();
  }

  let rewritten = cfg.replace_content(url.to_string());
  if rewritten != url {
    tracing::trace!(from = url, to = %rewritten, "rewrote content url");
  }
  rewritten
}

/// Upload directory record as computed by the host.
///
/// Only `url` and `baseurl` are rewritten; every other field is carried through as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadDir {
  /// URL of the current upload subdirectory.
  pub url: String,
  /// URL of the upload root.
  #[serde(rename = "baseurl")]
  pub base_url: String,
  /// Remaining host fields (`path`, `subdir`, `basedir`, `error`, ...).
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl UploadDir {
  /// Record with only the two URL fields populated.
  pub fn new(url: impl Into<String>, base_url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      base_url: base_url.into(),
      extra: Map::new(),
    }
  }
}

/// Pass both upload URLs through [`rewrite_content_only`].
pub fn apply_upload_paths(upload: UploadDir, cfg: &RewriteConfig) -> UploadDir {
  UploadDir {
    url: rewrite_content_only(&upload.url, cfg),
    base_url: rewrite_content_only(&upload.base_url, cfg),
    extra: upload.extra,
  }
}
