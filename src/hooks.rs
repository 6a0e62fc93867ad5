//! Host-facing extension points that route output-generation events into the rewrite engine.

use std::fmt;
use std::str::FromStr;

use crate::config::{CdnSettings, SiteOrigins};
use crate::error::ConfigError;
use crate::rewrite::{
  RewriteConfig, UploadDir, apply_upload_paths, rewrite_asset, rewrite_content_only,
  scan_and_rewrite,
};

/// Signals the host platform supplies at the start of each request.
pub trait HostContext {
  /// Returns `true` for administrative or build-time requests.
  fn is_admin(&self) -> bool;

  /// Returns `true` when the host serves unminified debug scripts.
  fn script_debug(&self) -> bool {
    false
  }

  /// Returns `true` when the current principal holds `capability`.
  fn has_capability(&self, capability: &str) -> bool;
}

/// URL-valued extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlHook {
  /// `<script>` source URLs.
  ScriptLoaderSrc,
  /// `<link>` stylesheet URLs.
  StyleLoaderSrc,
  /// Plugin asset base URLs.
  PluginsUrl,
  /// Theme root URLs.
  ThemeRootUri,
}

impl UrlHook {
  /// Every URL hook, in registration order.
  pub const ALL: [UrlHook; 4] = [
    UrlHook::ScriptLoaderSrc,
    UrlHook::StyleLoaderSrc,
    UrlHook::PluginsUrl,
    UrlHook::ThemeRootUri,
  ];

  /// Host name of the extension point.
  pub fn name(self) -> &'static str {
    match self {
      UrlHook::ScriptLoaderSrc => "script_loader_src",
      UrlHook::StyleLoaderSrc => "style_loader_src",
      UrlHook::PluginsUrl => "plugins_url",
      UrlHook::ThemeRootUri => "theme_root_uri",
    }
  }

  /// Look up a hook by its host name.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|hook| hook.name() == name)
  }

  /// Script and style URLs may point at either origin; the others only at content.
  fn rewrites_includes(self) -> bool {
    matches!(self, UrlHook::ScriptLoaderSrc | UrlHook::StyleLoaderSrc)
  }
}

impl fmt::Display for UrlHook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Error returned when parsing an unknown hook name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown url hook `{0}`")]
pub struct UnknownHook(pub String);

impl FromStr for UrlHook {
  type Err = UnknownHook;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    Self::from_name(value).ok_or_else(|| UnknownHook(value.to_string()))
  }
}

/// Long-lived rewriter holding settings and site origins; produces one pass per request.
#[derive(Debug, Clone)]
pub struct TinyCdn {
  settings: CdnSettings,
  origins: SiteOrigins,
}

impl TinyCdn {
  /// Create a rewriter for the provided settings and site origins.
  pub fn new(settings: CdnSettings, origins: SiteOrigins) -> Self {
    Self { settings, origins }
  }

  /// Settings in effect.
  pub fn settings(&self) -> &CdnSettings {
    &self.settings
  }

  /// Start a render pass for the current request.
  ///
  /// Returns `None` when the host reports an administrative or script-debug request, in which
  /// case no hook should be registered at all. An invalid exclusion pattern is logged and
  /// yields a pass that leaves every URL unchanged.
  pub fn begin_pass<H: HostContext + ?Sized>(&self, host: &H) -> Option<RewritePass> {
    match self.try_begin_pass(host) {
      Ok(pass) => pass,
      Err(err) => {
        tracing::error!(error = %err, "tiny-cdn disabled for this request");
        Some(RewritePass::new(RewriteConfig::passthrough()))
      }
    }
  }

  /// Like [`TinyCdn::begin_pass`], but returns configuration errors to the caller.
  pub fn try_begin_pass<H: HostContext + ?Sized>(
    &self,
    host: &H,
  ) -> Result<Option<RewritePass>, ConfigError> {
    if host.is_admin() || host.script_debug() {
      tracing::debug!("tiny-cdn not engaged for admin or script-debug request");
      return Ok(None);
    }

    let bypass = if self.settings.disable {
      tracing::debug!("tiny-cdn bypassed: disabled by settings");
      true
    } else if host.has_capability(&self.settings.capability) {
      tracing::debug!(
        capability = %self.settings.capability,
        "tiny-cdn bypassed: principal holds capability"
      );
      true
    } else {
      false
    };

    let config = RewriteConfig::from_settings(&self.settings, &self.origins, bypass)?;
    if !bypass {
      tracing::debug!(
        includes = config.includes().is_some(),
        content = config.content().is_some(),
        excludes = config.excludes().as_str(),
        "tiny-cdn pass engaged"
      );
    }
    Ok(Some(RewritePass::new(config)))
  }
}

/// A single request's rewrite pass; every hook method is a pure value transform.
#[derive(Debug, Clone)]
pub struct RewritePass {
  config: RewriteConfig,
}

impl RewritePass {
  /// Wrap an already-built configuration.
  pub fn new(config: RewriteConfig) -> Self {
    Self { config }
  }

  /// Configuration backing the pass.
  pub fn config(&self) -> &RewriteConfig {
    &self.config
  }

  /// Filter a URL emitted at one of the URL extension points.
  pub fn filter_url(&self, hook: UrlHook, url: &str) -> String {
    if hook.rewrites_includes() {
      rewrite_asset(url, &self.config)
    } else {
      rewrite_content_only(url, &self.config)
    }
  }

  /// Filter the host's upload directory record.
  pub fn filter_upload_dir(&self, upload: UploadDir) -> UploadDir {
    apply_upload_paths(upload, &self.config)
  }

  /// Filter a rendered content body.
  pub fn filter_content(&self, html: &str) -> String {
    scan_and_rewrite(html, &self.config)
  }
}
