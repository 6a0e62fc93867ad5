//! Rewrites image sources inside rendered post content.

use std::borrow::Cow;

use regex::{Captures, Regex};

use super::engine::{RewriteConfig, rewrite_content_only};

/// Matches editor-inserted images: `src` followed later in the same tag by `alt`.
///
/// Attribute names must follow whitespace, so `data-src` and `data-alt` never stand in for them.
fn editor_image_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(<img\s(?:[^>]*\s)?src=")([^"]+)("\s(?:[^>]*\s)?alt="[^"]*")"#)
      .expect("invalid editor image regex")
  })
}

/// Rewrite the `src` of every editor-inserted `<img>` tag in an HTML fragment.
///
/// The fragment is not parsed; text outside the captured URLs is copied through byte for byte.
/// Tags without an `alt` attribute after `src` are left alone.
pub fn scan_and_rewrite(html: &str, cfg: &RewriteConfig) -> String {
  if cfg.is_bypassed() {
    return html.to_string();
  }

  let rewritten: Cow<'_, str> = editor_image_pattern().replace_all(html, |caps: &Captures<'_>| {
    format!(
      "{}{}{}",
      &caps[1],
      rewrite_content_only(&caps[2], cfg),
      &caps[3]
    )
  });
  rewritten.into_owned()
}
