#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod rewrite;

pub use config::{CdnSettings, SiteOrigins};
pub use error::ConfigError;
pub use hooks::{HostContext, RewritePass, TinyCdn, UnknownHook, UrlHook};
pub use rewrite::{
  ExcludePattern, OriginMapping, RewriteConfig, UploadDir, apply_upload_paths, rewrite_asset,
  rewrite_content_only, scan_and_rewrite,
};
