//! The rewrite engine and the content scanner built on top of it.
//!
//! Every operation here is a total function of its input and a [`RewriteConfig`]: excluded
//! URLs, unconfigured origins and bypassed passes all resolve to the identity.

mod content;
mod engine;
mod exclude;

pub use content::scan_and_rewrite;
pub use engine::{
  OriginMapping, RewriteConfig, UploadDir, apply_upload_paths, rewrite_asset,
  rewrite_content_only,
};
pub use exclude::ExcludePattern;
