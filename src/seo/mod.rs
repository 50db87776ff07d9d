//! SEO metadata handling.
//!
//! `inject` rewrites the `<head>` of served snapshots; `extract` is the
//! read-only counterpart used by the preview tool.

mod extract;
mod inject;

pub use extract::{extract_meta, PageMeta};
pub use inject::inject_meta;
