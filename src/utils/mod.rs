//! Shared utility functions.

mod html;

pub use html::escape_attr;
