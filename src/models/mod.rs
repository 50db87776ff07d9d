//! Request-scoped data types for the rendering pipeline.

mod meta;
mod snapshot;

pub use meta::MetaConfig;
pub use snapshot::{Classification, Snapshot};
