//! Request handlers for the edge service.

mod edge;
mod status;

pub use edge::edge_request;
pub use status::service_status;
