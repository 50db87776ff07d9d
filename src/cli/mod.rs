//! Command-line interface.

mod commands;
mod generate;
mod preview;

pub use commands::{is_verbose, run};
