//! Request classification shared by the edge handler and the CLI tools.
//!
//! Exactly one copy of the crawler signature list and the static-asset
//! extension list lives here. Every runtime consults the same tables, so the
//! server and the preview tool can never disagree about what counts as a bot.

mod bot;
mod static_resource;

pub use bot::{is_bot, BOT_SIGNATURES};
pub use static_resource::{is_static_resource, STATIC_EXTENSIONS};
