//! dynrender - bot-aware dynamic rendering edge service.
//!
//! Sits in front of an origin web application, serves search-engine crawlers
//! a prerendered HTML snapshot with rewritten SEO metadata, and proxies all
//! other traffic through untouched.

mod cli;
mod config;
mod detect;
mod models;
mod render;
mod seo;
mod server;
mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "dynrender=debug"
    } else {
        "dynrender=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
