//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings, Settings, DEFAULT_PORT};
use crate::detect::BOT_SIGNATURES;

#[derive(Parser)]
#[command(name = "dynrender")]
#[command(about = "Bot-aware dynamic rendering edge service")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the edge service
    Serve {
        /// Bind address: a port, a host, or host:port (defaults to config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch a URL the way a crawler would and report its SEO metadata
    Preview {
        /// URL to inspect
        url: String,
        /// Spoof a Googlebot user agent
        #[arg(long)]
        as_bot: bool,
        /// Use a custom user agent instead
        #[arg(long, conflicts_with = "as_bot")]
        user_agent: Option<String>,
    },

    /// Render routes through the snapshot pipeline and write HTML files
    Generate {
        /// Routes to render (e.g. / /about /blog/my-post)
        routes: Vec<String>,
        /// Output directory
        #[arg(short, long, default_value = "snapshots")]
        output: PathBuf,
    },

    /// Classify a user agent string against the crawler signature list
    Classify {
        /// User agent string to test
        user_agent: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()));
    let settings = load_settings(config_path.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => cmd_serve(&settings, bind.as_deref()).await,
        Commands::Preview {
            url,
            as_bot,
            user_agent,
        } => super::preview::cmd_preview(&settings, &url, as_bot, user_agent.as_deref()).await,
        Commands::Generate { routes, output } => {
            super::generate::cmd_generate(&settings, &routes, &output).await
        }
        Commands::Classify { user_agent } => {
            cmd_classify(&user_agent);
            Ok(())
        }
    }
}

/// Start the edge service.
async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(&settings.server.bind);
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Fronting origin {}",
        style("→").cyan(),
        settings.origin.url
    );
    match &settings.renderer.base_url {
        Some(url) => println!("{} Renderer: {}", style("→").cyan(), url),
        None => println!(
            "{} No renderer configured; snapshots use the origin response",
            style("→").cyan()
        ),
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Report how a user agent string classifies.
fn cmd_classify(user_agent: &str) {
    let ua_lower = user_agent.to_ascii_lowercase();
    match BOT_SIGNATURES.iter().find(|sig| ua_lower.contains(**sig)) {
        Some(sig) => println!("{} bot (matched \"{}\")", style("✓").green(), sig),
        None => println!("{} not a bot", style("✗").yellow()),
    }
}

/// Parse a bind address that can be:
/// - Just a port: "8043" -> 127.0.0.1:8043
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8043
/// - Host and port: "0.0.0.0:8043" -> 0.0.0.0:8043
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), DEFAULT_PORT))
}
