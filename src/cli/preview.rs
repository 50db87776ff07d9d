//! SEO preview command.
//!
//! Fetches a URL with either the service's own user agent or a spoofed
//! crawler user agent, runs the shared classifier on it, and prints the
//! metadata a search engine would see. Purely a developer tool; has no
//! effect on served traffic.

use std::time::Instant;

use console::style;

use crate::config::Settings;
use crate::detect;
use crate::seo;

/// User agent used by `--as-bot`.
const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

pub async fn cmd_preview(
    settings: &Settings,
    url: &str,
    as_bot: bool,
    user_agent: Option<&str>,
) -> anyhow::Result<()> {
    let ua = match (user_agent, as_bot) {
        (Some(custom), _) => custom.to_string(),
        (None, true) => GOOGLEBOT_UA.to_string(),
        (None, false) => settings.renderer.user_agent.clone(),
    };

    println!("{} Fetching {}", style("→").cyan(), url);
    println!("  User-Agent: {}", ua);
    if detect::is_bot(Some(&ua)) {
        println!("  Classified as: {}", style("bot").green());
    } else {
        println!("  Classified as: {}", style("browser").yellow());
    }

    let client = reqwest::Client::builder()
        .user_agent(&ua)
        .gzip(true)
        .brotli(true)
        .build()?;

    let start = Instant::now();
    let response = client
        .get(url)
        .timeout(settings.renderer.timeout())
        .send()
        .await?;
    let status = response.status();
    let prerendered = response
        .headers()
        .get("x-prerendered")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let html = response.text().await?;
    let elapsed = start.elapsed();

    println!(
        "  Status: {} ({} bytes in {} ms)",
        status,
        html.len(),
        elapsed.as_millis()
    );
    if let Some(value) = prerendered {
        println!("  x-prerendered: {}", value);
    }
    println!();

    let meta = seo::extract_meta(&html);

    print_field("Title", meta.title.as_deref());
    print_field("Description", meta.description.as_deref());
    print_field("Keywords", meta.keywords.as_deref());
    print_field("Robots", meta.robots.as_deref());
    print_field("Canonical", meta.canonical.as_deref());

    println!();
    if meta.open_graph.is_empty() {
        println!("  {} Open Graph: none", style("✗").red());
    } else {
        println!("  {} Open Graph:", style("✓").green());
        for (property, content) in &meta.open_graph {
            println!("      {} = {}", property, content);
        }
    }
    if meta.twitter.is_empty() {
        println!("  {} Twitter Card: none", style("✗").red());
    } else {
        println!("  {} Twitter Card:", style("✓").green());
        for (name, content) in &meta.twitter {
            println!("      {} = {}", name, content);
        }
    }

    println!();
    if meta.structured_data.is_empty() && meta.invalid_structured_data == 0 {
        println!("  {} Structured data: none", style("✗").red());
    } else {
        for value in &meta.structured_data {
            let kind = value["@type"].as_str().unwrap_or("unknown");
            println!("  {} JSON-LD: @type = {}", style("✓").green(), kind);
        }
        if meta.invalid_structured_data > 0 {
            println!(
                "  {} {} JSON-LD block(s) failed to parse",
                style("✗").red(),
                meta.invalid_structured_data
            );
        }
    }

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {} {}: {}", style("✓").green(), label, v),
        None => println!("  {} {}: missing", style("✗").red(), label),
    }
}
