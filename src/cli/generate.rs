//! Snapshot generation command.
//!
//! Renders a list of routes through the snapshot pipeline and writes the
//! enhanced HTML to disk, one file per route. Failures are reported per
//! route and do not abort the run.

use std::path::{Path, PathBuf};

use console::style;

use crate::config::Settings;
use crate::render::RenderClient;
use crate::seo;

pub async fn cmd_generate(
    settings: &Settings,
    routes: &[String],
    output: &Path,
) -> anyhow::Result<()> {
    if routes.is_empty() {
        anyhow::bail!("no routes given; pass one or more paths, e.g. `dynrender generate / /about`");
    }

    let render = RenderClient::new(
        settings.renderer.base_url.clone(),
        settings.renderer.timeout(),
        &settings.renderer.user_agent,
    )?;
    tokio::fs::create_dir_all(output).await?;

    let mut written = 0usize;
    for route in routes {
        let route = normalize_route(route);
        let target = settings.origin_target(&route);

        match render.fetch(&target).await {
            Ok(snapshot) => {
                let canonical = settings.canonical_for(&route);
                let html = seo::inject_meta(&snapshot.html, &settings.site, &canonical)?;

                let file = output.join(route_output_path(&route));
                if let Some(parent) = file.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&file, html).await?;

                println!("{} {} -> {}", style("✓").green(), route, file.display());
                written += 1;
            }
            Err(err) => {
                eprintln!("{} {}: {}", style("✗").red(), route, err);
            }
        }
    }

    println!(
        "{} Wrote {} snapshot(s) to {}",
        style("→").cyan(),
        written,
        output.display()
    );
    Ok(())
}

fn normalize_route(route: &str) -> String {
    if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{route}")
    }
}

/// Map a route to its output file: `/` -> `index.html`,
/// `/about` -> `about/index.html`, `/page.html` -> `page.html`.
fn route_output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else if trimmed.ends_with(".html") {
        PathBuf::from(trimmed)
    } else {
        Path::new(trimmed).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_output_path() {
        assert_eq!(route_output_path("/"), PathBuf::from("index.html"));
        assert_eq!(route_output_path("/about"), PathBuf::from("about/index.html"));
        assert_eq!(
            route_output_path("/blog/my-post"),
            PathBuf::from("blog/my-post/index.html")
        );
        assert_eq!(route_output_path("/page.html"), PathBuf::from("page.html"));
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("about"), "/about");
        assert_eq!(normalize_route("/about"), "/about");
    }

    #[tokio::test]
    async fn test_generate_writes_snapshot_files() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head></head><body>home</body></html>")
            .create_async()
            .await;
        origin
            .mock("GET", "/about")
            .with_status(200)
            .with_body("<html><head></head><body>about</body></html>")
            .create_async()
            .await;

        let mut settings = Settings::default();
        settings.origin.url = origin.url();
        settings.site.base_url = "https://example.com".to_string();

        let dir = tempfile::tempdir().unwrap();
        let routes = vec!["/".to_string(), "/about".to_string()];
        cmd_generate(&settings, &routes, dir.path()).await.unwrap();

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("home"));
        assert!(index.contains(r#"<link rel="canonical" href="https://example.com/">"#));

        let about = std::fs::read_to_string(dir.path().join("about/index.html")).unwrap();
        assert!(about.contains("about"));
        assert!(about.contains("application/ld+json"));
    }
}
