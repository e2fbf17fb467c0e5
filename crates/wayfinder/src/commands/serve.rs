//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::load_config;

/// Router serving a built site, with `404.html` as the not-found page when present.
fn preview_router(dir: &Path) -> Router {
    let files = ServeDir::new(dir).append_index_html_on_directories(true);
    let not_found = dir.join("404.html");

    if not_found.is_file() {
        Router::new().fallback_service(files.not_found_service(ServeFile::new(not_found)))
    } else {
        Router::new().fallback_service(files)
    }
}

/// Directory to preview: the flag if given, else the configured output.
fn serve_dir(config_path: &Path, dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(PathBuf::from(load_config(config_path)?.site.output)),
    }
}

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let dir = serve_dir(config_path, dir)?;
    if !dir.is_dir() {
        anyhow::bail!(
            "Directory not found: {}. Run 'wayfinder build' first.",
            dir.display()
        );
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    if open {
        if let Err(e) = open::that(format!("http://{}", addr)) {
            tracing::debug!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, preview_router(&dir)).await?;

    Ok(())
}
