//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use wayfinder_static::StaticBuilder;

use crate::config::load_config;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    minify: Option<bool>,
    clean: bool,
) -> Result<()> {
    tracing::info!("Building site...");

    let file_config = load_config(config_path)?;

    let mut config = file_config.to_build_config();
    if let Some(output) = output {
        config.output_dir = output;
    }
    config.minify = minify.unwrap_or(config.minify);
    config.clean |= clean;

    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages ({} headings, {} sidebar entries, {} back-to-top links) in {}ms",
        result.pages,
        result.headings,
        result.entries,
        result.back_links,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
