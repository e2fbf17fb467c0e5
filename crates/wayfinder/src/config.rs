//! Configuration file (site.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wayfinder_page::Markup;
use wayfinder_static::BuildConfig;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub annotate: Markup,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_content")]
    pub content: String,
    #[serde(default = "default_output")]
    pub output: String,
    /// Directory with layout templates overriding the built-in ones
    pub templates: Option<String>,
    /// Paths to CSS stylesheets to process and include
    #[serde(default)]
    pub styles: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            base_url: default_base_url(),
            content: default_content(),
            output: default_output(),
            templates: None,
            styles: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
    #[serde(default)]
    pub clean: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            clean: false,
        }
    }
}

fn default_title() -> String {
    "Documentation".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_content() -> String {
    "content".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    /// Turn the file settings into a builder configuration.
    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            content_dir: PathBuf::from(&self.site.content),
            output_dir: PathBuf::from(&self.site.output),
            templates_dir: self.site.templates.as_ref().map(PathBuf::from),
            styles: self.site.styles.iter().map(PathBuf::from).collect(),
            minify: self.build.minify,
            clean: self.build.clean,
            base_url: self.site.base_url.clone(),
            title: self.site.title.clone(),
            markup: self.annotate.clone(),
            live_reload: None,
        }
    }
}

/// Load configuration from the given path if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
