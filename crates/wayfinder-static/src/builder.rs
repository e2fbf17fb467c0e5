//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use wayfinder_page::{annotate, parse_page, Markup, ParsedPage, SourceFormat};

use crate::assets::AssetPipeline;
use crate::templates::{Context, TemplateEngine};

const DEFAULT_TEMPLATE: &str = "page.html";

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source content directory
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Directory with layout templates overriding the built-in ones
    pub templates_dir: Option<PathBuf>,

    /// Paths to CSS stylesheets to include
    pub styles: Vec<PathBuf>,

    /// Minify CSS output
    pub minify: bool,

    /// Remove the output directory before building
    pub clean: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Class names and snippets used by the annotator
    pub markup: Markup,

    /// Live reload script URL injected into every page
    pub live_reload: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("dist"),
            templates_dir: None,
            styles: vec![],
            minify: true,
            clean: false,
            base_url: "/".to_string(),
            title: "Documentation".to_string(),
            markup: Markup::default(),
            live_reload: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of top-level headings annotated
    pub headings: usize,

    /// Number of sidebar entries generated
    pub entries: usize,

    /// Number of back-to-top links inserted
    pub back_links: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content: {0}")]
    ReadError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("{first} and {second} both write {output}")]
    OutputConflict {
        output: String,
        first: String,
        second: String,
    },

    #[error("Refusing to clean {output}: it contains {input}")]
    UnsafeClean { output: String, input: String },
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Relative path from the content dir
    relative_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    /// Parsed source
    page: ParsedPage,
}

/// Per-page annotation counts.
#[derive(Debug, Default)]
struct PageStats {
    headings: usize,
    entries: usize,
    back_links: usize,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        if let Some(dir) = &config.templates_dir {
            if dir.is_dir() {
                tracing::info!("Using templates from {}", dir.display());
            } else {
                tracing::warn!("Templates directory not found: {}", dir.display());
            }
        }

        let templates = TemplateEngine::new(config.templates_dir.as_deref());

        Self { config, templates }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.config.clean && self.config.output_dir.exists() {
            self.check_clean_target()?;
            tracing::info!("Cleaning {}", self.config.output_dir.display());
            fs::remove_dir_all(&self.config.output_dir)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = self.discover_pages()?;

        // Annotate and render pages in parallel
        let results: Vec<Result<PageStats, BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page))
            .collect();

        let mut result = BuildResult {
            output_dir: self.config.output_dir.clone(),
            ..Default::default()
        };

        for stats in results {
            let stats = stats?;
            result.pages += 1;
            result.headings += stats.headings;
            result.entries += stats.entries;
            result.back_links += stats.back_links;
        }

        self.generate_assets()?;

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Refuse to clean an output directory that holds any of the site's inputs.
    fn check_clean_target(&self) -> Result<(), BuildError> {
        let Ok(output) = self.config.output_dir.canonicalize() else {
            return Ok(());
        };

        let inputs = std::iter::once(&self.config.content_dir)
            .chain(self.config.templates_dir.iter())
            .chain(self.config.styles.iter());

        for input in inputs {
            let Ok(canonical) = input.canonicalize() else {
                continue;
            };
            if canonical.starts_with(&output) {
                return Err(BuildError::UnsafeClean {
                    output: self.config.output_dir.display().to_string(),
                    input: input.display().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Discover all page sources in the content directory.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        let mut pages = Vec::new();

        if !self.config.content_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Content directory not found: {}",
                self.config.content_dir.display()
            )));
        }

        // Compared canonically: `./dist` and `dist` are the same directory.
        let output_dir = self.config.output_dir.canonicalize().ok();
        let is_output = |entry: &walkdir::DirEntry| {
            entry.file_type().is_dir()
                && output_dir.is_some()
                && entry.path().canonicalize().ok() == output_dir
        };

        for entry in WalkDir::new(&self.config.content_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_output(e))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(format) = SourceFormat::from_path(path) else {
                continue;
            };

            let source = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let page =
                parse_page(&source, format, &self.config.markup).map_err(|e| {
                    BuildError::ParseError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    }
                })?;

            let relative_path = path
                .strip_prefix(&self.config.content_dir)
                .unwrap_or(path)
                .to_path_buf();

            let output_path = self.calculate_output_path(&relative_path, &page);

            tracing::debug!("Discovered {}", relative_path.display());

            pages.push(PageInfo {
                relative_path,
                output_path,
                page,
            });
        }

        pages.sort_by(|a, b| {
            let order = |p: &PageInfo| p.page.frontmatter.as_ref().and_then(|f| f.order).unwrap_or(999);
            order(a)
                .cmp(&order(b))
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        let mut written: HashMap<&Path, &Path> = HashMap::new();
        for page in &pages {
            if let Some(first) = written.insert(&page.output_path, &page.relative_path) {
                return Err(BuildError::OutputConflict {
                    output: page.output_path.display().to_string(),
                    first: first.display().to_string(),
                    second: page.relative_path.display().to_string(),
                });
            }
        }

        Ok(pages)
    }

    /// Calculate output path for a page.
    ///
    /// `guide/setup.md` becomes `guide/setup.html`; a frontmatter slug
    /// replaces the file stem.
    fn calculate_output_path(&self, relative: &Path, page: &ParsedPage) -> PathBuf {
        let parent = relative.parent().unwrap_or(Path::new(""));

        let slug = page.frontmatter.as_ref().and_then(|f| f.slug.as_deref());
        match slug {
            Some(slug) => self
                .config
                .output_dir
                .join(parent)
                .join(format!("{}.html", slug)),
            None => self
                .config
                .output_dir
                .join(relative.with_extension("html")),
        }
    }

    /// Annotate and render a single page.
    fn build_page(&self, info: &PageInfo) -> Result<PageStats, BuildError> {
        let markup = &self.config.markup;
        let mut document = info.page.document.clone();
        let annotation = annotate(&mut document);

        let fm = info.page.frontmatter.as_ref();
        let title = fm
            .and_then(|f| f.title.clone())
            .unwrap_or_else(|| self.config.title.clone());
        let template = fm
            .and_then(|f| f.template.clone())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

        let context = Context {
            title,
            site_title: self.config.title.clone(),
            description: fm.and_then(|f| f.description.clone()),
            content: document.to_html(markup),
            sidebar_html: annotation.sidebar.to_html(markup),
            sidebar: annotation.sidebar.clone(),
            markup: markup.clone(),
            base_url: self.config.base_url.clone(),
            styles: self.stylesheet_urls(),
            live_reload: self.config.live_reload.clone(),
        };

        let html = self
            .templates
            .render_page(&template, &context)
            .map_err(|e| {
                BuildError::TemplateError(format!("{}: {}", info.relative_path.display(), e))
            })?;

        if let Some(parent) = info.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&info.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        tracing::debug!(
            "Wrote {} ({} sidebar entries)",
            info.output_path.display(),
            annotation.sidebar.len()
        );

        Ok(PageStats {
            headings: annotation.outline.len(),
            entries: annotation.sidebar.len(),
            back_links: annotation.back_links,
        })
    }

    /// URLs of the stylesheets every page links.
    fn stylesheet_urls(&self) -> Vec<String> {
        std::iter::once("main.css")
            .chain(self.config.styles.iter().map(|s| stylesheet_name(s)))
            .map(|name| format!("{}assets/{}", self.config.base_url, name))
            .collect()
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = self.process_css(AssetPipeline::generate_css());
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js(&self.config.markup);
        fs::write(assets_dir.join("wayfinder.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        for style_path in &self.config.styles {
            if !style_path.exists() {
                tracing::warn!("Stylesheet not found: {}", style_path.display());
                continue;
            }

            let content = fs::read_to_string(style_path).map_err(|e| {
                BuildError::ReadError(format!("Failed to read stylesheet: {}", e))
            })?;
            let css = self.process_css(content);
            fs::write(assets_dir.join(stylesheet_name(style_path)), css)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
            tracing::info!("Processed stylesheet {}", style_path.display());
        }

        Ok(())
    }

    /// Minify CSS when configured, keeping the source if it fails to parse.
    fn process_css(&self, css: String) -> String {
        if !self.config.minify {
            return css;
        }
        match AssetPipeline::minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Skipping minification: {}", e);
                css
            }
        }
    }
}

fn stylesheet_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("style.css")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn site(temp: &Path) -> BuildConfig {
        BuildConfig {
            content_dir: temp.join("content"),
            output_dir: temp.join("dist"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn builds_annotated_page() {
        let temp = tempdir().unwrap();
        let config = site(temp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(
            config.content_dir.join("index.md"),
            r#"---
title: Guide
---
## Setup & Install

### Requirements

## Usage

## Support
"#,
        )
        .unwrap();

        let result = StaticBuilder::new(config.clone()).build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.headings, 3);
        assert_eq!(result.entries, 3);
        assert_eq!(result.back_links, 2);

        let html = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
        assert!(html.contains("<title>Guide - Documentation</title>"));
        assert!(html.contains(r##"<h2 id="setup-n-install"><a class="header-link" href="#setup-n-install">"##));
        assert!(html.contains(r#"<h3 id="setup-n-install-requirements">Requirements</h3>"#));
        assert!(html.contains(r##"<li class="level1 active"><a href="#setup-n-install">Setup &amp; Install</a><ul class="nav"><li><a href="#setup-n-install-requirements">Requirements</a></li></ul></li>"##));
        assert!(html.contains(r##"<li class="level1"><a href="#usage">Usage</a></li>"##));
        assert_eq!(html.matches("back to top</a>").count(), 2);

        assert!(config.output_dir.join("assets/main.css").exists());
        assert!(config.output_dir.join("assets/wayfinder.js").exists());
    }

    #[tokio::test]
    async fn builds_html_fragments_and_nested_paths() {
        let temp = tempdir().unwrap();
        let config = site(temp.path());
        let kit = config.content_dir.join("kit");
        fs::create_dir_all(&kit).unwrap();
        fs::write(kit.join("colors.html"), "<h2>Brand</h2>\n<p>Blue</p>\n").unwrap();
        fs::write(
            kit.join("type.md"),
            "---\ntitle: Type\nslug: typography\n---\n## Scale\n",
        )
        .unwrap();
        fs::write(kit.join("notes.txt"), "ignored").unwrap();

        let result = StaticBuilder::new(config.clone()).build().await.unwrap();

        assert_eq!(result.pages, 2);
        let colors = fs::read_to_string(config.output_dir.join("kit/colors.html")).unwrap();
        assert!(colors.contains(r#"<h2 id="brand">"#));
        assert!(config.output_dir.join("kit/typography.html").exists());
    }

    #[tokio::test]
    async fn clean_removes_stale_output() {
        let temp = tempdir().unwrap();
        let mut config = site(temp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.content_dir.join("index.md"), "## One\n").unwrap();
        fs::write(config.output_dir.join("stale.html"), "old").unwrap();

        StaticBuilder::new(config.clone()).build().await.unwrap();
        assert!(config.output_dir.join("stale.html").exists());

        config.clean = true;
        StaticBuilder::new(config.clone()).build().await.unwrap();
        assert!(!config.output_dir.join("stale.html").exists());
        assert!(config.output_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn processes_stylesheets() {
        let temp = tempdir().unwrap();
        let mut config = site(temp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(config.content_dir.join("index.md"), "text\n").unwrap();
        let style = temp.path().join("site.css");
        fs::write(&style, ".brand {\n  color: red;\n}\n").unwrap();
        config.styles = vec![style, temp.path().join("missing.css")];

        StaticBuilder::new(config.clone()).build().await.unwrap();

        let css = fs::read_to_string(config.output_dir.join("assets/site.css")).unwrap();
        assert!(!css.contains('\n'));
        assert!(css.contains(".brand"));
        assert!(!config.output_dir.join("assets/missing.css").exists());

        let html = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
        assert!(html.contains("site.css"));
    }

    #[tokio::test]
    async fn uses_frontmatter_template() {
        let temp = tempdir().unwrap();
        let mut config = site(temp.path());
        let templates = temp.path().join("templates");
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("bare.html"),
            "<main>{{ content | safe }}</main><nav>{{ sidebar_html | safe }}</nav>",
        )
        .unwrap();
        fs::write(
            config.content_dir.join("index.md"),
            "---\ntitle: Bare\ntemplate: bare.html\n---\n## Only\n",
        )
        .unwrap();
        config.templates_dir = Some(templates);

        StaticBuilder::new(config.clone()).build().await.unwrap();

        let html = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
        assert!(html.starts_with("<main><h2 id=\"only\">"));
        assert!(html.contains(r##"<nav><li class="level1 active"><a href="#only">Only</a></li>"##));
    }

    #[tokio::test]
    async fn rejects_pages_with_the_same_output() {
        let temp = tempdir().unwrap();
        let config = site(temp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(config.content_dir.join("guide.md"), "## Markdown\n").unwrap();
        fs::write(config.content_dir.join("guide.html"), "<h2>Fragment</h2>\n").unwrap();

        let result = StaticBuilder::new(config).build().await;

        match result {
            Err(BuildError::OutputConflict { output, .. }) => {
                assert!(output.ends_with("guide.html"))
            }
            other => panic!("expected output conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn clean_refuses_output_holding_sources() {
        let temp = tempdir().unwrap();
        let config = BuildConfig {
            content_dir: temp.path().join("content"),
            output_dir: temp.path().to_path_buf(),
            clean: true,
            ..Default::default()
        };
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(config.content_dir.join("index.md"), "## Keep\n").unwrap();

        let result = StaticBuilder::new(config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::UnsafeClean { .. })));
        assert!(config.content_dir.join("index.md").exists());
    }

    #[tokio::test]
    async fn skips_output_inside_content_dir() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("site");
        fs::create_dir_all(&content).unwrap();
        fs::create_dir_all(temp.path().join("other")).unwrap();
        fs::write(content.join("index.md"), "## Home\n").unwrap();
        // Spelled differently from the paths the walk yields.
        let config = BuildConfig {
            content_dir: content.clone(),
            output_dir: temp.path().join("other/../site/dist"),
            ..Default::default()
        };

        StaticBuilder::new(config.clone()).build().await.unwrap();
        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert!(content.join("dist/index.html").exists());
        assert!(!content.join("dist/dist").exists());
    }

    #[tokio::test]
    async fn errors_on_missing_content_dir() {
        let temp = tempdir().unwrap();

        let result = StaticBuilder::new(site(temp.path())).build().await;

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }

    #[tokio::test]
    async fn reports_parse_errors_with_path() {
        let temp = tempdir().unwrap();
        let config = site(temp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(config.content_dir.join("broken.md"), "---\ntitle: x\n").unwrap();

        let result = StaticBuilder::new(config).build().await;

        match result {
            Err(BuildError::ParseError { path, .. }) => assert!(path.ends_with("broken.md")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
