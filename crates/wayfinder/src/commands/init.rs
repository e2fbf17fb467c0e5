//! Scaffold a site in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files written by `init`, relative to the current directory.
const SCAFFOLD: &[(&str, &str)] = &[
    ("content/index.md", DEFAULT_INDEX),
    ("stylesheets/site.css", DEFAULT_STYLESHEET),
];

/// Run the init command.
pub async fn run(config_path: &Path, overwrite: bool) -> Result<()> {
    tracing::info!("Initializing wayfinder site...");

    write_file(config_path, DEFAULT_CONFIG, overwrite)?;
    for (path, content) in SCAFFOLD {
        write_file(Path::new(path), content, overwrite)?;
    }
    fs::create_dir_all("templates").context("Failed to create templates directory")?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'wayfinder dev' to start the development server.");

    Ok(())
}

/// Write a scaffold file unless it exists and overwriting is off.
fn write_file(path: &Path, content: &str, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(true)
}

const DEFAULT_CONFIG: &str = r#"# wayfinder configuration

[site]
title = "My Documentation"
base_url = "/"

# Page sources (.md and .html)
content = "content"

# Output directory for the built site
output = "dist"

# Layout templates overriding base.html, page.html and sidebar.html
templates = "templates"

# Stylesheets to process and include on every page
styles = ["stylesheets/site.css"]

[build]
minify = true
clean = false

[annotate]
# Id of the element back-to-top links jump to
top_anchor = "top"
back_to_top_label = "back to top"
# Pixels of slack before a section counts as in view
scroll_offset = 10
"#;

const DEFAULT_INDEX: &str = r#"---
title: Style Guide
order: 1
---

Every `##` heading gets an anchor link and a sidebar entry. Every `###`
heading below it is nested in the sidebar.

## Colors & Type

### Palette

Brand colors go here.

### Typography

Font stacks go here.

## Components

### Buttons

Button examples go here.

## Getting Started

Run `wayfinder build` to produce the static site in `dist/`.
"#;

const DEFAULT_STYLESHEET: &str = r#"/* Site styles, processed on every build */

.content h2 {
  color: #24292f;
}
"#;
