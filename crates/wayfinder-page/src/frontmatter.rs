//! YAML header block at the top of a page source.

use serde::Deserialize;

const FENCE: &str = "---";
const TERMINATORS: [&str; 2] = ["---", "..."];

/// Per-page settings read from the header block.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Frontmatter {
    /// Page title; the site title is used when absent
    pub title: Option<String>,

    /// Text for the description meta tag
    pub description: Option<String>,

    /// Sort key, lower first
    pub order: Option<i32>,

    /// Output file name override, without extension
    pub slug: Option<String>,

    /// Layout template override
    pub template: Option<String>,
}

/// Split a page source into its header block and body.
///
/// The block must open on the first non-blank line with `---` and close
/// with a line holding only `---` or `...`. An empty block yields default
/// settings.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let start = source.len() - source.trim_start().len();
    let rest = &source[start..];

    let mut lines = rest.split_inclusive('\n');
    let yaml_start = match lines.next() {
        Some(first) if first.trim_end() == FENCE => start + first.len(),
        _ => return Ok((None, source)),
    };

    let mut offset = yaml_start;
    for line in lines {
        if TERMINATORS.contains(&line.trim_end()) {
            let yaml = &source[yaml_start..offset];
            let body = &source[offset + line.len()..];
            return Ok((Some(parse_yaml(yaml)?), body.trim_start()));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed {
        line: source[..start].matches('\n').count() + 1,
    })
}

fn parse_yaml(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))
}

/// Errors from reading the header block.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Frontmatter opened on line {line} is never closed")]
    Unclosed { line: usize },

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
