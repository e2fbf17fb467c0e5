//! Page source parsing.

use std::path::Path;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::document::{Document, Heading, HeadingLevel};
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::html::HtmlScanner;
use crate::markup::Markup;

/// Format of a page source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Html,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

/// A parsed page source.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Content area blocks
    pub document: Document,
}

/// Errors that can occur when parsing a page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Parse a page source into frontmatter and a content document.
pub fn parse_page(
    source: &str,
    format: SourceFormat,
    markup: &Markup,
) -> Result<ParsedPage, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let document = match format {
        SourceFormat::Markdown => parse_markdown(content),
        SourceFormat::Html => HtmlScanner::new(markup)?.scan(content)?,
    };

    Ok(ParsedPage {
        frontmatter,
        document,
    })
}

/// A heading being collected from markdown events.
struct HeadingCapture<'a> {
    level: HeadingLevel,
    events: Vec<Event<'a>>,
    label: String,
}

impl<'a> HeadingCapture<'a> {
    fn push(&mut self, event: Event<'a>) {
        match &event {
            Event::Text(text) | Event::Code(text) => self.label.push_str(text),
            Event::SoftBreak | Event::HardBreak => self.label.push(' '),
            _ => {}
        }
        self.events.push(event);
    }

    fn finish(self) -> Heading {
        let mut inner = String::new();
        html::push_html(&mut inner, self.events.into_iter());
        Heading::new(self.level, &self.label, inner)
    }
}

/// Parse markdown into a document.
///
/// Level 2 and 3 headings at the top level become heading blocks; everything
/// else is rendered to HTML as-is.
pub fn parse_markdown(content: &str) -> Document {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut doc = Document::new();
    let mut pending: Vec<Event> = Vec::new();
    let mut capture: Option<HeadingCapture> = None;
    let mut depth = 0usize;

    for event in Parser::new_ext(content, options) {
        if let Some(mut cap) = capture.take() {
            if let Event::End(TagEnd::Heading(_)) = event {
                doc.push_heading(cap.finish());
            } else {
                cap.push(event);
                capture = Some(cap);
            }
            continue;
        }

        if let Event::Start(Tag::Heading { level, .. }) = &event {
            if depth == 0 {
                if let Some(level) = HeadingLevel::from_number(*level as u8) {
                    flush_html(&mut doc, &mut pending);
                    capture = Some(HeadingCapture {
                        level,
                        events: Vec::new(),
                        label: String::new(),
                    });
                    continue;
                }
            }
        }

        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        pending.push(event);
    }

    flush_html(&mut doc, &mut pending);
    doc
}

fn flush_html(doc: &mut Document, pending: &mut Vec<Event>) {
    if pending.is_empty() {
        return;
    }
    let mut out = String::new();
    html::push_html(&mut out, pending.drain(..));
    doc.push_html(&out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use pretty_assertions::assert_eq;

    fn headings(doc: &Document) -> Vec<(HeadingLevel, String)> {
        doc.headings()
            .map(|(_, h)| (h.level, h.label.clone()))
            .collect()
    }

    #[test]
    fn detects_format() {
        assert_eq!(
            SourceFormat::from_path(Path::new("guide.md")),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("index.HTML")),
            Some(SourceFormat::Html)
        );
        assert_eq!(SourceFormat::from_path(Path::new("site.css")), None);
    }

    #[test]
    fn parses_complete_page() {
        let source = r#"---
title: Guide
---

# Guide

Intro text.

## Setup & Install

Steps.

### Requirements

- Rust

## Usage
"#;

        let page = parse_page(source, SourceFormat::Markdown, &Markup::default()).unwrap();

        assert_eq!(page.frontmatter.unwrap().title.as_deref(), Some("Guide"));
        assert_eq!(
            headings(&page.document),
            vec![
                (HeadingLevel::Section, "Setup & Install".to_string()),
                (HeadingLevel::Subsection, "Requirements".to_string()),
                (HeadingLevel::Section, "Usage".to_string()),
            ]
        );
        match &page.document.blocks[0] {
            Block::Html(html) => {
                assert!(html.contains("<h1>Guide</h1>"));
                assert!(html.contains("<p>Intro text.</p>"));
            }
            other => panic!("expected html block, got {:?}", other),
        }
    }

    #[test]
    fn keeps_inline_markup_in_headings() {
        let doc = parse_markdown("## Using `cargo` *fast*\n");
        let (_, heading) = doc.headings().next().unwrap();

        assert_eq!(heading.label, "Using cargo fast");
        assert_eq!(heading.inner_html, "Using <code>cargo</code> <em>fast</em>");
    }

    #[test]
    fn line_breaks_in_headings_become_spaces() {
        let doc = parse_markdown("Setup\nand Install\n-----\n");
        let (_, heading) = doc.headings().next().unwrap();

        assert_eq!(heading.label, "Setup and Install");
        assert_eq!(crate::slugify(&heading.label), "setup-and-install");
    }

    #[test]
    fn ignores_headings_in_containers() {
        let doc = parse_markdown("> ## Quoted\n\n- item\n\n## Real\n");

        assert_eq!(
            headings(&doc),
            vec![(HeadingLevel::Section, "Real".to_string())]
        );
    }

    #[test]
    fn page_without_headings_is_plain_html() {
        let doc = parse_markdown("Just a paragraph.\n");

        assert_eq!(
            doc.blocks,
            vec![Block::Html("<p>Just a paragraph.</p>\n".to_string())]
        );
    }

    #[test]
    fn parses_html_fragments() {
        let page = parse_page(
            "---\ntitle: Kit\n---\n<h2>Colors</h2>\n<h3>Brand</h3>\n",
            SourceFormat::Html,
            &Markup::default(),
        )
        .unwrap();

        assert_eq!(
            headings(&page.document),
            vec![
                (HeadingLevel::Section, "Colors".to_string()),
                (HeadingLevel::Subsection, "Brand".to_string()),
            ]
        );
    }
}
