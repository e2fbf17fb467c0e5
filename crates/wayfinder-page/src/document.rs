//! Flat block model of a page's content area.

use crate::markup::{escape_html, Markup};

/// Level of a heading that takes part in annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// Top-level section heading (`h2`)
    Section,
    /// Subsection heading one level deeper (`h3`)
    Subsection,
}

impl HeadingLevel {
    /// Map a numeric heading level to an annotated level.
    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            2 => Some(Self::Section),
            3 => Some(Self::Subsection),
            _ => None,
        }
    }

    /// HTML tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Section => "h2",
            Self::Subsection => "h3",
        }
    }
}

/// A heading at the top level of the content area.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: HeadingLevel,
    /// Text content, trimmed
    pub label: String,
    /// Rendered inner HTML
    pub inner_html: String,
    /// Extra attributes carried over from the source, without `id`
    pub attributes: String,
    /// Assigned identifier
    pub id: Option<String>,
    /// Whether the header link icon is rendered
    pub anchored: bool,
}

impl Heading {
    /// Create a heading with no identifier.
    pub fn new(level: HeadingLevel, label: &str, inner_html: impl Into<String>) -> Self {
        Self {
            level,
            label: label.trim().to_string(),
            inner_html: inner_html.into(),
            attributes: String::new(),
            id: None,
            anchored: false,
        }
    }

    fn to_html(&self, markup: &Markup) -> String {
        let tag = self.level.tag();
        let mut out = format!("<{}{}", tag, self.attributes);

        if let Some(id) = &self.id {
            out.push_str(&format!(r#" id="{}""#, escape_html(id)));
        }
        out.push('>');

        if let (true, Some(id)) = (self.anchored, &self.id) {
            out.push_str(&markup.header_link(id));
        }

        out.push_str(&self.inner_html);
        out.push_str(&format!("</{}>", tag));
        out
    }
}

/// One block of the content area.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(Heading),
    /// Link back to the page's top anchor
    BackToTop,
    /// Any other content, passed through untouched
    Html(String),
}

/// The content area of a page as an ordered list of blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw HTML, merging with a preceding HTML block.
    pub fn push_html(&mut self, html: &str) {
        if html.is_empty() {
            return;
        }
        if let Some(Block::Html(last)) = self.blocks.last_mut() {
            last.push_str(html);
        } else {
            self.blocks.push(Block::Html(html.to_string()));
        }
    }

    /// Append a heading.
    pub fn push_heading(&mut self, heading: Heading) {
        self.blocks.push(Block::Heading(heading));
    }

    /// Append a back-to-top link.
    pub fn push_back_to_top(&mut self) {
        self.blocks.push(Block::BackToTop);
    }

    /// Iterate over headings with their block index.
    pub fn headings(&self) -> impl Iterator<Item = (usize, &Heading)> {
        self.blocks.iter().enumerate().filter_map(|(i, b)| match b {
            Block::Heading(h) => Some((i, h)),
            _ => None,
        })
    }

    /// Mutable access to the heading at a block index.
    pub fn heading_mut(&mut self, index: usize) -> Option<&mut Heading> {
        match self.blocks.get_mut(index) {
            Some(Block::Heading(h)) => Some(h),
            _ => None,
        }
    }

    /// Number of back-to-top links in the document.
    pub fn back_link_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::BackToTop))
            .count()
    }

    /// Render the content area back to HTML.
    pub fn to_html(&self, markup: &Markup) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading(h) => {
                    out.push_str(&h.to_html(markup));
                    out.push('\n');
                }
                Block::BackToTop => {
                    out.push_str(&markup.back_to_top());
                    out.push('\n');
                }
                Block::Html(html) => out.push_str(html),
            }
        }
        out
    }
}
