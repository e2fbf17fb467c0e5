//! HTML fragment scanning.
//!
//! Splits an HTML content fragment into [`Block`]s. Only `h2`/`h3` elements
//! that are direct children of the fragment become headings; everything else
//! passes through untouched.

use regex::{Captures, Regex};

use crate::document::{Document, Heading, HeadingLevel};
use crate::markup::Markup;
use crate::source::ParseError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Start tags that end an open `<p>`, as browsers parse it.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "menu",
    "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// A tag found in the fragment.
#[derive(Debug)]
struct TagMatch<'a> {
    start: usize,
    end: usize,
    name: String,
    attrs: &'a str,
    closing: bool,
    self_closing: bool,
}

/// Scanner for HTML content fragments.
pub struct HtmlScanner {
    tag: Regex,
    strip_tags: Regex,
    entity: Regex,
    id_attr: Regex,
    header_link: Regex,
    back_link: Regex,
}

impl HtmlScanner {
    /// Build a scanner that recognizes the given markup.
    pub fn new(markup: &Markup) -> Result<Self, ParseError> {
        Ok(Self {
            tag: Regex::new(
                r#"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#,
            )?,
            strip_tags: Regex::new(r"(?s)<!--.*?-->|<[^>]*>")?,
            entity: Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);")?,
            id_attr: Regex::new(r#"\s+id\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)?,
            header_link: Regex::new(&format!(
                r#"(?s)^\s*<a\s[^>]*class="[^"]*\b{}\b[^"]*"[^>]*>.*?</a>"#,
                regex::escape(&markup.header_link_class)
            ))?,
            back_link: Regex::new(&format!(
                r##"<a\s[^>]*href="#{}"[^>]*>"##,
                regex::escape(&markup.top_anchor)
            ))?,
        })
    }

    /// Scan a fragment into a document.
    pub fn scan(&self, source: &str) -> Result<Document, ParseError> {
        let tags = self.tags(source);
        let mut doc = Document::new();
        let mut open: Vec<&str> = Vec::new();
        let mut pos = 0;
        let mut i = 0;

        while i < tags.len() {
            let tag = &tags[i];
            let name = tag.name.as_str();

            if tag.closing {
                if let Some(at) = open.iter().rposition(|n| *n == name) {
                    open.truncate(at);
                }
                i += 1;
                continue;
            }

            let implied = match open.last() {
                Some(&"p") => CLOSES_PARAGRAPH.contains(&name),
                Some(&"li") => name == "li",
                _ => false,
            };
            if implied {
                open.pop();
            }

            let level = if tag.self_closing || !open.is_empty() {
                None
            } else {
                heading_level(name)
            };

            let Some(level) = level else {
                if !tag.self_closing && !VOID_ELEMENTS.contains(&name) {
                    open.push(name);
                }
                i += 1;
                continue;
            };

            let close = find_close(&tags, i).ok_or_else(|| ParseError::Parse {
                line: source[..tag.start].matches('\n').count() + 1,
                message: format!("unclosed <{}> element", tag.name),
            })?;

            self.push_preceding(&mut doc, &source[pos..tag.start]);

            let inner = &source[tag.end..tags[close].start];
            let inner = match self.header_link.find(inner) {
                Some(m) => &inner[m.end()..],
                None => inner,
            };
            let label = self.text_content(inner);

            let mut heading = Heading::new(level, &label, inner);
            heading.attributes = self.id_attr.replace_all(tag.attrs, "").trim_end().to_string();
            doc.push_heading(heading);

            pos = tags[close].end;
            // Skip the newline that followed the closing tag; rendering adds its own.
            if source[pos..].starts_with('\n') {
                pos += 1;
            }
            i = close + 1;
        }

        doc.push_html(&source[pos..]);
        Ok(doc)
    }

    /// Push the HTML between two headings, splitting off a trailing back-to-top link.
    fn push_preceding(&self, doc: &mut Document, chunk: &str) {
        match self.strip_back_link(chunk) {
            Some(before) => {
                doc.push_html(before);
                doc.push_back_to_top();
            }
            None => doc.push_html(chunk),
        }
    }

    /// The chunk without its back-to-top link, if it ends with exactly one.
    fn strip_back_link<'c>(&self, chunk: &'c str) -> Option<&'c str> {
        let link = self.back_link.find_iter(chunk).last()?;
        let rest = &chunk[link.end()..];
        let close = rest.find("</a>")?;
        if !rest[close + "</a>".len()..].trim().is_empty() {
            return None;
        }
        Some(&chunk[..link.start()])
    }

    fn tags<'a>(&self, source: &'a str) -> Vec<TagMatch<'a>> {
        self.tag
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(2)?;
                Some(TagMatch {
                    start: whole.start(),
                    end: whole.end(),
                    name: name.as_str().to_lowercase(),
                    attrs: caps.get(3).map(|m| m.as_str()).unwrap_or(""),
                    closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
                    self_closing: caps.get(4).is_some_and(|m| !m.as_str().is_empty()),
                })
            })
            .collect()
    }

    /// Text content of an HTML snippet, with tags removed and entities decoded.
    pub fn text_content(&self, html: &str) -> String {
        let text = self.strip_tags.replace_all(html, "");
        self.entity
            .replace_all(&text, |caps: &Captures| decode_entity(&caps[1], &caps[0]))
            .into_owned()
    }
}

fn heading_level(name: &str) -> Option<HeadingLevel> {
    match name {
        "h2" => Some(HeadingLevel::Section),
        "h3" => Some(HeadingLevel::Subsection),
        _ => None,
    }
}

/// Index of the tag closing the element opened at `open`.
fn find_close(tags: &[TagMatch<'_>], open: usize) -> Option<usize> {
    let name = &tags[open].name;
    let mut nested = 0usize;

    for (offset, tag) in tags[open + 1..].iter().enumerate() {
        if &tag.name != name || tag.self_closing {
            continue;
        }
        if !tag.closing {
            nested += 1;
        } else if nested == 0 {
            return Some(open + 1 + offset);
        } else {
            nested -= 1;
        }
    }
    None
}

fn decode_entity(entity: &str, raw: &str) -> String {
    let decoded = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };
    decoded.map(String::from).unwrap_or_else(|| raw.to_string())
}
