//! Class names and snippets used when annotating a page.

use serde::{Deserialize, Serialize};

/// Markup emitted by the annotator and looked up by the runtime script.
///
/// The defaults match the Font Awesome / Bootstrap flavoured page layout the
/// built-in templates ship with.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Markup {
    /// Class of the scrollable content area holding the headings
    pub content_class: String,
    /// Class of the anchor link prepended to headings
    pub header_link_class: String,
    /// Icon HTML placed inside the header link
    pub link_icon: String,
    /// Id of the element back-to-top links point at
    pub top_anchor: String,
    /// Icon HTML placed before the back-to-top label
    pub back_to_top_icon: String,
    /// Text of back-to-top links
    pub back_to_top_label: String,
    /// Class of the sidebar container the entries are appended to
    pub sidebar_class: String,
    /// Class of top-level sidebar entries
    pub entry_class: String,
    /// Class of nested sidebar lists
    pub children_class: String,
    /// Class of the navigation container used as the affix reference
    pub nav_class: String,
    /// Class marking the active sidebar entry
    pub active_class: String,
    /// Class added to the sidebar while it is pinned
    pub pinned_class: String,
    /// Scroll-spy offset in pixels
    pub scroll_offset: u32,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            content_class: "content".to_string(),
            header_link_class: "header-link".to_string(),
            link_icon: r#"<i class="fa fa-link"></i>"#.to_string(),
            top_anchor: "top".to_string(),
            back_to_top_icon: r#"<i class="fa fa-arrow-circle-up fa-before"></i>"#.to_string(),
            back_to_top_label: "back to top".to_string(),
            sidebar_class: "submenu".to_string(),
            entry_class: "level1".to_string(),
            children_class: "nav".to_string(),
            nav_class: "subnav".to_string(),
            active_class: "active".to_string(),
            pinned_class: "affix".to_string(),
            scroll_offset: 10,
        }
    }
}

impl Markup {
    /// The anchor link prepended to an identified heading.
    pub fn header_link(&self, id: &str) -> String {
        format!(
            r##"<a class="{}" href="#{}">{}</a>"##,
            self.header_link_class,
            escape_html(id),
            self.link_icon
        )
    }

    /// The link inserted before every heading but the first.
    pub fn back_to_top(&self) -> String {
        format!(
            r##"<a href="#{}">{}{}</a>"##,
            escape_html(&self.top_anchor),
            self.back_to_top_icon,
            escape_html(&self.back_to_top_label)
        )
    }
}

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
