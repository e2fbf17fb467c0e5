//! Sidebar menu generated from the outline.

use serde::Serialize;

use crate::markup::{escape_html, Markup};
use crate::outline::Outline;

/// A sidebar link, with nested links for subheadings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarEntry {
    /// Identifier of the heading this entry links to
    pub target: String,
    /// Display label
    pub label: String,
    /// Subheading entries, in document order
    pub children: Vec<SidebarEntry>,
    /// Whether this entry carries the active marker
    pub active: bool,
}

impl SidebarEntry {
    fn new(target: &str, label: &str) -> Self {
        Self {
            target: target.to_string(),
            label: label.to_string(),
            children: Vec::new(),
            active: false,
        }
    }
}

/// Position of a link in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryIndex {
    /// Top-level entry
    pub entry: usize,
    /// Nested entry, when the link points at a subheading
    pub child: Option<usize>,
}

/// The generated sidebar menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sidebar {
    pub entries: Vec<SidebarEntry>,
}

impl Sidebar {
    /// Build the sidebar from an outline.
    ///
    /// Headings and subheadings without an identifier get no entry.
    pub fn from_outline(outline: &Outline) -> Self {
        let entries = outline
            .nodes
            .iter()
            .filter_map(|node| {
                let id = node.id.as_deref()?;
                let mut entry = SidebarEntry::new(id, &node.label);
                entry.children = node
                    .children
                    .iter()
                    .filter_map(|child| {
                        child
                            .id
                            .as_deref()
                            .map(|cid| SidebarEntry::new(cid, &child.label))
                    })
                    .collect();
                Some(entry)
            })
            .collect();

        Self { entries }
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sidebar has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every link target in document order.
    pub fn targets(&self) -> Vec<(EntryIndex, &str)> {
        let mut targets = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            targets.push((
                EntryIndex {
                    entry: i,
                    child: None,
                },
                entry.target.as_str(),
            ));
            for (j, child) in entry.children.iter().enumerate() {
                targets.push((
                    EntryIndex {
                        entry: i,
                        child: Some(j),
                    },
                    child.target.as_str(),
                ));
            }
        }
        targets
    }

    /// Mark the first entry active.
    pub fn activate_first(&mut self) {
        if !self.is_empty() {
            self.activate(EntryIndex {
                entry: 0,
                child: None,
            });
        }
    }

    /// Move the active marker to the given link, clearing all others.
    ///
    /// Activating a nested link also marks its parent entry active.
    pub fn activate(&mut self, index: EntryIndex) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.active = i == index.entry;
            for (j, child) in entry.children.iter_mut().enumerate() {
                child.active = i == index.entry && index.child == Some(j);
            }
        }
    }

    /// The link currently carrying the active marker.
    pub fn active(&self) -> Option<EntryIndex> {
        let entry = self.entries.iter().position(|e| e.active)?;
        let child = self.entries[entry].children.iter().position(|c| c.active);
        Some(EntryIndex { entry, child })
    }

    /// Render the entries as list items for the sidebar container.
    pub fn to_html(&self, markup: &Markup) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                r#"<li class="{}">"#,
                classes(&markup.entry_class, entry.active, markup)
            ));
            out.push_str(&link(entry));

            if !entry.children.is_empty() {
                out.push_str(&format!(r#"<ul class="{}">"#, markup.children_class));
                for child in &entry.children {
                    if child.active {
                        out.push_str(&format!(r#"<li class="{}">"#, markup.active_class));
                    } else {
                        out.push_str("<li>");
                    }
                    out.push_str(&link(child));
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }

            out.push_str("</li>\n");
        }
        out
    }
}

fn classes(base: &str, active: bool, markup: &Markup) -> String {
    if active {
        format!("{} {}", base, markup.active_class)
    } else {
        base.to_string()
    }
}

fn link(entry: &SidebarEntry) -> String {
    format!(
        r##"<a href="#{}">{}</a>"##,
        escape_html(&entry.target),
        escape_html(&entry.label)
    )
}
