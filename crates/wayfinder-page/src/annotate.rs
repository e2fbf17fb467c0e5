//! Page annotation: heading anchors, back-to-top links and the sidebar.
//!
//! Every operation takes the document it works on explicitly and can be
//! applied more than once without changing the result.

use std::collections::HashMap;

use crate::document::{Block, Document, HeadingLevel};
use crate::outline::Outline;
use crate::sidebar::Sidebar;
use crate::slug::{compose_id, slugify};

/// Assign identifiers to headings and subheadings, and anchor the headings.
///
/// A heading whose derived identifier is empty is left without id and anchor.
/// A subheading gets `<heading id>-<own slug>` when both halves are non-empty.
/// Returns the outline of the annotated document.
pub fn derive_anchors(doc: &mut Document) -> Outline {
    let mut parent: Option<Option<String>> = None;

    for block in doc.blocks.iter_mut() {
        let Block::Heading(heading) = block else {
            continue;
        };

        let slug = slugify(&heading.label);
        match heading.level {
            HeadingLevel::Section => {
                let id = (!slug.is_empty()).then_some(slug);
                heading.anchored = id.is_some();
                heading.id = id.clone();
                parent = Some(id);
            }
            HeadingLevel::Subsection => {
                // Subheadings before the first heading are left alone.
                if let Some(parent_id) = &parent {
                    heading.id = parent_id
                        .as_deref()
                        .and_then(|pid| compose_id(pid, &slug));
                }
            }
        }
    }

    Outline::build(doc)
}

/// Insert a back-to-top link before every heading except the first.
///
/// Headings already preceded by a back-to-top link are skipped. Returns the
/// number of links inserted.
pub fn insert_back_to_top(doc: &mut Document) -> usize {
    let mut blocks = Vec::with_capacity(doc.blocks.len());
    let mut seen_heading = false;
    let mut inserted = 0;

    for block in doc.blocks.drain(..) {
        if let Block::Heading(heading) = &block {
            if heading.level == HeadingLevel::Section {
                let preceded = matches!(blocks.last(), Some(Block::BackToTop));
                if seen_heading && !preceded {
                    blocks.push(Block::BackToTop);
                    inserted += 1;
                }
                seen_heading = true;
            }
        }
        blocks.push(block);
    }

    doc.blocks = blocks;
    inserted
}

/// Identifiers used by more than one heading, in first-seen order.
pub fn duplicate_ids(outline: &Outline) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();

    for id in outline.iter().filter_map(|n| n.id.as_deref()) {
        let count = counts.entry(id).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(id.to_string());
        }
    }
    order
}

/// Result of annotating one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Heading structure after identifiers were assigned
    pub outline: Outline,
    /// Sidebar with the first entry active
    pub sidebar: Sidebar,
    /// Back-to-top links inserted by this run
    pub back_links: usize,
    /// Identifiers shared by several headings
    pub duplicates: Vec<String>,
}

/// Run anchor derivation, back-to-top injection, sidebar construction and
/// scroll tracking activation, in that order.
pub fn annotate(doc: &mut Document) -> Annotation {
    let outline = derive_anchors(doc);
    let back_links = insert_back_to_top(doc);

    // Back-to-top links shift block indices, so rebuild the outline.
    let outline = if back_links > 0 {
        Outline::build(doc)
    } else {
        outline
    };

    let mut sidebar = Sidebar::from_outline(&outline);
    sidebar.activate_first();

    let duplicates = duplicate_ids(&outline);
    for id in &duplicates {
        tracing::warn!("Duplicate heading id '{}': anchors will not resolve uniquely", id);
    }

    tracing::debug!(
        headings = outline.len(),
        entries = sidebar.len(),
        back_links,
        "Annotated document"
    );

    Annotation {
        outline,
        sidebar,
        back_links,
        duplicates,
    }
}
