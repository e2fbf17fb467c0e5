//! Heading tree built from a document's flat heading list.

use crate::document::{Document, HeadingLevel};

/// Kind of outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading,
    Subheading,
}

/// A heading or subheading in the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub kind: NodeKind,
    pub label: String,
    pub id: Option<String>,
    /// Index of the heading block in the document
    pub block: usize,
    /// Subheadings, in document order (always empty for subheadings)
    pub children: Vec<OutlineNode>,
}

/// The heading structure of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub nodes: Vec<OutlineNode>,
}

impl Outline {
    /// Build the outline in a single pass over the document's headings.
    ///
    /// Subheadings attach to the nearest preceding heading. Subheadings that
    /// come before the first heading belong to nothing and are left out.
    pub fn build(doc: &Document) -> Self {
        let mut nodes: Vec<OutlineNode> = Vec::new();

        for (block, heading) in doc.headings() {
            match heading.level {
                HeadingLevel::Section => nodes.push(OutlineNode {
                    kind: NodeKind::Heading,
                    label: heading.label.clone(),
                    id: heading.id.clone(),
                    block,
                    children: Vec::new(),
                }),
                HeadingLevel::Subsection => {
                    if let Some(parent) = nodes.last_mut() {
                        parent.children.push(OutlineNode {
                            kind: NodeKind::Subheading,
                            label: heading.label.clone(),
                            id: heading.id.clone(),
                            block,
                            children: Vec::new(),
                        });
                    }
                }
            }
        }

        Self { nodes }
    }

    /// Number of top-level headings.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node, headings followed by their subheadings.
    pub fn iter(&self) -> impl Iterator<Item = &OutlineNode> {
        self.nodes
            .iter()
            .flat_map(|n| std::iter::once(n).chain(n.children.iter()))
    }
}
