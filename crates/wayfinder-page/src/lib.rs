//! Page parsing and annotation for wayfinder.
//!
//! Parses Markdown or HTML page sources into a flat document of blocks, then
//! annotates it: heading anchors, back-to-top links and a sidebar menu that
//! mirrors the heading structure. The scroll-spy and affix rules used by the
//! browser runtime are modelled in [`scrollspy`].

pub mod annotate;
pub mod document;
pub mod frontmatter;
pub mod html;
pub mod markup;
pub mod outline;
pub mod scrollspy;
pub mod sidebar;
pub mod slug;
pub mod source;

pub use annotate::{annotate, derive_anchors, insert_back_to_top, Annotation};
pub use document::{Block, Document, Heading, HeadingLevel};
pub use frontmatter::Frontmatter;
pub use markup::Markup;
pub use outline::{NodeKind, Outline, OutlineNode};
pub use scrollspy::{Affix, ScrollMetrics, ScrollSpy, ScrollUpdate, ScrollWatcher};
pub use sidebar::{EntryIndex, Sidebar, SidebarEntry};
pub use slug::slugify;
pub use source::{parse_page, ParseError, ParsedPage, SourceFormat};
