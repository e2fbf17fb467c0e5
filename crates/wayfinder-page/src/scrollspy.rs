//! Scroll tracking for the generated sidebar.
//!
//! The browser runtime script follows these rules; they live here so they can
//! be exercised without a browser.

use crate::sidebar::{EntryIndex, Sidebar};

/// Viewport state at one scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the page
    pub scroll_top: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
    /// Total scrollable height of the page
    pub scroll_height: f64,
}

/// Marks the sidebar link whose section is currently in view.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    /// Link positions and section tops, sorted by top
    targets: Vec<(EntryIndex, f64)>,
    offset: f64,
    active: Option<EntryIndex>,
}

impl ScrollSpy {
    /// Create a spy for the sidebar's links.
    ///
    /// `section_top` resolves a link target to the top offset of its section;
    /// links whose target is not on the page are ignored.
    pub fn new<F>(sidebar: &Sidebar, section_top: F, offset: f64) -> Self
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut targets: Vec<(EntryIndex, f64)> = sidebar
            .targets()
            .into_iter()
            .filter_map(|(index, target)| section_top(target).map(|top| (index, top)))
            .collect();
        targets.sort_by(|a, b| a.1.total_cmp(&b.1));

        Self {
            targets,
            offset,
            active: sidebar.active(),
        }
    }

    /// The currently active link.
    pub fn active(&self) -> Option<EntryIndex> {
        self.active
    }

    /// Process a scroll event. Returns the newly active link when it changed.
    pub fn process(&mut self, metrics: ScrollMetrics) -> Option<EntryIndex> {
        let (first, last) = match (self.targets.first(), self.targets.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => return None,
        };

        let scroll_top = metrics.scroll_top + self.offset;
        let max_scroll = metrics.scroll_height + self.offset - metrics.viewport_height;

        let target = if scroll_top >= max_scroll {
            last
        } else {
            self.targets
                .iter()
                .rev()
                .find(|(_, top)| scroll_top >= *top)
                .map(|(index, _)| *index)
                .unwrap_or(first)
        };

        if self.active == Some(target) {
            return None;
        }
        self.active = Some(target);
        Some(target)
    }
}

/// Pins the sidebar once the page scrolls past its original position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affix {
    top: f64,
    pinned: bool,
}

impl Affix {
    /// Create an affix for a container whose original top offset is `top`.
    pub fn new(top: f64) -> Self {
        Self { top, pinned: false }
    }

    /// Whether the container is currently pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Process a scroll position. Returns the new pinned state when it changed.
    pub fn update(&mut self, scroll_top: f64) -> Option<bool> {
        let pinned = scroll_top > self.top;
        if pinned == self.pinned {
            return None;
        }
        self.pinned = pinned;
        Some(pinned)
    }
}

/// What changed after a scroll event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollUpdate {
    /// Newly active link
    pub activated: Option<EntryIndex>,
    /// New pinned state of the sidebar
    pub pinned: Option<bool>,
}

/// Scroll-spy and affix driven together by the scroll event stream.
#[derive(Debug, Clone)]
pub struct ScrollWatcher {
    spy: ScrollSpy,
    affix: Affix,
}

impl ScrollWatcher {
    pub fn new(spy: ScrollSpy, affix: Affix) -> Self {
        Self { spy, affix }
    }

    /// Handle one scroll event, moving the sidebar's active marker if needed.
    pub fn on_scroll(&mut self, sidebar: &mut Sidebar, metrics: ScrollMetrics) -> ScrollUpdate {
        let activated = self.spy.process(metrics);
        if let Some(index) = activated {
            sidebar.activate(index);
        }

        ScrollUpdate {
            activated,
            pinned: self.affix.update(metrics.scroll_top),
        }
    }

    pub fn spy(&self) -> &ScrollSpy {
        &self.spy
    }

    pub fn affix(&self) -> &Affix {
        &self.affix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::source::parse_markdown;

    /// Sidebar for `Intro`, `Setup` (with `Requirements`) and `Usage`,
    /// with sections laid out 500px apart starting at 200px.
    fn fixture() -> (Sidebar, ScrollWatcher) {
        let mut doc = parse_markdown("## Intro\n\n## Setup\n\n### Requirements\n\n## Usage\n");
        let sidebar = annotate(&mut doc).sidebar;

        let tops = [
            ("intro", 200.0),
            ("setup", 700.0),
            ("setup-requirements", 1200.0),
            ("usage", 1700.0),
        ];
        let spy = ScrollSpy::new(
            &sidebar,
            |id| tops.iter().find(|(t, _)| *t == id).map(|(_, top)| *top),
            10.0,
        );
        (sidebar, ScrollWatcher::new(spy, Affix::new(150.0)))
    }

    fn at(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            viewport_height: 800.0,
            scroll_height: 3000.0,
        }
    }

    fn active_labels(sidebar: &Sidebar) -> Vec<&str> {
        sidebar
            .entries
            .iter()
            .flat_map(|e| std::iter::once(e).chain(e.children.iter()))
            .filter(|e| e.active)
            .map(|e| e.label.as_str())
            .collect()
    }

    #[test]
    fn starts_with_first_entry_active() {
        let (sidebar, watcher) = fixture();

        assert_eq!(active_labels(&sidebar), vec!["Intro"]);
        assert_eq!(
            watcher.spy().active(),
            Some(EntryIndex {
                entry: 0,
                child: None
            })
        );
        assert!(!watcher.affix().is_pinned());
    }

    #[test]
    fn scrolling_to_a_heading_moves_the_marker() {
        let (mut sidebar, mut watcher) = fixture();

        let update = watcher.on_scroll(&mut sidebar, at(690.0));
        assert_eq!(
            update.activated,
            Some(EntryIndex {
                entry: 1,
                child: None
            })
        );
        assert_eq!(active_labels(&sidebar), vec!["Setup"]);

        watcher.on_scroll(&mut sidebar, at(1195.0));
        assert_eq!(active_labels(&sidebar), vec!["Setup", "Requirements"]);

        watcher.on_scroll(&mut sidebar, at(300.0));
        assert_eq!(active_labels(&sidebar), vec!["Intro"]);
    }

    #[test]
    fn repeated_position_reports_no_change() {
        let (mut sidebar, mut watcher) = fixture();

        watcher.on_scroll(&mut sidebar, at(700.0));
        let update = watcher.on_scroll(&mut sidebar, at(720.0));

        assert_eq!(update, ScrollUpdate::default());
    }

    #[test]
    fn bottom_of_page_activates_last_entry() {
        let (mut sidebar, mut watcher) = fixture();

        watcher.on_scroll(&mut sidebar, at(2200.0));

        assert_eq!(active_labels(&sidebar), vec!["Usage"]);
    }

    #[test]
    fn above_first_section_keeps_first_entry() {
        let (mut sidebar, mut watcher) = fixture();

        watcher.on_scroll(&mut sidebar, at(1700.0));
        watcher.on_scroll(&mut sidebar, at(0.0));

        assert_eq!(active_labels(&sidebar), vec!["Intro"]);
    }

    #[test]
    fn pins_and_releases_sidebar() {
        let (mut sidebar, mut watcher) = fixture();

        assert_eq!(watcher.on_scroll(&mut sidebar, at(100.0)).pinned, None);
        assert_eq!(watcher.on_scroll(&mut sidebar, at(151.0)).pinned, Some(true));
        assert_eq!(watcher.on_scroll(&mut sidebar, at(400.0)).pinned, None);
        assert_eq!(watcher.on_scroll(&mut sidebar, at(150.0)).pinned, Some(false));
    }

    #[test]
    fn empty_sidebar_never_activates() {
        let sidebar = Sidebar::default();
        let mut spy = ScrollSpy::new(&sidebar, |_| Some(0.0), 10.0);

        assert_eq!(spy.process(at(500.0)), None);
        assert_eq!(spy.active(), None);
    }
}
