//! Asset pipeline for CSS and JavaScript processing.

use wayfinder_page::Markup;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the runtime script that drives the sidebar.
    pub fn generate_js(markup: &Markup) -> String {
        RUNTIME_JS
            .replace("__OFFSET__", &markup.scroll_offset.to_string())
            .replace("__NAV_CLASS__", &js_string(&markup.nav_class))
            .replace("__SIDEBAR_CLASS__", &js_string(&markup.sidebar_class))
            .replace("__ACTIVE_CLASS__", &js_string(&markup.active_class))
            .replace("__PINNED_CLASS__", &js_string(&markup.pinned_class))
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{}'", escaped)
}

const DEFAULT_CSS: &str = r##"/* wayfinder docs theme */

:root {
  --sidebar-width: 240px;
  --content-max-width: 760px;
  --foreground: #1f2328;
  --muted: #59636e;
  --border: #d1d9e0;
  --accent: #0969da;
  --background: #ffffff;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  line-height: 1.6;
  color: var(--foreground);
  background: var(--background);
}

.masthead {
  padding: 1rem 2rem;
  border-bottom: 1px solid var(--border);
}

.site-title {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  gap: 2rem;
  padding: 2rem;
}

/* Sidebar */
.submenu {
  list-style: none;
  margin: 0;
  padding: 0;
  width: var(--sidebar-width);
}

.submenu.affix {
  position: fixed;
  top: 1rem;
}

.submenu a {
  display: block;
  padding: 0.25rem 0.75rem;
  color: var(--muted);
  text-decoration: none;
  border-left: 2px solid transparent;
}

.submenu a:hover {
  color: var(--foreground);
}

.submenu .nav {
  display: none;
  list-style: none;
  padding-left: 1rem;
}

.submenu .active > a {
  color: var(--accent);
  border-left-color: var(--accent);
}

.submenu .active > .nav {
  display: block;
}

/* Content */
.content {
  max-width: var(--content-max-width);
}

.content h2 {
  position: relative;
  margin-top: 2.5rem;
  padding-bottom: 0.25rem;
  border-bottom: 1px solid var(--border);
}

.header-link {
  position: absolute;
  left: -1.5rem;
  color: var(--muted);
  opacity: 0;
  transition: opacity 0.15s;
}

.content h2:hover .header-link {
  opacity: 1;
}

.fa-before {
  margin-right: 0.25rem;
}

a[href="#top"] {
  display: inline-block;
  margin-top: 2rem;
  font-size: 0.875rem;
  color: var(--muted);
}

.content pre {
  padding: 1rem;
  overflow-x: auto;
  border: 1px solid var(--border);
  border-radius: 0.375rem;
}

@media (max-width: 900px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .subnav {
    display: none;
  }
}
"##;

const RUNTIME_JS: &str = r##"// wayfinder runtime: scroll-spy and affix for the generated sidebar
(function() {
  'use strict';

  var offset = __OFFSET__;
  var nav = document.querySelector('.' + __NAV_CLASS__);
  var sidebar = document.querySelector('.' + __SIDEBAR_CLASS__);
  var activeClass = __ACTIVE_CLASS__;
  var pinnedClass = __PINNED_CLASS__;

  if (!nav || !sidebar) {
    return;
  }

  var links = Array.prototype.slice.call(sidebar.querySelectorAll('a[href^="#"]'));
  var affixTop = nav.getBoundingClientRect().top + window.pageYOffset;
  var targets = [];
  var active = sidebar.querySelector('li.' + activeClass + ' > a');
  var pinned = false;

  function sectionTop(link) {
    var id = decodeURIComponent(link.getAttribute('href').slice(1));
    var section = document.getElementById(id);
    return section ? section.getBoundingClientRect().top + window.pageYOffset : null;
  }

  function refresh() {
    targets = links
      .map(function(link) { return { link: link, top: sectionTop(link) }; })
      .filter(function(t) { return t.top !== null; })
      .sort(function(a, b) { return a.top - b.top; });
  }

  function activate(link) {
    sidebar.querySelectorAll('li.' + activeClass).forEach(function(li) {
      li.classList.remove(activeClass);
    });
    var el = link.parentElement;
    while (el && el !== sidebar) {
      if (el.tagName === 'LI') {
        el.classList.add(activeClass);
      }
      el = el.parentElement;
    }
    active = link;
  }

  function spy() {
    if (!targets.length) {
      return;
    }
    var scrollTop = window.pageYOffset + offset;
    var maxScroll = document.documentElement.scrollHeight + offset - window.innerHeight;
    var target = targets[0].link;

    if (scrollTop >= maxScroll) {
      target = targets[targets.length - 1].link;
    } else {
      for (var i = targets.length - 1; i >= 0; i--) {
        if (scrollTop >= targets[i].top) {
          target = targets[i].link;
          break;
        }
      }
    }

    if (target !== active) {
      activate(target);
    }
  }

  function affix() {
    var next = window.pageYOffset > affixTop;
    if (next === pinned) {
      return;
    }
    pinned = next;
    sidebar.classList.toggle(pinnedClass, pinned);
  }

  refresh();
  spy();
  affix();

  window.addEventListener('scroll', function() {
    spy();
    affix();
  }, { passive: true });

  window.addEventListener('resize', function() {
    refresh();
    spy();
  });
})();
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(".submenu.affix"));
        assert!(css.contains(".header-link"));
    }

    #[test]
    fn generates_js_with_markup() {
        let markup = Markup {
            nav_class: "side'nav".to_string(),
            scroll_offset: 24,
            ..Default::default()
        };

        let js = AssetPipeline::generate_js(&markup);

        assert!(js.contains("var offset = 24;"));
        assert!(js.contains(r"'side\'nav'"));
        assert!(js.contains("var sidebar = document.querySelector('.' + 'submenu');"));
        assert!(!js.contains("__"));
    }

    #[test]
    fn runtime_links_only_fragment_targets() {
        let js = AssetPipeline::generate_js(&Markup::default());

        assert!(js.contains(r##"sidebar.querySelectorAll('a[href^="#"]')"##));
        assert!(AssetPipeline::generate_css().contains(r##"a[href="#top"]"##));
    }

    // Keep in step with ScrollSpy::process and Affix::update in wayfinder-page.
    #[test]
    fn runtime_follows_scroll_model() {
        let js = AssetPipeline::generate_js(&Markup::default());

        for rule in [
            "var scrollTop = window.pageYOffset + offset;",
            "var maxScroll = document.documentElement.scrollHeight + offset - window.innerHeight;",
            "var target = targets[0].link;",
            "if (scrollTop >= maxScroll) {",
            "target = targets[targets.length - 1].link;",
            "if (scrollTop >= targets[i].top) {",
            "var next = window.pageYOffset > affixTop;",
        ] {
            assert!(js.contains(rule), "missing `{}`", rule);
        }
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.submenu {
    list-style: none;
    padding: 0px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".submenu"));
    }

    #[test]
    fn minifies_default_theme() {
        assert!(AssetPipeline::minify_css(&AssetPipeline::generate_css()).is_ok());
    }
}
