//! Template engine for rendering documentation pages.

use std::path::Path;

use minijinja::{context, path_loader, Environment};
use wayfinder_page::{Markup, Sidebar};

/// Context for rendering a page template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Page description
    pub description: Option<String>,
    /// Annotated content HTML
    pub content: String,
    /// Rendered sidebar entries
    pub sidebar_html: String,
    /// Sidebar entries, for templates that render their own menu
    pub sidebar: Sidebar,
    /// Class names shared with the runtime script
    pub markup: Markup,
    /// Base URL
    pub base_url: String,
    /// Stylesheet URLs to include
    pub styles: Vec<String>,
    /// Live reload script URL (dev server only)
    pub live_reload: Option<String>,
}

/// Template engine using minijinja.
///
/// Templates found in the user's templates directory take precedence over the
/// built-in `base.html`, `page.html` and `sidebar.html`.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine, optionally backed by a templates directory.
    pub fn new(templates_dir: Option<&Path>) -> Self {
        let mut env = Environment::new();

        let user = templates_dir.filter(|d| d.is_dir()).map(path_loader);
        env.set_loader(move |name| {
            if let Some(load) = &user {
                if let Some(source) = load(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(builtin(name).map(str::to_string))
        });

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            description => &context.description,
            content => &context.content,
            sidebar_html => &context.sidebar_html,
            sidebar => &context.sidebar,
            markup => &context.markup,
            base_url => &context.base_url,
            styles => &context.styles,
            live_reload => &context.live_reload,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "base.html" => Some(BASE_TEMPLATE),
        "page.html" => Some(PAGE_TEMPLATE),
        "sidebar.html" => Some(SIDEBAR_TEMPLATE),
        _ => None,
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}{% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body>
  <a id="{{ markup.top_anchor }}"></a>
  <header class="masthead">
    <a href="{{ base_url }}" class="site-title">{{ site_title }}</a>
  </header>
  <div class="layout">
    <aside class="{{ markup.nav_class }}">
      {% include "sidebar.html" %}
    </aside>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="{{ base_url }}assets/wayfinder.js"></script>
  {% if live_reload %}<script src="{{ live_reload }}"></script>
  {% endif %}
</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1 class="page-title">{{ title }}</h1>
<article class="{{ markup.content_class }}">
{{ content | safe }}
</article>
{% endblock %}"##;

const SIDEBAR_TEMPLATE: &str = r##"<ul class="{{ markup.sidebar_class }} nav">
{{ sidebar_html | safe }}</ul>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use wayfinder_page::SidebarEntry;

    fn context() -> Context {
        Context {
            title: "Guide".to_string(),
            site_title: "My Docs".to_string(),
            description: None,
            content: "<p>Hello world</p>".to_string(),
            sidebar_html: String::new(),
            sidebar: Sidebar::default(),
            markup: Markup::default(),
            base_url: "/".to_string(),
            styles: vec!["/assets/main.css".to_string()],
            live_reload: None,
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::default();

        let html = engine.render_page("page.html", &context()).unwrap();

        assert!(html.contains("<title>Guide - My Docs</title>"));
        assert!(html.contains(r#"<article class="content">"#));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains(r#"<a id="top"></a>"#));
        assert!(html.contains(r#"<aside class="subnav">"#));
        assert!(html.contains(r#"<link rel="stylesheet""#));
        assert!(!html.contains("__reload"));
    }

    #[test]
    fn renders_sidebar_container() {
        let engine = TemplateEngine::default();
        let mut ctx = context();
        ctx.sidebar_html = r##"<li class="level1 active"><a href="#setup">Setup</a></li>"##.to_string();

        let html = engine.render_page("page.html", &ctx).unwrap();

        assert!(html.contains(
            "<ul class=\"submenu nav\">\n<li class=\"level1 active\"><a href=\"#setup\">Setup</a></li></ul>"
        ));
    }

    #[test]
    fn includes_live_reload_script() {
        let engine = TemplateEngine::default();
        let mut ctx = context();
        ctx.live_reload = Some("/__reload.js".to_string());

        let html = engine.render_page("page.html", &ctx).unwrap();

        // URLs are autoescaped, so match on the file name only.
        assert!(html.contains("__reload.js"));
    }

    #[test]
    fn user_templates_override_builtins() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("sidebar.html"),
            "<ol>{% for entry in sidebar.entries %}<li>{{ entry.label }}</li>{% endfor %}</ol>",
        )
        .unwrap();

        let engine = TemplateEngine::new(Some(temp.path()));
        let mut ctx = context();
        ctx.sidebar.entries.push(SidebarEntry {
            target: "setup".to_string(),
            label: "Setup & Go".to_string(),
            children: vec![],
            active: true,
        });

        let html = engine.render_page("page.html", &ctx).unwrap();

        assert!(html.contains("<ol><li>Setup &amp; Go</li></ol>"));
        assert!(html.contains("<title>Guide - My Docs</title>"));
    }

    #[test]
    fn missing_template_is_an_error() {
        let engine = TemplateEngine::default();

        assert!(engine.render_page("wide.html", &context()).is_err());
    }
}
