//! Markdown to sanitised HTML for report bodies.

use std::{collections::HashSet, sync::Arc};

use ammonia::Builder as AmmoniaBuilder;
use comrak::{Arena, format_html, options::Options, parse_document};
use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render markdown: {message}")]
    Markdown { message: String },
}

/// GitHub-flavoured markdown through Comrak, then Ammonia.
pub struct MarkdownRenderer {
    options: Options<'static>,
    sanitizer: AmmoniaBuilder<'static>,
}

impl MarkdownRenderer {
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }

    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(self.sanitizer.clean(&html).to_string())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

static RENDERER: Lazy<Arc<MarkdownRenderer>> = Lazy::new(|| Arc::new(MarkdownRenderer::new()));

/// Shared renderer, built on first use.
pub fn markdown_renderer() -> Arc<MarkdownRenderer> {
    Arc::clone(&RENDERER)
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.tasklist_classes = true;
    // Raw HTML passes through Comrak and is cleaned by Ammonia afterwards.
    render.r#unsafe = true;

    options
}

fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "img",
        "input",
        "li",
        "ol",
        "p",
        "pre",
        "section",
        "span",
        "strong",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);
    builder.tags(tags);

    builder.add_generic_attributes(&["class", "id", "title"]);
    builder.add_tag_attributes("img", &["alt", "width", "height", "loading"]);
    builder.add_tag_attributes("pre", &["lang"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.url_schemes(HashSet::from(["http", "https", "mailto"]));

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_links() {
        let html = markdown_renderer()
            .render("## Top Trending\n\n[react](https://github.com/facebook/react)")
            .expect("render");

        assert!(html.contains("<h2>Top Trending</h2>"));
        assert!(html.contains("href=\"https://github.com/facebook/react\""));
    }

    #[test]
    fn renders_tables() {
        let html = markdown_renderer()
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n")
            .expect("render");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn strips_scripts_and_javascript_urls() {
        let html = markdown_renderer()
            .render("<script>alert(1)</script>\n\n[x](javascript:alert(1))")
            .expect("render");

        assert!(!html.contains("<script"));
        assert!(!html.contains("javascript:"));
    }
}
