//! Self-contained HTML page template.
//!
//! The page embeds a GitHub-like light stylesheet covering the rendered
//! markdown, heading anchors, the table of contents and the `hljs-*`
//! highlight classes.

use std::fmt::Write;

use mdpage_renderer::escape_html;

/// Stylesheet embedded in every page.
pub const STYLESHEET: &str = include_str!("assets/github.css");

/// All data needed to render a page.
pub struct DocumentData<'a> {
    /// Page title, escaped on output.
    pub title: &'a str,
    /// Table of contents markup. The TOC block is omitted when `None`.
    pub toc_html: Option<&'a str>,
    /// Rendered markdown.
    pub content_html: &'a str,
}

/// Render a complete HTML page.
pub fn render_document(doc: &DocumentData<'_>) -> String {
    let mut html =
        String::with_capacity(STYLESHEET.len() + doc.content_html.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(html, "<title>{}</title>", escape_html(doc.title));
    html.push_str("<style>\n");
    html.push_str(STYLESHEET);
    html.push_str("</style>\n</head>\n<body>\n");

    if let Some(toc) = doc.toc_html {
        html.push_str("<div class=\"toc-container\">\n");
        html.push_str("<h3 class=\"toc-header\">Table of Contents</h3>\n");
        html.push_str(toc);
        html.push_str("\n</div>\n");
    }

    html.push_str("<div class=\"markdown-body\">\n");
    html.push_str(doc.content_html);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
