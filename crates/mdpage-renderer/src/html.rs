//! HTML backend for markdown rendering.
//!
//! Produces HTML5 output in the shape the page stylesheet expects.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML render backend.
///
/// Produces HTML5 with:
/// - `<pre><code class="hljs language-x">` for highlighted code blocks
/// - `<a class="anchor" aria-hidden="true">` permalinks after heading text
/// - `<blockquote>` for blockquotes
/// - `<img>` for images
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, highlighted: bool, body: &str, out: &mut String) {
        out.push_str("<pre><code");
        match (highlighted, lang) {
            (true, Some(lang)) => {
                let _ = write!(out, r#" class="hljs language-{}""#, escape_html(lang));
            }
            (true, None) => out.push_str(r#" class="hljs""#),
            (false, Some(lang)) => {
                let _ = write!(out, r#" class="language-{}""#, escape_html(lang));
            }
            (false, None) => {}
        }
        let _ = writeln!(out, ">{body}</code></pre>");
    }

    fn inline_code(lang: Option<&str>, body: &str, out: &mut String) {
        match lang {
            Some(lang) => {
                let _ = write!(
                    out,
                    r#"<code class="hljs language-{}">{body}</code>"#,
                    escape_html(lang)
                );
            }
            None => {
                let _ = write!(out, "<code>{body}</code>");
            }
        }
    }

    fn heading_permalink(id: &str, symbol: &str, out: &mut String) {
        let _ = write!(
            out,
            r##" <a class="anchor" href="#{}" aria-hidden="true">{}</a>"##,
            escape_html(id),
            escape_html(symbol)
        );
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>\n");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>\n");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        let _ = write!(
            out,
            r#"<img src="{}" alt="{}"{title_attr}>"#,
            escape_html(src),
            escape_html(alt)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_highlighted_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), true, "fn main() {}", &mut out);
        assert_eq!(
            out,
            "<pre><code class=\"hljs language-rust\">fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_highlighted_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, true, "plain", &mut out);
        assert_eq!(out, "<pre><code class=\"hljs\">plain</code></pre>\n");
    }

    #[test]
    fn test_code_block_plain() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), false, "x", &mut out);
        assert_eq!(out, "<pre><code class=\"language-rust\">x</code></pre>\n");

        let mut out = String::new();
        HtmlBackend::code_block(None, false, "x", &mut out);
        assert_eq!(out, "<pre><code>x</code></pre>\n");
    }

    #[test]
    fn test_code_block_language_is_escaped() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("a\"b"), true, "", &mut out);
        assert!(out.contains(r#"class="hljs language-a&quot;b""#));
    }

    #[test]
    fn test_inline_code() {
        let mut out = String::new();
        HtmlBackend::inline_code(None, "x &lt; y", &mut out);
        assert_eq!(out, "<code>x &lt; y</code>");

        let mut out = String::new();
        HtmlBackend::inline_code(Some("js"), "x", &mut out);
        assert_eq!(out, r#"<code class="hljs language-js">x</code>"#);
    }

    #[test]
    fn test_heading_permalink() {
        let mut out = String::new();
        HtmlBackend::heading_permalink("section-a", "#", &mut out);
        assert_eq!(
            out,
            r##" <a class="anchor" href="#section-a" aria-hidden="true">#</a>"##
        );
    }

    #[test]
    fn test_blockquote() {
        let mut out = String::new();
        HtmlBackend::blockquote_start(&mut out);
        out.push_str("content");
        HtmlBackend::blockquote_end(&mut out);
        assert_eq!(out, "<blockquote>\ncontent</blockquote>\n");
    }

    #[test]
    fn test_image() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", "", &mut out);
        assert_eq!(out, r#"<img src="image.png" alt="Alt text">"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", "Image title", &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" alt="Alt text" title="Image title">"#
        );
    }
}
