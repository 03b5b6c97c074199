//! Render backend trait for format-specific rendering.
//!
//! The generic renderer handles event bookkeeping (headings, tables, lists,
//! inline formatting) and delegates the shape of block-level elements to a
//! backend.

/// Backend trait for format-specific rendering operations.
///
/// Implementations provide rendering for:
/// - Code blocks, already highlighted or escaped by the renderer
/// - Heading permalinks
/// - Blockquotes and images
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "js")
    /// * `highlighted` - Whether `body` carries highlight token markup
    /// * `body` - The escaped (and possibly highlighted) code
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, highlighted: bool, body: &str, out: &mut String);

    /// Render inline code.
    ///
    /// `body` is already escaped. `lang` is set only for highlighted inline code.
    fn inline_code(lang: Option<&str>, body: &str, out: &mut String);

    /// Render the permalink placed after a heading's text.
    fn heading_permalink(id: &str, symbol: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>\n");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>\n");
    }
}
