//! Markdown to styled, self-contained HTML page conversion.
//!
//! [`Converter`] renders markdown with highlighted code, heading anchors and
//! a table of contents, then wraps the result in a page with an embedded
//! GitHub-like stylesheet.
//!
//! # Example
//!
//! ```
//! let html = mdpage_core::convert("## Introduction\n\nHello.", "Guide").unwrap();
//!
//! assert!(html.contains("<title>Guide</title>"));
//! assert!(html.contains(r##"<a class="toc-link" href="#introduction">"##));
//! ```

mod converter;
mod error;
pub mod template;

use std::sync::LazyLock;

pub use converter::{Converter, ConverterOptions, Rendered, TOC_MARKER};
pub use error::ConvertError;
pub use mdpage_renderer::{RenderOptions, TocEntry};

/// Converter with default options, shared by the whole process.
static DEFAULT_CONVERTER: LazyLock<Converter> = LazyLock::new(Converter::default);

/// Convert markdown into a complete HTML page using default options.
///
/// # Errors
///
/// Returns `ConvertError::Rendering` if the markdown renderer fails.
pub fn convert(markdown: &str, title: &str) -> Result<String, ConvertError> {
    DEFAULT_CONVERTER.convert(markdown, title)
}
