//! Markdown to HTML rendering with anchors, table of contents and highlighting.
//!
//! This crate provides a generic [`MarkdownRenderer`] that turns markdown into
//! an HTML fragment, a separate table of contents fragment, the list of
//! headings and the document title.
//!
//! # Architecture
//!
//! The renderer walks pulldown-cmark events and handles the shared concerns
//! itself: heading anchors, table of contents markers, tables, lists, links,
//! bare-URL detection and typographic replacements. The shape of code blocks,
//! permalinks, blockquotes and images is delegated to a [`RenderBackend`];
//! [`HtmlBackend`] produces the markup the page stylesheet expects.
//!
//! Code blocks go through [`Highlighter`], which emits highlight.js class
//! names (`hljs-keyword`, `hljs-string`, ...) and can guess the language of
//! unannotated blocks.
//!
//! # Example
//!
//! ```
//! use mdpage_renderer::{HtmlBackend, MarkdownRenderer, RenderOptions};
//!
//! let options = RenderOptions::default();
//! let result = MarkdownRenderer::<HtmlBackend>::new(&options)
//!     .render_markdown("# Hello\n\n**Bold** text")
//!     .unwrap();
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("<strong>Bold</strong>"));
//! ```

mod backend;
mod error;
mod highlight;
mod html;
pub mod linkify;
mod options;
mod renderer;
mod state;
mod toc;
pub mod typography;
mod util;

pub use backend::RenderBackend;
pub use error::RenderError;
pub use highlight::{HighlightError, HighlightedCode, Highlighter};
pub use html::HtmlBackend;
pub use options::{AnchorOptions, HeadingLevels, HighlightOptions, RenderOptions, TocOptions};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use toc::{is_toc_marker, render_toc};
