//! Markdown to HTML page converter.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};

use mdpage_renderer::{HtmlBackend, MarkdownRenderer, RenderOptions, TocEntry};

use crate::error::ConvertError;
use crate::template::{DocumentData, render_document};

/// Marker requesting a table of contents at its position.
pub const TOC_MARKER: &str = "[TOC]";

/// Options for [`Converter`].
#[derive(Clone, Debug)]
pub struct ConverterOptions {
    /// Markdown rendering options.
    pub render: RenderOptions,
    /// Prepend a [`TOC_MARKER`] paragraph when the source has none.
    ///
    /// The check is a plain substring search, so a `[TOC]` mentioned anywhere
    /// in the text suppresses the injected marker.
    pub inject_toc_marker: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            inject_toc_marker: true,
        }
    }
}

/// Markdown rendered but not yet placed into a page.
#[derive(Clone, Debug, Default)]
pub struct Rendered {
    /// Rendered document body.
    pub content_html: String,
    /// Table of contents markup, if any.
    pub toc_html: Option<String>,
    /// Every heading in document order.
    pub toc: Vec<TocEntry>,
    /// Plain text of the first H1 heading.
    pub title: Option<String>,
}

/// Converts markdown into complete HTML pages.
///
/// Options are fixed at construction; every call renders with fresh state,
/// so one converter can be shared across threads.
///
/// # Example
///
/// ```
/// use mdpage_core::{Converter, ConverterOptions};
///
/// let converter = Converter::new(ConverterOptions::default());
/// let rendered = converter.render("# Notes\n\n## First\n").unwrap();
/// assert_eq!(rendered.title.as_deref(), Some("Notes"));
///
/// let html = Converter::compose(&rendered, "My notes");
/// assert!(html.contains("<title>My notes</title>"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConverterOptions,
}

impl Converter {
    #[must_use]
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    /// Render markdown into a body fragment and table of contents.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Rendering` if the renderer fails or panics.
    pub fn render(&self, markdown: &str) -> Result<Rendered, ConvertError> {
        let source = if self.options.inject_toc_marker && !markdown.contains(TOC_MARKER) {
            tracing::debug!("Prepending table of contents marker");
            Cow::Owned(format!("{TOC_MARKER}\n\n{markdown}"))
        } else {
            Cow::Borrowed(markdown)
        };

        let options = &self.options.render;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            MarkdownRenderer::<HtmlBackend>::new(options).render_markdown(&source)
        }))
        .map_err(|payload| ConvertError::Rendering(panic_message(payload.as_ref())))??;

        tracing::debug!(
            bytes = markdown.len(),
            headings = result.toc.len(),
            has_toc = result.toc_html.is_some(),
            "Rendered document"
        );

        Ok(Rendered {
            content_html: result.html,
            toc_html: result.toc_html,
            toc: result.toc,
            title: result.title,
        })
    }

    /// Place rendered markdown into a complete page.
    #[must_use]
    pub fn compose(rendered: &Rendered, title: &str) -> String {
        render_document(&DocumentData {
            title,
            toc_html: rendered.toc_html.as_deref(),
            content_html: &rendered.content_html,
        })
    }

    /// Convert markdown into a complete page.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Rendering` if the renderer fails or panics.
    pub fn convert(&self, markdown: &str, title: &str) -> Result<String, ConvertError> {
        let rendered = self.render(markdown)?;
        Ok(Self::compose(&rendered, title))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_owned()
    }
}
