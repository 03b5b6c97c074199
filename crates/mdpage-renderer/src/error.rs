//! Error types for markdown rendering.

use crate::highlight::HighlightError;

/// Error returned when rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A code block could not be highlighted.
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}
