//! Error types for document conversion.

use mdpage_renderer::RenderError;

/// Error returned when a document cannot be converted.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The markdown renderer failed or panicked.
    #[error("Failed to render markdown: {0}")]
    Rendering(String),
}

impl From<RenderError> for ConvertError {
    fn from(err: RenderError) -> Self {
        Self::Rendering(err.to_string())
    }
}
