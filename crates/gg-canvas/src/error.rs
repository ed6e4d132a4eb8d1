//! Canvas error type.

use gg_core::error::CoreError;

/// Errors surfaced while configuring, drawing to, or printing a canvas.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The configuration cannot produce a canvas.
    #[error("bad canvas configuration: {0}")]
    Config(String),

    /// A pixel buffer or frame was rejected.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Encoding an inline image payload failed.
    #[error("image encode failed: {0}")]
    Encode(String),
}
