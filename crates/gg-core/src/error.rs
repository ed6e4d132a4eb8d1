use thiserror::Error;

/// Errors originating from the core types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid width/height dimensions.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// A pixel buffer is too small for its stated geometry.
    #[error("pixel buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes implied by width/height/rowstride.
        needed: usize,
        /// Bytes actually supplied.
        got: usize,
    },
}
