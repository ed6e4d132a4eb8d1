//! Shared value types for the glyphgrid workspace.
//!
//! Colors and color spaces, pixel layouts and frames, rendering mode
//! enums, canvas geometry, and the core error type.

pub mod color;
pub mod colorspace;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pixels;

pub use color::{COLOR_TRANSPARENT, Color, ColorPair};
pub use colorspace::ColorSpace;
pub use config::{
    Align, CanvasMode, ColorExtractor, DitherMode, Optimizations, Passthrough, PixelMode, Tuck,
};
pub use error::CoreError;
pub use geometry::calc_canvas_geometry;
pub use pixels::{Frame, PixelType};
