//! Canvas rendering for glyphgrid: pixels in, terminal output out.
//!
//! A [`canvas::Canvas`] snapshots a [`config::CanvasConfig`], converts
//! drawn pixels into character cells (or a sixel/Kitty/iTerm2 payload),
//! and prints them as escape streams tailored to a
//! [`gg_term::terminfo::TermInfo`].
//!
//! ```
//! use gg_canvas::canvas::Canvas;
//! use gg_canvas::config::CanvasConfig;
//! use gg_core::pixels::PixelType;
//! use gg_term::termdb::TermDb;
//!
//! let mut config = CanvasConfig::new();
//! config.width = 4;
//! config.height = 2;
//! let mut canvas = Canvas::new(config).unwrap();
//! canvas
//!     .draw_all_pixels(PixelType::Rgb8, &[0x40; 4 * 4 * 3], 4, 4, 12)
//!     .unwrap();
//! let ti = TermDb::new().fallback_info();
//! let out = canvas.print(&ti).unwrap();
//! assert!(!out.is_empty());
//! ```

pub mod canvas;
pub mod config;
pub mod dither;
pub mod error;
pub mod matcher;
pub mod palette;
pub mod pixgfx;
pub mod placement;
mod print;

pub use canvas::{Canvas, CanvasCell, CellColor};
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use placement::{Image, Placement};
