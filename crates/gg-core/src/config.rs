//! Rendering mode enums and option bitmasks shared across the workspace.
//!
//! The full canvas configuration lives in `gg-canvas`; the plain value
//! enums live here so the terminal database and the symbol layer can
//! speak the same vocabulary without depending on the canvas crate.

use serde::{Deserialize, Serialize};

/// How colors (and color control codes) are used in the output.
///
/// Ordered by capability for fallback purposes:
/// truecolor > 256 > 240 > 16 > 8 > fgbg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum CanvasMode {
    /// 24-bit direct color escape codes.
    #[default]
    Truecolor,
    /// 256-entry indexed palette.
    Indexed256,
    /// 256-entry palette minus the 16 system colors.
    Indexed240,
    /// 16 system colors.
    Indexed16,
    /// 16 foreground colors over the 8 standard backgrounds.
    Indexed16_8,
    /// 8 standard colors.
    Indexed8,
    /// Two colors, with inverse video available.
    FgBgBgFg,
    /// Two colors, foreground and background only.
    FgBg,
}

impl CanvasMode {
    /// True when cell colors are palette pens rather than packed RGB.
    #[inline]
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        !matches!(self, CanvasMode::Truecolor)
    }
}

/// How pixel graphics are rendered in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum PixelMode {
    /// Pure character-cell output; no pixel graphics.
    #[default]
    Symbols,
    /// DEC sixel graphics.
    Sixels,
    /// Kitty graphics protocol.
    Kitty,
    /// iTerm2 inline image protocol.
    Iterm2,
}

/// Number of pixel modes, for per-mode flag arrays.
pub const PIXEL_MODE_COUNT: usize = 4;

impl PixelMode {
    /// Index into per-mode arrays.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PixelMode::Symbols => 0,
            PixelMode::Sixels => 1,
            PixelMode::Kitty => 2,
            PixelMode::Iterm2 => 3,
        }
    }
}

/// How a cell's representative colors are extracted from its pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColorExtractor {
    /// Arithmetic mean of the covered pixels.
    #[default]
    Average,
    /// Channel-wise median of the covered pixels.
    Median,
}

/// Pre-quantization dithering applied to source pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum DitherMode {
    /// No dithering.
    #[default]
    None,
    /// Ordered (Bayer) threshold pattern tiled at the grain size.
    Ordered,
    /// Error diffusion in scan order.
    Diffusion,
    /// Deterministic per-pixel noise.
    Noise,
}

/// Escape-sequence passthrough for terminal multiplexers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Passthrough {
    /// Emit sequences directly.
    #[default]
    None,
    /// Wrap in GNU Screen DCS passthrough.
    Screen,
    /// Wrap in tmux DCS passthrough.
    Tmux,
}

/// Horizontal or vertical alignment of a placement inside the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Align {
    /// Left or top edge.
    #[default]
    Start,
    /// Right or bottom edge.
    End,
    /// Centered.
    Center,
}

/// Policy reconciling an image's aspect ratio with its placement extents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Tuck {
    /// Fill the extents, ignoring aspect ratio.
    Stretch,
    /// Fit inside the extents, preserving aspect ratio.
    #[default]
    Fit,
    /// Like fit, but never scale up.
    ShrinkToFit,
}

/// Output-size optimization flags. These affect compactness and CPU use,
/// never visual quality.
///
/// # Example
/// ```
/// use gg_core::config::Optimizations;
/// let opt = Optimizations::REUSE_ATTRIBUTES | Optimizations::REPEAT_CELLS;
/// assert!(opt.contains(Optimizations::REPEAT_CELLS));
/// assert!(!opt.contains(Optimizations::SKIP_CELLS));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Optimizations(pub u32);

impl Optimizations {
    /// No optimizations.
    pub const NONE: Optimizations = Optimizations(0);
    /// Reuse the previous cell's attributes when unchanged.
    pub const REUSE_ATTRIBUTES: Optimizations = Optimizations(1 << 0);
    /// Skip cells identical to the previously printed grid.
    pub const SKIP_CELLS: Optimizations = Optimizations(1 << 1);
    /// Collapse runs of one glyph into the terminal repeat sequence.
    pub const REPEAT_CELLS: Optimizations = Optimizations(1 << 2);
    /// All optimizations.
    pub const ALL: Optimizations = Optimizations(0x7fff_ffff);

    /// Whether every flag in `other` is set in `self`.
    #[inline(always)]
    #[must_use]
    pub const fn contains(self, other: Optimizations) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Optimizations {
    type Output = Optimizations;
    fn bitor(self, rhs: Optimizations) -> Optimizations {
        Optimizations(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Optimizations {
    fn bitor_assign(&mut self, rhs: Optimizations) {
        self.0 |= rhs.0;
    }
}
