//! Canvas configuration.
//!
//! A [`CanvasConfig`] is assembled by the caller and snapshotted by
//! [`crate::canvas::Canvas::new`]; later edits do not affect existing
//! canvases. [`CanvasConfig::clamp_all`] normalizes every field into its
//! valid range rather than erroring, the same contract the setters of
//! the C-era API offered.

use gg_core::colorspace::ColorSpace;
use gg_core::config::{
    CanvasMode, ColorExtractor, DitherMode, Optimizations, Passthrough, PixelMode,
};
use gg_symbols::map::SymbolMap;
use gg_symbols::tags::SymbolTags;

/// Everything that shapes how a canvas converts and prints pixels.
#[derive(Clone, Debug)]
pub struct CanvasConfig {
    /// Canvas width in character cells.
    pub width: i32,
    /// Canvas height in character cells.
    pub height: i32,
    /// Cell width in pixels; -1 when unknown.
    pub cell_width: i32,
    /// Cell height in pixels; -1 when unknown.
    pub cell_height: i32,
    /// Color resolution of the output.
    pub canvas_mode: CanvasMode,
    /// Color space used for palette matching.
    pub color_space: ColorSpace,
    /// Dither applied before indexed-mode matching.
    pub dither_mode: DitherMode,
    /// How cell foreground/background colors are derived.
    pub color_extractor: ColorExtractor,
    /// Character cells, sixels, or an inline image protocol.
    pub pixel_mode: PixelMode,
    /// Dither grain width in pixels (1, 2, 4 or 8).
    pub dither_grain_width: i32,
    /// Dither grain height in pixels (1, 2, 4 or 8).
    pub dither_grain_height: i32,
    /// Dither strength; 1.0 is the norm, 0.0 disables.
    pub dither_intensity: f32,
    /// Assumed terminal foreground, packed 0xRRGGBB.
    pub fg_color: u32,
    /// Assumed terminal background, packed 0xRRGGBB.
    pub bg_color: u32,
    /// Alpha at or below which a pixel counts as transparent (0-255;
    /// 255 disables transparency in the output).
    pub alpha_threshold: i32,
    /// Quality/speed tradeoff in 0.0..=1.0; higher tries more candidates.
    pub work_factor: f32,
    /// Score candidates against palette-quantized colors in the indexed
    /// modes. Slower, but never picks a glyph that quantizes badly.
    pub quantized_error: bool,
    /// Symbols eligible for cell matching.
    pub symbol_map: SymbolMap,
    /// Symbols used to approximate mixed coverage in low-color modes.
    pub fill_symbol_map: SymbolMap,
    /// Emit only foreground colors, leaving the background untouched.
    pub fg_only: bool,
    /// Output size optimizations to apply when printing.
    pub optimizations: Optimizations,
    /// Multiplexer passthrough for pixel-mode escape streams.
    pub passthrough: Passthrough,
    /// Worker threads for cell matching; 0 picks the rayon default,
    /// 1 stays single-threaded.
    pub n_threads: i32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let mut symbol_map = SymbolMap::new();
        symbol_map.add_by_tags(SymbolTags::ALL);
        CanvasConfig {
            width: 80,
            height: 24,
            cell_width: -1,
            cell_height: -1,
            canvas_mode: CanvasMode::Truecolor,
            color_space: ColorSpace::Rgb,
            dither_mode: DitherMode::None,
            color_extractor: ColorExtractor::Average,
            pixel_mode: PixelMode::Symbols,
            dither_grain_width: 4,
            dither_grain_height: 4,
            dither_intensity: 1.0,
            fg_color: 0x00ff_ffff,
            bg_color: 0x0000_0000,
            alpha_threshold: 127,
            work_factor: 0.5,
            quantized_error: false,
            symbol_map,
            fill_symbol_map: SymbolMap::new(),
            fg_only: false,
            optimizations: Optimizations::NONE,
            passthrough: Passthrough::None,
            n_threads: 0,
        }
    }
}

fn snap_grain(g: i32) -> i32 {
    match g {
        i32::MIN..=1 => 1,
        2 | 3 => 2,
        4..=7 => 4,
        _ => 8,
    }
}

impl CanvasConfig {
    /// A fresh configuration with the stock defaults (80x24 truecolor
    /// symbol cells, all safe symbols selected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces every field into its valid range.
    pub fn clamp_all(&mut self) {
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        if self.cell_width <= 0 {
            self.cell_width = -1;
        }
        if self.cell_height <= 0 {
            self.cell_height = -1;
        }
        self.dither_grain_width = snap_grain(self.dither_grain_width);
        self.dither_grain_height = snap_grain(self.dither_grain_height);
        self.dither_intensity = self.dither_intensity.clamp(0.0, 10.0);
        self.fg_color &= 0x00ff_ffff;
        self.bg_color &= 0x00ff_ffff;
        self.alpha_threshold = self.alpha_threshold.clamp(0, 255);
        self.work_factor = self.work_factor.clamp(0.0, 1.0);
        self.n_threads = self.n_threads.clamp(0, 256);
    }

    /// Cell pixel size, substituting a common default when unknown.
    #[must_use]
    pub fn cell_size_px(&self) -> (u32, u32) {
        let w = if self.cell_width > 0 { self.cell_width } else { 8 };
        let h = if self.cell_height > 0 {
            self.cell_height
        } else {
            16
        };
        (w as u32, h as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_as_is() {
        let c = CanvasConfig::new();
        assert_eq!((c.width, c.height), (80, 24));
        assert_eq!(c.canvas_mode, CanvasMode::Truecolor);
        assert!(!c.symbol_map.prepare().is_empty());
    }

    #[test]
    fn clamp_all_normalizes_out_of_range_fields() {
        let mut c = CanvasConfig::new();
        c.width = -5;
        c.dither_grain_width = 3;
        c.dither_grain_height = 100;
        c.work_factor = 7.0;
        c.alpha_threshold = 999;
        c.fg_color = 0xff00_0000;
        c.clamp_all();
        assert_eq!(c.width, 1);
        assert_eq!(c.dither_grain_width, 2);
        assert_eq!(c.dither_grain_height, 8);
        assert_eq!(c.work_factor, 1.0);
        assert_eq!(c.alpha_threshold, 255);
        assert_eq!(c.fg_color, 0);
    }
}
