//! The canvas: converts pixels into a cell grid (or a pixel-protocol
//! payload) and exposes per-cell pokes.
//!
//! A canvas snapshots its [`CanvasConfig`] at construction; later edits
//! to the caller's config do not affect it. [`Canvas::draw_all_pixels`]
//! covers the whole canvas; aspect-correct sizing is the caller's job
//! via [`gg_core::geometry::calc_canvas_geometry`], while placements
//! fit and align within the canvas themselves.

use rayon::prelude::*;

use gg_core::color::{COLOR_TRANSPARENT, Color};
use gg_core::colorspace::ColorSpace;
use gg_core::config::{Align, CanvasMode, PixelMode, Tuck};
use gg_core::error::CoreError;
use gg_core::geometry::calc_canvas_geometry;
use gg_core::pixels::{PixelType, unpack_pixels};
use gg_symbols::map::PreparedMap;

use crate::config::CanvasConfig;
use crate::dither::Ditherer;
use crate::error::CanvasError;
use crate::matcher::{CELL_PIXELS, Matcher};
use crate::palette::{Palette, TRANSPARENT_PEN};
use crate::pixgfx::PixelCanvas;
use crate::placement::Placement;

/// Horizontal pixels per cell in the symbol-matching grid.
pub const CELL_W: usize = 8;
/// Vertical pixels per cell in the symbol-matching grid.
pub const CELL_H: usize = 8;

/// One cell color: absent, exact, or a palette pen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellColor {
    /// The terminal's default shows through.
    Transparent,
    /// An exact color (truecolor mode).
    Direct(Color),
    /// A palette pen.
    Pen(u16),
}

/// One character cell. `c == '\0'` marks the right half of a wide pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasCell {
    /// Glyph.
    pub c: char,
    /// Foreground.
    pub fg: CellColor,
    /// Background.
    pub bg: CellColor,
}

impl Default for CanvasCell {
    fn default() -> Self {
        CanvasCell {
            c: ' ',
            fg: CellColor::Transparent,
            bg: CellColor::Transparent,
        }
    }
}

/// Converts pixels to terminal output under one configuration.
pub struct Canvas {
    config: CanvasConfig,
    width: usize,
    height: usize,
    cells: Vec<CanvasCell>,
    pixels: Vec<Color>,
    palette: Palette,
    prepared: PreparedMap,
    prepared_fill: PreparedMap,
    pub(crate) pixel_canvas: Option<PixelCanvas>,
    pub(crate) prev_cells: Option<Vec<CanvasCell>>,
    pub(crate) placement_id: i32,
}

struct RowMatcher<'a> {
    width: usize,
    grid_w: usize,
    pixels: &'a [Color],
    prepared: &'a PreparedMap,
    fill: &'a PreparedMap,
    matcher: Matcher,
    mode: CanvasMode,
    space: ColorSpace,
    palette: &'a Palette,
    alpha_threshold: i32,
    quantized: bool,
    fg: Color,
    bg: Color,
}

impl RowMatcher<'_> {
    fn cell_pixels(&self, cx: usize, cy: usize) -> [Color; CELL_PIXELS] {
        let mut out = [Color::new(0, 0, 0, 0); CELL_PIXELS];
        for y in 0..CELL_H {
            let row = (cy * CELL_H + y) * self.grid_w + cx * CELL_W;
            out[y * CELL_W..y * CELL_W + CELL_W]
                .copy_from_slice(&self.pixels[row..row + CELL_W]);
        }
        out
    }

    fn quantize(&self, c: Color) -> CellColor {
        if i32::from(c.ch[3]) <= self.alpha_threshold {
            return CellColor::Transparent;
        }
        if self.mode == CanvasMode::Truecolor {
            return CellColor::Direct(Color::new(c.ch[0], c.ch[1], c.ch[2], 255));
        }
        match self.palette.lookup(c, self.space) {
            TRANSPARENT_PEN => CellColor::Transparent,
            pen => CellColor::Pen(pen as u16),
        }
    }

    fn match_fgbg(&self, pixels: &[Color; CELL_PIXELS]) -> CanvasCell {
        let allow_invert = self.mode == CanvasMode::FgBgBgFg;
        let (m, ham) = self
            .matcher
            .match_cell_fixed(self.prepared, pixels, self.fg, self.bg, allow_invert);
        let mut c = m.c;
        let mut inverted = m.inverted;
        if !self.fill.is_empty() {
            let bright = pixels
                .iter()
                .filter(|p| p.dist_sq(self.fg) < p.dist_sq(self.bg))
                .count() as u32;
            if let Some((fc, gap)) = self.matcher.match_cell_fill(self.fill, bright) {
                if gap < ham {
                    c = fc;
                    inverted = false;
                }
            }
        }
        let (fg, bg) = if inverted {
            (CellColor::Pen(0), CellColor::Pen(1))
        } else {
            (CellColor::Pen(1), CellColor::Pen(0))
        };
        CanvasCell { c, fg, bg }
    }

    fn match_row(&self, cy: usize) -> Vec<CanvasCell> {
        let fgbg = matches!(self.mode, CanvasMode::FgBg | CanvasMode::FgBgBgFg);
        let mut cells = Vec::with_capacity(self.width);
        let mut errs = vec![0i64; self.width];
        for cx in 0..self.width {
            let px = self.cell_pixels(cx, cy);
            if fgbg {
                cells.push(self.match_fgbg(&px));
            } else {
                let (m, err) = if self.quantized {
                    self.matcher
                        .match_cell_quantized(self.prepared, &px, self.palette, self.space)
                } else {
                    self.matcher.match_cell(self.prepared, &px)
                };
                errs[cx] = err;
                cells.push(CanvasCell {
                    c: m.c,
                    fg: self.quantize(m.fg),
                    bg: self.quantize(m.bg),
                });
            }
        }

        // Wide candidates compete against the pair of singles they cover.
        if !fgbg && !self.prepared.symbols2.is_empty() {
            let mut cx = 0;
            while cx + 1 < self.width {
                let left = self.cell_pixels(cx, cy);
                let right = self.cell_pixels(cx + 1, cy);
                if let Some((m, err)) = self.matcher.match_cell_pair(self.prepared, &left, &right)
                {
                    if err < errs[cx] + errs[cx + 1] {
                        let fg = self.quantize(m.fg);
                        let bg = self.quantize(m.bg);
                        cells[cx] = CanvasCell { c: m.c, fg, bg };
                        cells[cx + 1] = CanvasCell { c: '\0', fg, bg };
                        cx += 2;
                        continue;
                    }
                }
                cx += 2;
            }
        }
        cells
    }
}

fn scale_box(src: &[Color], sw: usize, sh: usize, dw: usize, dh: usize) -> Vec<Color> {
    let mut out = Vec::with_capacity(dw * dh);
    for dy in 0..dh {
        let y0 = dy * sh / dh;
        let y1 = (((dy + 1) * sh).div_ceil(dh)).clamp(y0 + 1, sh.max(y0 + 1));
        for dx in 0..dw {
            let x0 = dx * sw / dw;
            let x1 = (((dx + 1) * sw).div_ceil(dw)).clamp(x0 + 1, sw.max(x0 + 1));
            let mut sum = [0u32; 4];
            let mut n = 0u32;
            for y in y0..y1.min(sh) {
                for x in x0..x1.min(sw) {
                    let c = src[y * sw + x];
                    for k in 0..4 {
                        sum[k] += u32::from(c.ch[k]);
                    }
                    n += 1;
                }
            }
            if n == 0 {
                out.push(Color::new(0, 0, 0, 0));
            } else {
                out.push(Color::new(
                    (sum[0] / n) as u8,
                    (sum[1] / n) as u8,
                    (sum[2] / n) as u8,
                    (sum[3] / n) as u8,
                ));
            }
        }
    }
    out
}

impl Canvas {
    /// Builds a canvas for `config` (normalized with
    /// [`CanvasConfig::clamp_all`] first).
    pub fn new(mut config: CanvasConfig) -> Result<Canvas, CanvasError> {
        config.clamp_all();
        let prepared = config.symbol_map.prepare();
        let prepared_fill = config.fill_symbol_map.prepare();
        if config.pixel_mode == PixelMode::Symbols && prepared.is_empty() {
            log::warn!("symbol map selects nothing; output will be spaces");
        }
        let palette = Palette::fixed(
            config.canvas_mode,
            Color::from_packed_rgb(config.fg_color),
            Color::from_packed_rgb(config.bg_color),
            config.alpha_threshold,
        );
        let (width, height) = (config.width as usize, config.height as usize);
        Ok(Canvas {
            cells: vec![CanvasCell::default(); width * height],
            pixels: vec![Color::new(0, 0, 0, 0); width * CELL_W * height * CELL_H],
            palette,
            prepared,
            prepared_fill,
            pixel_canvas: None,
            prev_cells: None,
            placement_id: 0,
            config,
            width,
            height,
        })
    }

    /// A fresh, blank canvas with this canvas's configuration.
    pub fn new_similar(&self) -> Result<Canvas, CanvasError> {
        Canvas::new(self.config.clone())
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The configuration this canvas was built from.
    #[must_use]
    pub fn peek_config(&self) -> &CanvasConfig {
        &self.config
    }

    pub(crate) fn cells(&self) -> &[CanvasCell] {
        &self.cells
    }

    pub(crate) fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replaces the whole canvas with `data`, stretching it to cover
    /// every cell.
    pub fn draw_all_pixels(
        &mut self,
        pixel_type: PixelType,
        data: &[u8],
        width: u32,
        height: u32,
        rowstride: u32,
    ) -> Result<(), CanvasError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height }.into());
        }
        let src = unpack_pixels(pixel_type, data, width, height, rowstride).ok_or(
            CoreError::BufferTooSmall {
                needed: height as usize * rowstride as usize,
                got: data.len(),
            },
        )?;
        self.render(&src, width as usize, height as usize, None);
        Ok(())
    }

    /// Rasterizes a placement, fitting and aligning its image per the
    /// placement's tuck and alignment. Cells outside the image are
    /// transparent. A placement with no frame clears the canvas.
    pub fn set_placement(&mut self, placement: &Placement) -> Result<(), CanvasError> {
        self.placement_id = placement.id();
        let Some(frame) = placement.image().frame() else {
            self.cells.fill(CanvasCell::default());
            self.pixels.fill(Color::new(0, 0, 0, 0));
            return Ok(());
        };
        let (sw, sh) = (frame.width() as usize, frame.height() as usize);
        let mut src = Vec::with_capacity(sw * sh);
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                src.push(frame.pixel(x, y));
            }
        }
        let rect = self.placement_rect(sw, sh, placement);
        self.render(&src, sw, sh, Some(rect));
        Ok(())
    }

    /// Destination cell rect (x, y, w, h) for a placement.
    fn placement_rect(&self, sw: usize, sh: usize, p: &Placement) -> (usize, usize, usize, usize) {
        let (cw, ch) = self.config.cell_size_px();
        let font_ratio = cw as f32 / ch as f32;
        let (dw, dh) = match p.tuck {
            Tuck::Stretch => (self.width as i32, self.height as i32),
            Tuck::Fit | Tuck::ShrinkToFit => calc_canvas_geometry(
                sw as i32,
                sh as i32,
                self.width as i32,
                self.height as i32,
                font_ratio,
                p.tuck == Tuck::Fit,
                false,
            ),
        };
        let dw = (dw.max(1) as usize).min(self.width);
        let dh = (dh.max(1) as usize).min(self.height);
        let place = |avail: usize, used: usize, align: Align| match align {
            Align::Start => 0,
            Align::Center => (avail - used) / 2,
            Align::End => avail - used,
        };
        (
            place(self.width, dw, p.halign),
            place(self.height, dh, p.valign),
            dw,
            dh,
        )
    }

    fn render(&mut self, src: &[Color], sw: usize, sh: usize, rect: Option<(usize, usize, usize, usize)>) {
        let rect = rect.unwrap_or((0, 0, self.width, self.height));
        match self.config.pixel_mode {
            PixelMode::Symbols => self.render_symbols(src, sw, sh, rect),
            mode => self.render_pixels(src, sw, sh, rect, mode),
        }
    }

    fn render_symbols(&mut self, src: &[Color], sw: usize, sh: usize, rect: (usize, usize, usize, usize)) {
        let (rx, ry, rw, rh) = rect;
        let grid_w = self.width * CELL_W;
        let grid_h = self.height * CELL_H;
        let scaled = scale_box(src, sw, sh, rw * CELL_W, rh * CELL_H);

        let mut pix = vec![Color::new(0, 0, 0, 0); grid_w * grid_h];
        for y in 0..rh * CELL_H {
            let dst = (ry * CELL_H + y) * grid_w + rx * CELL_W;
            pix[dst..dst + rw * CELL_W]
                .copy_from_slice(&scaled[y * rw * CELL_W..(y + 1) * rw * CELL_W]);
        }

        if self.config.canvas_mode.is_indexed() && self.config.dither_mode != gg_core::config::DitherMode::None {
            let d = Ditherer::new(
                self.config.dither_mode,
                self.config.dither_intensity,
                self.config.dither_grain_width,
                self.config.dither_grain_height,
            );
            d.apply(&mut pix, grid_w, grid_h, &self.palette, self.config.color_space);
        }
        self.pixels = pix;
        self.match_all();
    }

    fn match_all(&mut self) {
        let rm = RowMatcher {
            width: self.width,
            grid_w: self.width * CELL_W,
            pixels: &self.pixels,
            prepared: &self.prepared,
            fill: &self.prepared_fill,
            matcher: Matcher {
                work_factor: self.config.work_factor,
                extractor: self.config.color_extractor,
            },
            mode: self.config.canvas_mode,
            space: self.config.color_space,
            palette: &self.palette,
            alpha_threshold: self.config.alpha_threshold,
            quantized: self.config.quantized_error
                && !matches!(
                    self.config.canvas_mode,
                    CanvasMode::Truecolor | CanvasMode::FgBg | CanvasMode::FgBgBgFg
                ),
            fg: Color::from_packed_rgb(self.config.fg_color),
            bg: Color::from_packed_rgb(self.config.bg_color),
        };
        let h = self.height;
        let rows: Vec<Vec<CanvasCell>> = match self.config.n_threads {
            1 => (0..h).map(|cy| rm.match_row(cy)).collect(),
            0 => (0..h).into_par_iter().map(|cy| rm.match_row(cy)).collect(),
            n => match rayon::ThreadPoolBuilder::new().num_threads(n as usize).build() {
                Ok(pool) => {
                    pool.install(|| (0..h).into_par_iter().map(|cy| rm.match_row(cy)).collect())
                }
                Err(e) => {
                    log::warn!("thread pool ({n} threads) unavailable: {e}");
                    (0..h).map(|cy| rm.match_row(cy)).collect()
                }
            },
        };
        self.cells = rows.concat();
    }

    fn render_pixels(&mut self, src: &[Color], sw: usize, sh: usize, rect: (usize, usize, usize, usize), mode: PixelMode) {
        let (rx, ry, rw, rh) = rect;
        let (cw, ch) = self.config.cell_size_px();
        let (cw, ch) = (cw as usize, ch as usize);
        let full_w = self.width * cw;
        let full_h = self.height * ch;
        let scaled = scale_box(src, sw, sh, rw * cw, rh * ch);

        let mut pix = vec![Color::new(0, 0, 0, 0); full_w * full_h];
        for y in 0..rh * ch {
            let dst = (ry * ch + y) * full_w + rx * cw;
            pix[dst..dst + rw * cw].copy_from_slice(&scaled[y * rw * cw..(y + 1) * rw * cw]);
        }

        self.pixel_canvas = Some(match mode {
            PixelMode::Sixels => PixelCanvas::Sixel {
                pixels: pix,
                width: full_w,
                height: full_h,
            },
            PixelMode::Kitty => PixelCanvas::Kitty {
                rgba: pix.iter().flat_map(|c| c.ch).collect(),
                width: full_w,
                height: full_h,
            },
            _ => PixelCanvas::Iterm2 {
                rgba: pix.iter().flat_map(|c| c.ch).collect(),
                width: full_w,
                height: full_h,
            },
        });
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// The glyph at (x, y); `'\0'` for the right half of a wide pair,
    /// `None` out of bounds.
    #[must_use]
    pub fn char_at(&self, x: i32, y: i32) -> Option<char> {
        self.cell_index(x, y).map(|i| self.cells[i].c)
    }

    /// Pokes a glyph into (x, y). Control characters and out-of-bounds
    /// coordinates are silent no-ops; poking over half of a wide pair
    /// dissolves the pair.
    pub fn set_char_at(&mut self, x: i32, y: i32, c: char) {
        if c != '\0' && c.is_control() {
            return;
        }
        let Some(i) = self.cell_index(x, y) else {
            return;
        };
        // Dissolve a wide pair this poke overlaps.
        if self.cells[i].c == '\0' && i > 0 {
            self.cells[i - 1].c = ' ';
        }
        if i + 1 < self.cells.len() && self.cells[i + 1].c == '\0' {
            self.cells[i + 1].c = ' ';
        }
        self.cells[i].c = c;
    }

    fn color_to_packed(&self, c: CellColor) -> i32 {
        match c {
            CellColor::Transparent => COLOR_TRANSPARENT,
            CellColor::Direct(c) => c.packed_rgb() as i32,
            CellColor::Pen(p) => self.palette.color(usize::from(p)).packed_rgb() as i32,
        }
    }

    fn packed_to_color(&self, v: i32) -> CellColor {
        if v < 0 {
            return CellColor::Transparent;
        }
        let c = Color::from_packed_rgb(v as u32);
        if self.config.canvas_mode == CanvasMode::Truecolor {
            CellColor::Direct(c)
        } else {
            match self.palette.lookup(c, self.config.color_space) {
                TRANSPARENT_PEN => CellColor::Transparent,
                pen => CellColor::Pen(pen as u16),
            }
        }
    }

    /// Cell colors at (x, y) as packed 0xRRGGBB, -1 for transparent.
    /// Pens report their palette RGB.
    #[must_use]
    pub fn colors_at(&self, x: i32, y: i32) -> (i32, i32) {
        let Some(i) = self.cell_index(x, y) else {
            return (COLOR_TRANSPARENT, COLOR_TRANSPARENT);
        };
        (
            self.color_to_packed(self.cells[i].fg),
            self.color_to_packed(self.cells[i].bg),
        )
    }

    /// Pokes packed colors into (x, y); indexed modes quantize to pens.
    pub fn set_colors_at(&mut self, x: i32, y: i32, fg: i32, bg: i32) {
        let Some(i) = self.cell_index(x, y) else {
            return;
        };
        self.cells[i].fg = self.packed_to_color(fg);
        self.cells[i].bg = self.packed_to_color(bg);
    }

    /// Raw cell colors: pens in indexed modes, packed RGB in truecolor,
    /// -1 for transparent.
    #[must_use]
    pub fn raw_colors_at(&self, x: i32, y: i32) -> (i32, i32) {
        let raw = |c: CellColor| match c {
            CellColor::Transparent => COLOR_TRANSPARENT,
            CellColor::Direct(c) => c.packed_rgb() as i32,
            CellColor::Pen(p) => i32::from(p),
        };
        let Some(i) = self.cell_index(x, y) else {
            return (COLOR_TRANSPARENT, COLOR_TRANSPARENT);
        };
        (raw(self.cells[i].fg), raw(self.cells[i].bg))
    }

    /// Pokes raw cell colors (see [`Canvas::raw_colors_at`]).
    pub fn set_raw_colors_at(&mut self, x: i32, y: i32, fg: i32, bg: i32) {
        let Some(i) = self.cell_index(x, y) else {
            return;
        };
        let to_color = |v: i32| {
            if v < 0 {
                CellColor::Transparent
            } else if self.config.canvas_mode == CanvasMode::Truecolor {
                CellColor::Direct(Color::from_packed_rgb(v as u32))
            } else {
                CellColor::Pen(v.min(i32::from(u16::MAX)) as u16)
            }
        };
        let (fg, bg) = (to_color(fg), to_color(bg));
        self.cells[i].fg = fg;
        self.cells[i].bg = bg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_symbols::tags::SymbolTags;

    fn config(w: i32, h: i32) -> CanvasConfig {
        let mut c = CanvasConfig::new();
        c.width = w;
        c.height = h;
        c.n_threads = 1;
        c
    }

    fn red_rgba(w: usize, h: usize) -> Vec<u8> {
        let mut v = Vec::with_capacity(w * h * 4);
        for _ in 0..w * h {
            v.extend_from_slice(&[255, 0, 0, 255]);
        }
        v
    }

    #[test]
    fn solid_red_fills_every_cell_with_red() {
        let mut cfg = config(4, 2);
        cfg.symbol_map = gg_symbols::map::SymbolMap::new();
        cfg.symbol_map.add_by_tags(SymbolTags::SPACE | SymbolTags::SOLID);
        let mut canvas = Canvas::new(cfg).unwrap();
        canvas
            .draw_all_pixels(PixelType::Rgba8Unassociated, &red_rgba(3, 3), 3, 3, 12)
            .unwrap();
        for y in 0..2 {
            for x in 0..4 {
                let c = canvas.char_at(x, y).unwrap();
                let (fg, bg) = canvas.colors_at(x, y);
                match c {
                    ' ' => assert_eq!(bg, 0xff0000),
                    '█' => assert_eq!(fg, 0xff0000),
                    other => panic!("unexpected glyph {other:?}"),
                }
            }
        }
    }

    #[test]
    fn every_pixel_layout_draws() {
        use gg_core::pixels::PIXEL_TYPES;
        for pt in PIXEL_TYPES {
            let bpp = pt.bytes_per_pixel();
            let data = vec![0x80u8; 4 * 4 * bpp];
            let mut canvas = Canvas::new(config(2, 1)).unwrap();
            canvas
                .draw_all_pixels(pt, &data, 4, 4, (4 * bpp) as u32)
                .unwrap();
            assert!(canvas.char_at(0, 0).is_some());
        }
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut canvas = Canvas::new(config(2, 1)).unwrap();
        let err = canvas.draw_all_pixels(PixelType::Rgba8Unassociated, &[0; 8], 4, 4, 16);
        assert!(err.is_err());
        let err = canvas.draw_all_pixels(PixelType::Rgb8, &red_rgba(2, 2), 0, 2, 8);
        assert!(err.is_err());
    }

    #[test]
    fn cell_pokes_round_trip_and_ignore_garbage() {
        let mut canvas = Canvas::new(config(4, 2)).unwrap();
        canvas.set_char_at(1, 1, 'x');
        assert_eq!(canvas.char_at(1, 1), Some('x'));
        canvas.set_char_at(1, 1, '\x07');
        assert_eq!(canvas.char_at(1, 1), Some('x'));
        canvas.set_char_at(99, 0, 'y');
        assert_eq!(canvas.char_at(99, 0), None);

        canvas.set_colors_at(0, 0, 0x123456, -1);
        assert_eq!(canvas.colors_at(0, 0), (0x123456, -1));
        assert_eq!(canvas.raw_colors_at(0, 0), (0x123456, -1));
    }

    #[test]
    fn indexed_pokes_quantize_to_pens() {
        let mut cfg = config(2, 1);
        cfg.canvas_mode = CanvasMode::Indexed256;
        let mut canvas = Canvas::new(cfg).unwrap();
        canvas.set_colors_at(0, 0, 0xff0000, 0x000000);
        let (fg_raw, bg_raw) = canvas.raw_colors_at(0, 0);
        assert_eq!(fg_raw, 9);
        assert_eq!(bg_raw, 0);
        assert_eq!(canvas.colors_at(0, 0).0, 0xff0000);
    }

    #[test]
    fn placement_fits_and_centers() {
        use crate::placement::{Image, Placement};
        use gg_core::pixels::Frame;
        use std::sync::Arc;

        let mut cfg = config(8, 8);
        cfg.cell_width = 8;
        cfg.cell_height = 16;
        let mut canvas = Canvas::new(cfg).unwrap();

        let frame =
            Frame::new(PixelType::Rgba8Unassociated, red_rgba(16, 16), 16, 16, 64).unwrap();
        let mut img = Image::new();
        img.set_frame(Arc::new(frame));
        let mut p = Placement::new(Arc::new(img), 0);
        p.halign = Align::Center;
        p.valign = Align::Center;
        canvas.set_placement(&p).unwrap();

        // A square image in 8x8 cells at 1:2 font ratio spans all columns
        // but only the middle rows.
        let (_, bg_top) = canvas.colors_at(4, 0);
        assert_eq!(bg_top, -1);
        let c_mid = canvas.char_at(4, 4).unwrap();
        assert!(c_mid == '█' || canvas.colors_at(4, 4).1 == 0xff0000, "{c_mid:?}");
    }
}
