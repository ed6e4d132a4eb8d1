//! Symbol matching: pick the glyph and color pair that best reproduce
//! one 8x8 pixel cell.
//!
//! Matching is two-staged. A cheap pass ranks every candidate by the
//! Hamming distance between its coverage bitmap and a luminance-threshold
//! bitmap of the cell; the top slice (sized by the work factor) is then
//! scored exactly, with per-candidate foreground/background colors
//! extracted from the pixels the candidate's bitmap partitions.

use gg_core::color::Color;
use gg_core::colorspace::ColorSpace;
use gg_core::config::ColorExtractor;
use gg_symbols::map::PreparedMap;

use crate::palette::{Palette, TRANSPARENT_PEN};

/// Pixels per cell (8x8).
pub const CELL_PIXELS: usize = 64;

/// A matched cell: glyph plus extracted colors.
#[derive(Clone, Copy, Debug)]
pub struct CellMatch {
    /// The chosen glyph.
    pub c: char,
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
}

/// A match against fixed terminal colors (FGBG modes).
#[derive(Clone, Copy, Debug)]
pub struct FixedMatch {
    /// The chosen glyph.
    pub c: char,
    /// Whether the cell renders in inverse video.
    pub inverted: bool,
}

#[inline(always)]
fn luminance(c: Color) -> u32 {
    2126 * u32::from(c.ch[0]) + 7152 * u32::from(c.ch[1]) + 722 * u32::from(c.ch[2])
}

/// Threshold bitmap: bit set where the pixel is brighter than the mean.
fn coverage_bitmap(pixels: &[Color]) -> u64 {
    let mut total: u64 = 0;
    for p in pixels {
        total += u64::from(luminance(*p));
    }
    let mean = total / pixels.len() as u64;
    let mut bm = 0u64;
    for (i, p) in pixels.iter().enumerate() {
        if u64::from(luminance(*p)) > mean {
            bm |= 1 << i;
        }
    }
    bm
}

fn group_color(pixels: &[Color], bitmap: u64, want_set: bool, extractor: ColorExtractor) -> Color {
    match extractor {
        ColorExtractor::Average => {
            let mut sum = [0u32; 4];
            let mut n = 0u32;
            for (i, p) in pixels.iter().enumerate() {
                if (bitmap >> (i % 64)) & 1 == u64::from(want_set) {
                    for k in 0..4 {
                        sum[k] += u32::from(p.ch[k]);
                    }
                    n += 1;
                }
            }
            if n == 0 {
                return Color::new(0, 0, 0, 0);
            }
            Color::new(
                (sum[0] / n) as u8,
                (sum[1] / n) as u8,
                (sum[2] / n) as u8,
                (sum[3] / n) as u8,
            )
        }
        ColorExtractor::Median => {
            let mut chans: [Vec<u8>; 4] = Default::default();
            for (i, p) in pixels.iter().enumerate() {
                if (bitmap >> (i % 64)) & 1 == u64::from(want_set) {
                    for k in 0..4 {
                        chans[k].push(p.ch[k]);
                    }
                }
            }
            if chans[0].is_empty() {
                return Color::new(0, 0, 0, 0);
            }
            let mut out = [0u8; 4];
            for k in 0..4 {
                chans[k].sort_unstable();
                out[k] = chans[k][chans[k].len() / 2];
            }
            Color::new(out[0], out[1], out[2], out[3])
        }
    }
}

fn partition_error(pixels: &[Color], bitmap: u64, fg: Color, bg: Color) -> i64 {
    let mut err = 0i64;
    for (i, p) in pixels.iter().enumerate() {
        let target = if (bitmap >> (i % 64)) & 1 == 1 { fg } else { bg };
        err += p.dist_sq(target);
    }
    err
}

/// Glyph/color matcher for one canvas configuration.
#[derive(Clone, Copy, Debug)]
pub struct Matcher {
    /// Fraction of candidates scored exactly after the coarse pass.
    pub work_factor: f32,
    /// How per-candidate colors are derived.
    pub extractor: ColorExtractor,
}

impl Matcher {
    fn top_k(&self, n: usize) -> usize {
        ((n as f32 * self.work_factor) as usize).clamp(4.min(n), n)
    }

    /// Best glyph and free colors for one 8x8 cell.
    ///
    /// Returns the match and its summed squared error.
    #[must_use]
    pub fn match_cell(&self, map: &PreparedMap, pixels: &[Color; CELL_PIXELS]) -> (CellMatch, i64) {
        self.match_cell_inner(map, pixels, None)
    }

    /// Like [`Matcher::match_cell`], but candidate errors are computed
    /// against the palette-quantized extracted colors, so a candidate
    /// that quantizes badly loses to one that quantizes well.
    #[must_use]
    pub fn match_cell_quantized(
        &self,
        map: &PreparedMap,
        pixels: &[Color; CELL_PIXELS],
        palette: &Palette,
        space: ColorSpace,
    ) -> (CellMatch, i64) {
        self.match_cell_inner(map, pixels, Some((palette, space)))
    }

    fn match_cell_inner(
        &self,
        map: &PreparedMap,
        pixels: &[Color; CELL_PIXELS],
        quantize: Option<(&Palette, ColorSpace)>,
    ) -> (CellMatch, i64) {
        let quantized = |c: Color| match quantize {
            Some((pal, space)) => match pal.lookup(c, space) {
                TRANSPARENT_PEN => c,
                pen => pal.color(pen),
            },
            None => c,
        };

        // Uniform cells skip the search; blank with the cell's color as
        // background reproduces them exactly.
        if pixels.iter().all(|p| p.ch == pixels[0].ch) {
            let c = pixels[0];
            let err = partition_error(pixels, 0, c, quantized(c));
            return (CellMatch { c: ' ', fg: c, bg: c }, err);
        }

        let mean = group_color(pixels, 0, false, self.extractor);
        if map.symbols.is_empty() {
            let err = partition_error(pixels, 0, mean, mean);
            return (
                CellMatch {
                    c: ' ',
                    fg: mean,
                    bg: mean,
                },
                err,
            );
        }

        let target = coverage_bitmap(pixels);

        // Coarse rank by bitmap Hamming distance.
        let mut ranked: Vec<(u32, usize)> = map
            .symbols
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.bitmap ^ target).count_ones(), i))
            .collect();
        ranked.sort_unstable();
        ranked.truncate(self.top_k(ranked.len()));

        let mut best_err = i64::MAX;
        let mut best = CellMatch {
            c: ' ',
            fg: mean,
            bg: mean,
        };
        for &(_, i) in &ranked {
            let sym = &map.symbols[i];
            let (fg, bg) = if sym.popcount == 0 {
                (mean, mean)
            } else if sym.popcount == 64 {
                let fg = group_color(pixels, sym.bitmap, true, self.extractor);
                (fg, fg)
            } else {
                (
                    group_color(pixels, sym.bitmap, true, self.extractor),
                    group_color(pixels, sym.bitmap, false, self.extractor),
                )
            };
            let err = partition_error(pixels, sym.bitmap, quantized(fg), quantized(bg));
            if err < best_err {
                best_err = err;
                best = CellMatch { c: sym.c, fg, bg };
            }
        }
        (best, best_err)
    }

    /// Best two-cell glyph for a pair of adjacent cells, if the map has
    /// any. Comparable to the summed errors of two single matches.
    #[must_use]
    pub fn match_cell_pair(
        &self,
        map: &PreparedMap,
        left: &[Color; CELL_PIXELS],
        right: &[Color; CELL_PIXELS],
    ) -> Option<(CellMatch, i64)> {
        if map.symbols2.is_empty() {
            return None;
        }
        let mut pixels = Vec::with_capacity(CELL_PIXELS * 2);
        pixels.extend_from_slice(left);
        pixels.extend_from_slice(right);

        let target_l = coverage_bitmap(left);
        let target_r = coverage_bitmap(right);

        let mut ranked: Vec<(u32, usize)> = map
            .symbols2
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let ham = (s.sym.bitmap ^ target_l).count_ones()
                    + (s.bitmap2 ^ target_r).count_ones();
                (ham, i)
            })
            .collect();
        ranked.sort_unstable();
        ranked.truncate(self.top_k(ranked.len()));

        let mut best: Option<(CellMatch, i64)> = None;
        for &(_, i) in &ranked {
            let s2 = &map.symbols2[i];
            // Both halves share one fg/bg pair.
            let fg = pair_group(&pixels, s2.sym.bitmap, s2.bitmap2, true, self.extractor);
            let bg = pair_group(&pixels, s2.sym.bitmap, s2.bitmap2, false, self.extractor);
            let err = partition_error(&pixels[..CELL_PIXELS], s2.sym.bitmap, fg, bg)
                + partition_error(&pixels[CELL_PIXELS..], s2.bitmap2, fg, bg);
            if best.as_ref().is_none_or(|&(_, e)| err < e) {
                best = Some((
                    CellMatch {
                        c: s2.sym.c,
                        fg,
                        bg,
                    },
                    err,
                ));
            }
        }
        best
    }

    /// Best glyph against fixed colors, for the FGBG modes.
    ///
    /// With `allow_invert`, a candidate's complement also competes and
    /// yields `inverted = true`. The second value is the number of
    /// mismatched pixels.
    #[must_use]
    pub fn match_cell_fixed(
        &self,
        map: &PreparedMap,
        pixels: &[Color; CELL_PIXELS],
        fg: Color,
        bg: Color,
        allow_invert: bool,
    ) -> (FixedMatch, u32) {
        // Assign each pixel to the nearer of the two fixed colors.
        let mut target = 0u64;
        for (i, p) in pixels.iter().enumerate() {
            if p.dist_sq(fg) < p.dist_sq(bg) {
                target |= 1 << i;
            }
        }
        let mut best = FixedMatch {
            c: ' ',
            inverted: false,
        };
        let mut best_ham = u32::MAX;
        for sym in &map.symbols {
            let ham = (sym.bitmap ^ target).count_ones();
            if ham < best_ham {
                best_ham = ham;
                best = FixedMatch {
                    c: sym.c,
                    inverted: false,
                };
            }
            if allow_invert {
                let inv = 64 - ham;
                if inv < best_ham {
                    best_ham = inv;
                    best = FixedMatch {
                        c: sym.c,
                        inverted: true,
                    };
                }
            }
        }
        (best, best_ham.min(64))
    }

    /// Fill glyph whose coverage best matches `target_popcount` bright
    /// pixels, with the coverage gap as score.
    #[must_use]
    pub fn match_cell_fill(
        &self,
        fill: &PreparedMap,
        target_popcount: u32,
    ) -> Option<(char, u32)> {
        fill.symbols
            .iter()
            .map(|s| (s.c, s.popcount.abs_diff(target_popcount)))
            .min_by_key(|&(c, d)| (d, c))
    }
}

fn pair_group(
    pixels: &[Color],
    bm_left: u64,
    bm_right: u64,
    want_set: bool,
    extractor: ColorExtractor,
) -> Color {
    let mut sum = [0u32; 4];
    let mut n = 0u32;
    let mut med: [Vec<u8>; 4] = Default::default();
    for (i, p) in pixels.iter().enumerate() {
        let bm = if i < CELL_PIXELS { bm_left } else { bm_right };
        if (bm >> (i % 64)) & 1 == u64::from(want_set) {
            match extractor {
                ColorExtractor::Average => {
                    for k in 0..4 {
                        sum[k] += u32::from(p.ch[k]);
                    }
                    n += 1;
                }
                ColorExtractor::Median => {
                    for k in 0..4 {
                        med[k].push(p.ch[k]);
                    }
                }
            }
        }
    }
    match extractor {
        ColorExtractor::Average => {
            if n == 0 {
                Color::new(0, 0, 0, 0)
            } else {
                Color::new(
                    (sum[0] / n) as u8,
                    (sum[1] / n) as u8,
                    (sum[2] / n) as u8,
                    (sum[3] / n) as u8,
                )
            }
        }
        ColorExtractor::Median => {
            if med[0].is_empty() {
                return Color::new(0, 0, 0, 0);
            }
            let mut out = [0u8; 4];
            for k in 0..4 {
                med[k].sort_unstable();
                out[k] = med[k][med[k].len() / 2];
            }
            Color::new(out[0], out[1], out[2], out[3])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_symbols::map::SymbolMap;
    use gg_symbols::tags::SymbolTags;

    fn matcher() -> Matcher {
        Matcher {
            work_factor: 1.0,
            extractor: ColorExtractor::Average,
        }
    }

    fn prepared(tags: SymbolTags) -> PreparedMap {
        let mut map = SymbolMap::new();
        map.add_by_tags(tags);
        map.prepare()
    }

    #[test]
    fn flat_cell_matches_with_zero_error() {
        let map = prepared(SymbolTags::SPACE | SymbolTags::SOLID);
        let red = Color::new(200, 0, 0, 255);
        let pixels = [red; CELL_PIXELS];
        let (m, err) = matcher().match_cell(&map, &pixels);
        assert_eq!(err, 0);
        // Either glyph reproduces a flat cell exactly.
        if m.c == ' ' {
            assert_eq!(m.bg.packed_rgb(), red.packed_rgb());
        } else {
            assert_eq!(m.c, '█');
            assert_eq!(m.fg.packed_rgb(), red.packed_rgb());
        }
    }

    #[test]
    fn half_split_picks_a_half_block() {
        let map = prepared(SymbolTags::HALF | SymbolTags::SPACE | SymbolTags::SOLID);
        let white = Color::new(255, 255, 255, 255);
        let black = Color::new(0, 0, 0, 255);
        let mut pixels = [black; CELL_PIXELS];
        for i in 0..32 {
            pixels[i] = white; // top half bright
        }
        let (m, err) = matcher().match_cell(&map, &pixels);
        assert_eq!(err, 0);
        match m.c {
            '▀' => {
                assert_eq!(m.fg.packed_rgb(), 0xffffff);
                assert_eq!(m.bg.packed_rgb(), 0x000000);
            }
            '▄' => {
                assert_eq!(m.fg.packed_rgb(), 0x000000);
                assert_eq!(m.bg.packed_rgb(), 0xffffff);
            }
            other => panic!("unexpected glyph {other:?}"),
        }
    }

    #[test]
    fn low_work_factor_still_returns_a_match() {
        let map = prepared(SymbolTags::ALL);
        let mut m = matcher();
        m.work_factor = 0.0;
        let pixels = [Color::new(10, 200, 10, 255); CELL_PIXELS];
        let (cm, err) = m.match_cell(&map, &pixels);
        assert!(err >= 0);
        assert!(cm.fg.ch[3] > 0 || cm.bg.ch[3] > 0);
    }

    #[test]
    fn fixed_mode_inversion_matches_dark_on_light() {
        let map = prepared(SymbolTags::HHALF | SymbolTags::SPACE);
        let fg = Color::new(255, 255, 255, 255);
        let bg = Color::new(0, 0, 0, 255);
        // Bottom half bright: '▀' only fits inverted.
        let mut pixels = [fg; CELL_PIXELS];
        for i in 0..32 {
            pixels[i] = bg;
        }
        let (m, ham) = matcher().match_cell_fixed(&map, &pixels, fg, bg, true);
        assert_eq!(ham, 0);
        match m.c {
            '▄' => assert!(!m.inverted),
            '▀' | ' ' => assert!(m.inverted),
            other => panic!("unexpected glyph {other:?}"),
        }
    }

    #[test]
    fn quantized_error_scores_against_the_palette() {
        use gg_core::config::CanvasMode;

        let map = prepared(SymbolTags::HALF | SymbolTags::SPACE | SymbolTags::SOLID);
        let pal = Palette::fixed(
            CanvasMode::Indexed8,
            Color::new(255, 255, 255, 255),
            Color::new(0, 0, 0, 255),
            127,
        );
        let white = Color::new(255, 255, 255, 255);
        let blue = Color::new(0, 0, 255, 255);
        let mut pixels = [blue; CELL_PIXELS];
        for p in pixels.iter_mut().take(32) {
            *p = white;
        }

        let (_, raw_err) = matcher().match_cell(&map, &pixels);
        let (m, q_err) = matcher().match_cell_quantized(&map, &pixels, &pal, ColorSpace::Rgb);
        assert_eq!(raw_err, 0);
        assert!(matches!(m.c, '▀' | '▄'));
        // White quantizes to 0xe5e5e5 and blue to 0x0000ee, so every
        // pixel carries that residual.
        assert_eq!(q_err, 32 * (3 * 26 * 26) + 32 * (17 * 17));
    }

    #[test]
    fn empty_map_falls_back_to_a_space() {
        let map = PreparedMap::default();
        let pixels = [Color::new(77, 77, 77, 255); CELL_PIXELS];
        let (m, _) = matcher().match_cell(&map, &pixels);
        assert_eq!(m.c, ' ');
        assert_eq!(m.bg.packed_rgb(), 0x4d4d4d);
    }
}
