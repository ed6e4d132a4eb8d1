//! Palettes and nearest-color lookup.
//!
//! Fixed palettes mirror the xterm conventions: 16 ANSI colors, a 6x6x6
//! cube and a 24-step gray ramp. Dynamic palettes are derived from the
//! image by median cut. Lookup goes through a per-colorspace
//! [`ColorTable`]: entries are sorted by their projection onto the
//! sample cloud's principal axis, and queries scan outward from the
//! projection's insertion point, stopping as soon as the axis distance
//! alone exceeds the best full distance found.

use gg_core::color::Color;
use gg_core::colorspace::{COLOR_SPACE_COUNT, ColorSpace, convert};
use gg_core::config::CanvasMode;

/// Pen number reserved for transparency.
pub const TRANSPARENT_PEN: usize = 256;

/// The 16 ANSI colors, xterm flavor, packed 0xRRGGBB.
pub const ANSI_16: [u32; 16] = [
    0x000000, 0xcd0000, 0x00cd00, 0xcdcd00, 0x0000ee, 0xcd00cd, 0x00cdcd, 0xe5e5e5, 0x7f7f7f,
    0xff0000, 0x00ff00, 0xffff00, 0x5c5cff, 0xff00ff, 0x00ffff, 0xffffff,
];

/// Entry `i` of the standard 256-color palette.
#[must_use]
pub fn xterm_256_entry(i: usize) -> u32 {
    const CUBE: [u32; 6] = [0, 95, 135, 175, 215, 255];
    match i {
        0..=15 => ANSI_16[i],
        16..=231 => {
            let n = i - 16;
            let (r, g, b) = (CUBE[n / 36], CUBE[n / 6 % 6], CUBE[n % 6]);
            (r << 16) | (g << 8) | b
        }
        _ => {
            let v = 8 + 10 * (i as u32 - 232);
            (v << 16) | (v << 8) | v
        }
    }
}

fn fdot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn channels(c: Color) -> [f32; 3] {
    [f32::from(c.ch[0]), f32::from(c.ch[1]), f32::from(c.ch[2])]
}

fn dist3_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

/// Sorted projection index over one color space's palette entries.
#[derive(Clone, Debug, Default)]
pub struct ColorTable {
    // (projection onto the principal axis, pen), sorted by projection.
    sorted: Vec<(f32, u16)>,
    entries: Vec<[f32; 3]>, // indexed by pen slot
    pens: Vec<u16>,
    axis: [f32; 3],
    average: [f32; 3],
}

impl ColorTable {
    /// Builds a table over `(pen, color)` pairs already in the target space.
    #[must_use]
    pub fn new(pairs: &[(u16, Color)]) -> ColorTable {
        let n = pairs.len().max(1) as f32;
        let mut average = [0.0f32; 3];
        for &(_, c) in pairs {
            let v = channels(c);
            for k in 0..3 {
                average[k] += v[k];
            }
        }
        for a in &mut average {
            *a /= n;
        }

        // Principal axis by power iteration on the covariance.
        let mut cov = [[0.0f32; 3]; 3];
        for &(_, c) in pairs {
            let v = channels(c);
            let d = [v[0] - average[0], v[1] - average[1], v[2] - average[2]];
            for r in 0..3 {
                for s in 0..3 {
                    cov[r][s] += d[r] * d[s];
                }
            }
        }
        let mut axis = [1.0f32, 1.0, 1.0];
        for _ in 0..12 {
            let next = [
                fdot(cov[0], axis),
                fdot(cov[1], axis),
                fdot(cov[2], axis),
            ];
            let len = fdot(next, next).sqrt();
            if len < 1e-6 {
                break;
            }
            axis = [next[0] / len, next[1] / len, next[2] / len];
        }

        let mut entries = Vec::with_capacity(pairs.len());
        let mut pens = Vec::with_capacity(pairs.len());
        let mut sorted: Vec<(f32, u16)> = Vec::with_capacity(pairs.len());
        for (slot, &(pen, c)) in pairs.iter().enumerate() {
            let v = channels(c);
            let proj = fdot(
                [v[0] - average[0], v[1] - average[1], v[2] - average[2]],
                axis,
            );
            entries.push(v);
            pens.push(pen);
            sorted.push((proj, slot as u16));
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(pens[a.1 as usize].cmp(&pens[b.1 as usize])));

        ColorTable {
            sorted,
            entries,
            pens,
            axis,
            average,
        }
    }

    /// Nearest pen to `color` (already in this table's space).
    ///
    /// Deterministic: equal distances resolve to the lowest pen.
    #[must_use]
    pub fn nearest(&self, color: Color) -> u16 {
        if self.sorted.is_empty() {
            return 0;
        }
        let v = channels(color);
        let proj = fdot(
            [
                v[0] - self.average[0],
                v[1] - self.average[1],
                v[2] - self.average[2],
            ],
            self.axis,
        );
        let start = self
            .sorted
            .partition_point(|&(p, _)| p < proj)
            .min(self.sorted.len() - 1);

        let mut best_pen = self.pens[self.sorted[start].1 as usize];
        let mut best = f32::MAX;
        let consider = |i: usize, best: &mut f32, best_pen: &mut u16| {
            let (_, slot) = self.sorted[i];
            let d = dist3_sq(v, self.entries[slot as usize]);
            let pen = self.pens[slot as usize];
            if d < *best || (d == *best && pen < *best_pen) {
                *best = d;
                *best_pen = pen;
            }
        };
        consider(start, &mut best, &mut best_pen);

        // Widen in both directions until the axis gap alone rules a side out.
        let (mut lo, mut hi) = (start, start);
        loop {
            let mut advanced = false;
            if lo > 0 {
                let gap = proj - self.sorted[lo - 1].0;
                if gap * gap <= best {
                    lo -= 1;
                    consider(lo, &mut best, &mut best_pen);
                    advanced = true;
                }
            }
            if hi + 1 < self.sorted.len() {
                let gap = self.sorted[hi + 1].0 - proj;
                if gap * gap <= best {
                    hi += 1;
                    consider(hi, &mut best, &mut best_pen);
                    advanced = true;
                }
            }
            if !advanced {
                break;
            }
        }
        best_pen
    }
}

/// A pen palette plus per-colorspace lookup tables.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Color>, // sRGB, indexed by pen - first_pen
    first_pen: usize,
    tables: [ColorTable; COLOR_SPACE_COUNT],
    alpha_threshold: i32,
}

impl Palette {
    fn build(colors: Vec<Color>, first_pen: usize, alpha_threshold: i32) -> Palette {
        let mut tables: [ColorTable; COLOR_SPACE_COUNT] = Default::default();
        for space in [ColorSpace::Rgb, ColorSpace::Din99d] {
            let pairs: Vec<(u16, Color)> = colors
                .iter()
                .enumerate()
                .map(|(i, &c)| ((first_pen + i) as u16, convert(c, space)))
                .collect();
            tables[space.index()] = ColorTable::new(&pairs);
        }
        Palette {
            colors,
            first_pen,
            tables,
            alpha_threshold,
        }
    }

    /// The fixed palette for an indexed canvas mode.
    ///
    /// `fg`/`bg` feed the two-pen FGBG palettes.
    #[must_use]
    pub fn fixed(mode: CanvasMode, fg: Color, bg: Color, alpha_threshold: i32) -> Palette {
        match mode {
            CanvasMode::Indexed256 => Self::build(
                (0..256).map(|i| Color::from_packed_rgb(xterm_256_entry(i))).collect(),
                0,
                alpha_threshold,
            ),
            CanvasMode::Indexed240 => Self::build(
                (16..256).map(|i| Color::from_packed_rgb(xterm_256_entry(i))).collect(),
                16,
                alpha_threshold,
            ),
            CanvasMode::Indexed16 | CanvasMode::Indexed16_8 => Self::build(
                ANSI_16.iter().map(|&c| Color::from_packed_rgb(c)).collect(),
                0,
                alpha_threshold,
            ),
            CanvasMode::Indexed8 => Self::build(
                ANSI_16[..8].iter().map(|&c| Color::from_packed_rgb(c)).collect(),
                0,
                alpha_threshold,
            ),
            _ => Self::build(vec![bg, fg], 0, alpha_threshold),
        }
    }

    /// A palette quantized from image pixels by median cut.
    ///
    /// Transparent pixels (per `alpha_threshold`) are excluded from the
    /// sample set. At most 256 entries are produced.
    #[must_use]
    pub fn quantized(pixels: &[Color], alpha_threshold: i32) -> Palette {
        let mut samples: Vec<Color> = Vec::with_capacity(4096);
        let step = (pixels.len() / 4096).max(1);
        for c in pixels.iter().step_by(step) {
            if i32::from(c.ch[3]) > alpha_threshold {
                samples.push(*c);
            }
        }
        if samples.is_empty() {
            samples.push(Color::new(0, 0, 0, 255));
        }
        let colors = median_cut(samples, 256);
        Self::build(colors, 0, alpha_threshold)
    }

    /// Number of pens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette is empty (never true for built palettes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The lowest pen number (16 for the 240-entry palette).
    #[must_use]
    pub fn first_pen(&self) -> usize {
        self.first_pen
    }

    /// The sRGB color behind `pen`, or transparent black for
    /// [`TRANSPARENT_PEN`] and out-of-range pens.
    #[must_use]
    pub fn color(&self, pen: usize) -> Color {
        if pen < self.first_pen {
            return Color::new(0, 0, 0, 0);
        }
        self.colors
            .get(pen - self.first_pen)
            .copied()
            .unwrap_or(Color::new(0, 0, 0, 0))
    }

    /// Nearest pen for an sRGB color, honoring the alpha threshold.
    #[must_use]
    pub fn lookup(&self, color: Color, space: ColorSpace) -> usize {
        if i32::from(color.ch[3]) <= self.alpha_threshold {
            return TRANSPARENT_PEN;
        }
        usize::from(self.tables[space.index()].nearest(convert(color, space)))
    }
}

fn median_cut(mut samples: Vec<Color>, max_colors: usize) -> Vec<Color> {
    struct Bucket {
        lo: usize,
        hi: usize, // exclusive
    }

    let mut buckets = vec![Bucket {
        lo: 0,
        hi: samples.len(),
    }];
    while buckets.len() < max_colors {
        // Split the bucket with the widest channel range.
        let mut widest: Option<(usize, usize, i32)> = None; // (bucket, channel, range)
        for (bi, b) in buckets.iter().enumerate() {
            if b.hi - b.lo < 2 {
                continue;
            }
            for ch in 0..3 {
                let (mut min, mut max) = (255i32, 0i32);
                for c in &samples[b.lo..b.hi] {
                    min = min.min(i32::from(c.ch[ch]));
                    max = max.max(i32::from(c.ch[ch]));
                }
                let range = max - min;
                if widest.is_none_or(|(_, _, r)| range > r) {
                    widest = Some((bi, ch, range));
                }
            }
        }
        let Some((bi, ch, range)) = widest else { break };
        if range == 0 {
            break;
        }
        let (lo, hi) = (buckets[bi].lo, buckets[bi].hi);
        samples[lo..hi].sort_by_key(|c| (c.ch[ch], c.packed_rgb()));
        let mid = lo + (hi - lo) / 2;
        buckets[bi].hi = mid;
        buckets.push(Bucket { lo: mid, hi });
    }

    let mut colors: Vec<Color> = buckets
        .iter()
        .map(|b| {
            let n = (b.hi - b.lo).max(1) as u32;
            let mut sum = [0u32; 3];
            for c in &samples[b.lo..b.hi] {
                for k in 0..3 {
                    sum[k] += u32::from(c.ch[k]);
                }
            }
            Color::new(
                (sum[0] / n) as u8,
                (sum[1] / n) as u8,
                (sum[2] / n) as u8,
                255,
            )
        })
        .collect();
    colors.sort_by_key(|c| c.packed_rgb());
    colors.dedup_by_key(|c| c.packed_rgb());
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xterm_entries_match_known_values() {
        assert_eq!(xterm_256_entry(1), 0xcd0000);
        assert_eq!(xterm_256_entry(16), 0x000000);
        assert_eq!(xterm_256_entry(231), 0xffffff);
        assert_eq!(xterm_256_entry(196), 0xff0000);
        assert_eq!(xterm_256_entry(232), 0x080808);
        assert_eq!(xterm_256_entry(255), 0xeeeeee);
    }

    #[test]
    fn lookup_finds_exact_entries() {
        let p = Palette::fixed(CanvasMode::Indexed256, Color::new(255, 255, 255, 255), Color::new(0, 0, 0, 255), 127);
        assert_eq!(p.lookup(Color::from_packed_rgb(0x5f0000), ColorSpace::Rgb), 52);
        assert_eq!(p.lookup(Color::from_packed_rgb(0x080808), ColorSpace::Rgb), 232);
        // 0xff0000 appears twice (pens 9 and 196); the lowest pen wins.
        assert_eq!(p.lookup(Color::from_packed_rgb(0xff0000), ColorSpace::Rgb), 9);
    }

    #[test]
    fn lookup_is_deterministic_and_brute_force_equivalent() {
        let p = Palette::fixed(
            CanvasMode::Indexed256,
            Color::new(255, 255, 255, 255),
            Color::new(0, 0, 0, 255),
            127,
        );
        let probes = [
            Color::new(1, 2, 3, 255),
            Color::new(130, 90, 200, 255),
            Color::new(254, 254, 254, 255),
            Color::new(100, 100, 100, 255),
        ];
        for q in probes {
            let fast = p.lookup(q, ColorSpace::Rgb);
            let mut best = (f32::MAX, usize::MAX);
            for pen in 0..p.len() {
                let c = p.color(pen);
                let d = dist3_sq(channels(q), channels(c));
                if d < best.0 {
                    best = (d, pen);
                }
            }
            assert_eq!(fast, best.1, "probe {:06x}", q.packed_rgb());
            assert_eq!(p.lookup(q, ColorSpace::Rgb), fast);
        }
    }

    #[test]
    fn transparent_pixels_map_to_the_transparent_pen() {
        let p = Palette::fixed(CanvasMode::Indexed16, Color::new(255, 255, 255, 255), Color::new(0, 0, 0, 255), 127);
        assert_eq!(p.lookup(Color::new(10, 10, 10, 0), ColorSpace::Rgb), TRANSPARENT_PEN);
        assert_ne!(p.lookup(Color::new(10, 10, 10, 255), ColorSpace::Rgb), TRANSPARENT_PEN);
    }

    #[test]
    fn indexed_240_starts_at_pen_16() {
        let p = Palette::fixed(CanvasMode::Indexed240, Color::new(255, 255, 255, 255), Color::new(0, 0, 0, 255), 127);
        let pen = p.lookup(Color::from_packed_rgb(0x000000), ColorSpace::Rgb);
        assert!(pen >= 16);
        assert_eq!(p.first_pen(), 16);
    }

    #[test]
    fn quantized_palette_reflects_the_sample_set() {
        let pixels: Vec<Color> = (0..1024)
            .map(|i| {
                if i % 2 == 0 {
                    Color::new(250, 10, 10, 255)
                } else {
                    Color::new(10, 10, 250, 255)
                }
            })
            .collect();
        let p = Palette::quantized(&pixels, 127);
        assert!(p.len() >= 2);
        let red_pen = p.lookup(Color::new(255, 0, 0, 255), ColorSpace::Rgb);
        let blue_pen = p.lookup(Color::new(0, 0, 255, 255), ColorSpace::Rgb);
        assert_ne!(red_pen, blue_pen);
        assert!(p.color(red_pen).ch[0] > p.color(red_pen).ch[2]);
    }
}
