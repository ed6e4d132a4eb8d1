//! Dithering applied to the scaled pixel buffer before indexed matching.
//!
//! Ordered dithering tiles a Bayer 8x8 matrix at the configured grain
//! size; noise dithering draws a deterministic per-pixel offset from a
//! coordinate hash; diffusion runs Floyd-Steinberg against the palette
//! in scan order. Truecolor canvases never dither.

use gg_core::color::Color;
use gg_core::colorspace::ColorSpace;
use gg_core::config::DitherMode;

use crate::palette::{Palette, TRANSPARENT_PEN};

/// Bayer 8x8 threshold matrix, values 0..=63.
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

#[inline(always)]
fn coord_hash(x: u32, y: u32) -> u32 {
    let mut h = x
        .wrapping_mul(0x9e37_79b1)
        .wrapping_add(y.wrapping_mul(0x85eb_ca77));
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae3d);
    h ^ (h >> 16)
}

#[inline(always)]
fn add_clamped(c: u8, offset: f32) -> u8 {
    (f32::from(c) + offset).clamp(0.0, 255.0) as u8
}

/// Pre-match dither pass over a pixel buffer.
#[derive(Clone, Copy, Debug)]
pub struct Ditherer {
    mode: DitherMode,
    intensity: f32,
    grain_w: u32,
    grain_h: u32,
}

impl Ditherer {
    /// A ditherer for the given mode, strength, and grain.
    #[must_use]
    pub fn new(mode: DitherMode, intensity: f32, grain_w: i32, grain_h: i32) -> Ditherer {
        Ditherer {
            mode,
            intensity: intensity.max(0.0),
            grain_w: grain_w.max(1) as u32,
            grain_h: grain_h.max(1) as u32,
        }
    }

    /// Dithers `pixels` in place. Identity for [`DitherMode::None`] or
    /// zero intensity; fully transparent pixels are left untouched.
    pub fn apply(
        &self,
        pixels: &mut [Color],
        width: usize,
        height: usize,
        palette: &Palette,
        space: ColorSpace,
    ) {
        if self.mode == DitherMode::None || self.intensity == 0.0 {
            return;
        }
        // A bigger palette needs smaller offsets to straddle pen boundaries.
        let amplitude = self.intensity * 255.0 / (palette.len() as f32).cbrt().max(1.0);
        match self.mode {
            DitherMode::None => {}
            DitherMode::Ordered => {
                for y in 0..height {
                    let by = (y as u32 / self.grain_h) as usize % 8;
                    for x in 0..width {
                        let bx = (x as u32 / self.grain_w) as usize % 8;
                        let t = (f32::from(BAYER_8X8[by][bx]) - 31.5) / 64.0;
                        let p = &mut pixels[y * width + x];
                        if p.ch[3] == 0 {
                            continue;
                        }
                        for k in 0..3 {
                            p.ch[k] = add_clamped(p.ch[k], t * amplitude);
                        }
                    }
                }
            }
            DitherMode::Noise => {
                for y in 0..height {
                    for x in 0..width {
                        let gx = x as u32 / self.grain_w;
                        let gy = y as u32 / self.grain_h;
                        let t = (coord_hash(gx, gy) & 0xffff) as f32 / 65535.0 - 0.5;
                        let p = &mut pixels[y * width + x];
                        if p.ch[3] == 0 {
                            continue;
                        }
                        for k in 0..3 {
                            p.ch[k] = add_clamped(p.ch[k], t * amplitude);
                        }
                    }
                }
            }
            DitherMode::Diffusion => {
                self.diffuse(pixels, width, height, palette, space);
            }
        }
    }

    fn diffuse(
        &self,
        pixels: &mut [Color],
        width: usize,
        height: usize,
        palette: &Palette,
        space: ColorSpace,
    ) {
        // Per-channel running error, current and next row.
        let mut err: Vec<[f32; 3]> = vec![[0.0; 3]; width * 2];
        let (cur, next) = (0usize, width);
        let scale = self.intensity.min(1.0);
        for y in 0..height {
            for e in &mut err[next..next + width] {
                *e = [0.0; 3];
            }
            for x in 0..width {
                let i = y * width + x;
                let p = pixels[i];
                let pen = palette.lookup(p, space);
                if pen == TRANSPARENT_PEN {
                    err[cur + x] = [0.0; 3];
                    continue;
                }
                let mut adjusted = p;
                for k in 0..3 {
                    adjusted.ch[k] = add_clamped(p.ch[k], err[cur + x][k]);
                }
                let pen = palette.lookup(adjusted, space);
                let q = palette.color(pen);
                pixels[i] = Color::new(q.ch[0], q.ch[1], q.ch[2], p.ch[3]);

                for k in 0..3 {
                    let e = (f32::from(adjusted.ch[k]) - f32::from(q.ch[k])) * scale;
                    if x + 1 < width {
                        err[cur + x + 1][k] += e * 7.0 / 16.0;
                        err[next + x + 1][k] += e * 1.0 / 16.0;
                    }
                    if x > 0 {
                        err[next + x - 1][k] += e * 3.0 / 16.0;
                    }
                    err[next + x][k] += e * 5.0 / 16.0;
                }
            }
            err.copy_within(next..next + width, cur);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_core::config::CanvasMode;

    fn palette() -> Palette {
        Palette::fixed(
            CanvasMode::Indexed16,
            Color::new(255, 255, 255, 255),
            Color::new(0, 0, 0, 255),
            127,
        )
    }

    #[test]
    fn none_and_zero_intensity_are_identity() {
        let src: Vec<Color> = (0..64)
            .map(|i| Color::new(i as u8 * 4, 100, 200, 255))
            .collect();
        for d in [
            Ditherer::new(DitherMode::None, 1.0, 4, 4),
            Ditherer::new(DitherMode::Ordered, 0.0, 4, 4),
        ] {
            let mut px = src.clone();
            d.apply(&mut px, 8, 8, &palette(), ColorSpace::Rgb);
            assert_eq!(px, src);
        }
    }

    #[test]
    fn ordered_dither_is_deterministic() {
        let src: Vec<Color> = (0..64).map(|_| Color::new(120, 120, 120, 255)).collect();
        let d = Ditherer::new(DitherMode::Ordered, 1.0, 1, 1);
        let mut a = src.clone();
        let mut b = src;
        d.apply(&mut a, 8, 8, &palette(), ColorSpace::Rgb);
        d.apply(&mut b, 8, 8, &palette(), ColorSpace::Rgb);
        assert_eq!(a, b);
        // A flat midtone must end up spread across distinct values.
        assert!(a.iter().any(|c| c.ch[0] != a[0].ch[0]));
    }

    #[test]
    fn diffusion_outputs_palette_colors() {
        let pal = palette();
        let mut px: Vec<Color> = (0..64).map(|_| Color::new(180, 90, 40, 255)).collect();
        let d = Ditherer::new(DitherMode::Diffusion, 1.0, 4, 4);
        d.apply(&mut px, 8, 8, &pal, ColorSpace::Rgb);
        for c in &px {
            let pen = pal.lookup(*c, ColorSpace::Rgb);
            assert_eq!(pal.color(pen).packed_rgb(), c.packed_rgb());
        }
    }

    #[test]
    fn transparent_pixels_are_untouched() {
        let mut px = vec![Color::new(50, 50, 50, 0); 64];
        let d = Ditherer::new(DitherMode::Ordered, 1.0, 4, 4);
        d.apply(&mut px, 8, 8, &palette(), ColorSpace::Rgb);
        assert!(px.iter().all(|c| c.ch[3] == 0 && c.ch[0] == 50));
    }
}
