//! Color space conversion: linear-ish RGB and perceptually uniform DIN99d.
//!
//! DIN99d is used so plain Euclidean distance in the converted channels
//! approximates perceived color difference. The conversion goes
//! sRGB → XYZ (with the DIN99d X correction) → L*a*b* → DIN99d, and the
//! result is rescaled into the 8-bit channel lanes of a [`Color`].

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// The two color spaces supported during matching and palette lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColorSpace {
    /// 8-bit sRGB channels, no conversion.
    #[default]
    Rgb,
    /// Perceptually uniform DIN99d, stored as (L, a+128, b+128).
    Din99d,
}

/// Number of color spaces, for per-space table arrays.
pub const COLOR_SPACE_COUNT: usize = 2;

impl ColorSpace {
    /// Index into per-space arrays.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ColorSpace::Rgb => 0,
            ColorSpace::Din99d => 1,
        }
    }
}

#[inline]
fn srgb_to_linear(c: u8) -> f32 {
    let v = f32::from(c) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > 0.008_856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Converts an RGBA color to DIN99d, keeping alpha untouched.
///
/// Channels come back as (L99d scaled to 0..=255, a99d + 128, b99d + 128).
///
/// # Example
/// ```
/// use gg_core::color::Color;
/// use gg_core::colorspace::rgb_to_din99d;
/// let black = rgb_to_din99d(Color::new(0, 0, 0, 255));
/// let white = rgb_to_din99d(Color::new(255, 255, 255, 255));
/// assert!(white.ch[0] > black.ch[0]);
/// // Both are neutral: a/b stay near the 128 midpoint.
/// assert!((i32::from(black.ch[1]) - 128).abs() <= 2);
/// assert!((i32::from(white.ch[2]) - 128).abs() <= 2);
/// ```
#[must_use]
pub fn rgb_to_din99d(c: Color) -> Color {
    let r = srgb_to_linear(c.ch[0]);
    let g = srgb_to_linear(c.ch[1]);
    let b = srgb_to_linear(c.ch[2]);

    // sRGB D65 matrix.
    let x = 0.412_453 * r + 0.357_580 * g + 0.180_423 * b;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = 0.019_334 * r + 0.119_193 * g + 0.950_227 * b;

    // DIN99d X correction.
    let x = 1.12 * x - 0.12 * z;

    let fx = lab_f(x / 0.950_47);
    let fy = lab_f(y);
    let fz = lab_f(z / 1.088_83);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);

    let l99 = 325.22 * (1.0 + 0.0036 * l).ln();

    // 50 degree hue rotation.
    const COS50: f32 = 0.642_787_6;
    const SIN50: f32 = 0.766_044_4;
    let e = a * COS50 + bb * SIN50;
    let f = 1.14 * (bb * COS50 - a * SIN50);
    let gq = (e * e + f * f).sqrt();
    let c99 = 22.5 * (1.0 + 0.06 * gq).ln();
    let h99 = f.atan2(e) + 50.0_f32.to_radians();

    let a99 = c99 * h99.cos();
    let b99 = c99 * h99.sin();

    Color::new(
        (l99 * 2.55).clamp(0.0, 255.0) as u8,
        (a99 * 2.0 + 128.0).clamp(0.0, 255.0) as u8,
        (b99 * 2.0 + 128.0).clamp(0.0, 255.0) as u8,
        c.ch[3],
    )
}

/// Converts a color into `space`, passing RGB through untouched.
#[inline]
#[must_use]
pub fn convert(c: Color, space: ColorSpace) -> Color {
    match space {
        ColorSpace::Rgb => c,
        ColorSpace::Din99d => rgb_to_din99d(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightness_is_monotonic_on_gray_ramp() {
        let mut prev = -1i32;
        for v in (0..=255).step_by(15) {
            let c = rgb_to_din99d(Color::new(v as u8, v as u8, v as u8, 255));
            assert!(i32::from(c.ch[0]) >= prev, "L not monotonic at {v}");
            prev = i32::from(c.ch[0]);
        }
    }

    #[test]
    fn conversion_is_deterministic() {
        let c = Color::new(37, 201, 93, 255);
        assert_eq!(rgb_to_din99d(c), rgb_to_din99d(c));
    }

    #[test]
    fn red_and_green_separate_in_a_channel() {
        let red = rgb_to_din99d(Color::new(255, 0, 0, 255));
        let green = rgb_to_din99d(Color::new(0, 255, 0, 255));
        assert!(red.ch[1] > 128);
        assert!(green.ch[1] < 128);
    }
}
