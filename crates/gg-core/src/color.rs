//! 8-bit 4-channel colors and packed-RGB helpers.
//!
//! A [`Color`] holds RGBA in RGB space, or (L, a+128, b+128, A) when a
//! value has been converted to DIN99d. Distance math is plain squared
//! Euclidean over the channels, which is the whole point of DIN99d.

/// Sentinel used in the public i32 color APIs for "fully transparent".
pub const COLOR_TRANSPARENT: i32 = -1;

/// One 4-channel 8-bit color value.
///
/// # Example
/// ```
/// use gg_core::color::Color;
/// let c = Color::from_packed_rgb(0x00ff_8000);
/// assert_eq!(c.ch, [0xff, 0x80, 0x00, 0xff]);
/// assert_eq!(c.packed_rgb(), 0x00ff_8000);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Color {
    /// Channels. RGBA order in RGB space.
    pub ch: [u8; 4],
}

impl Color {
    /// Builds an opaque color from a packed `0x00RRGGBB` value.
    #[inline(always)]
    #[must_use]
    pub const fn from_packed_rgb(rgb: u32) -> Self {
        Self {
            ch: [
                ((rgb >> 16) & 0xff) as u8,
                ((rgb >> 8) & 0xff) as u8,
                (rgb & 0xff) as u8,
                0xff,
            ],
        }
    }

    /// Builds a color from channel values.
    #[inline(always)]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { ch: [r, g, b, a] }
    }

    /// Packs the color channels into `0x00RRGGBB`, dropping alpha.
    #[inline(always)]
    #[must_use]
    pub const fn packed_rgb(self) -> u32 {
        ((self.ch[0] as u32) << 16) | ((self.ch[1] as u32) << 8) | self.ch[2] as u32
    }

    /// Squared distance over the three color channels, with the alpha
    /// difference weighted in so transparent and opaque never look close.
    #[inline(always)]
    #[must_use]
    pub fn dist_sq(self, other: Color) -> i64 {
        let mut d: i64 = 0;
        for i in 0..3 {
            let e = i64::from(self.ch[i]) - i64::from(other.ch[i]);
            d += e * e;
        }
        let ea = i64::from(self.ch[3]) - i64::from(other.ch[3]);
        d + ea * ea * 3
    }

    /// Linear blend of two colors, `t` in 0..=255 toward `other`.
    #[inline]
    #[must_use]
    pub fn mix(self, other: Color, t: u32) -> Color {
        let mut out = [0u8; 4];
        for i in 0..4 {
            let a = u32::from(self.ch[i]);
            let b = u32::from(other.ch[i]);
            out[i] = ((a * (255 - t) + b * t) / 255) as u8;
        }
        Color { ch: out }
    }
}

/// A foreground/background color pair, the unit the cell matcher produces.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ColorPair {
    /// `colors[0]` is the foreground, `colors[1]` the background.
    pub colors: [Color; 2],
}

impl ColorPair {
    /// Builds a pair from foreground and background.
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { colors: [fg, bg] }
    }

    /// Foreground accessor.
    #[inline(always)]
    #[must_use]
    pub const fn fg(self) -> Color {
        self.colors[0]
    }

    /// Background accessor.
    #[inline(always)]
    #[must_use]
    pub const fn bg(self) -> Color {
        self.colors[1]
    }

    /// The same pair with foreground and background swapped.
    #[inline(always)]
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            colors: [self.colors[1], self.colors[0]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_rgb_roundtrip() {
        for rgb in [0x000000u32, 0xffffff, 0x123456, 0xff0000, 0x00ff00] {
            assert_eq!(Color::from_packed_rgb(rgb).packed_rgb(), rgb);
        }
    }

    #[test]
    fn dist_is_symmetric_and_zero_on_self() {
        let a = Color::new(10, 200, 30, 255);
        let b = Color::new(12, 190, 35, 255);
        assert_eq!(a.dist_sq(a), 0);
        assert_eq!(a.dist_sq(b), b.dist_sq(a));
    }

    #[test]
    fn alpha_difference_dominates() {
        let opaque = Color::new(100, 100, 100, 255);
        let clear = Color::new(100, 100, 100, 0);
        let far = Color::new(130, 130, 130, 255);
        assert!(opaque.dist_sq(clear) > opaque.dist_sq(far));
    }
}
