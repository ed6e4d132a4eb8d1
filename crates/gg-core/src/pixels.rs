//! Pixel layouts and frames.
//!
//! A [`Frame`] is a rectangular pixel buffer tagged with its channel
//! order and alpha treatment. Everything downstream works on unassociated
//! RGBA, so the only job here is normalizing the ten supported layouts.

use crate::color::Color;
use crate::error::CoreError;

/// Source pixel layout tag: channel order, alpha treatment, bits per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelType {
    /// 32bpp RGBA, alpha premultiplied.
    Rgba8Premultiplied,
    /// 32bpp BGRA, alpha premultiplied.
    Bgra8Premultiplied,
    /// 32bpp ARGB, alpha premultiplied.
    Argb8Premultiplied,
    /// 32bpp ABGR, alpha premultiplied.
    Abgr8Premultiplied,
    /// 32bpp RGBA, unassociated alpha.
    Rgba8Unassociated,
    /// 32bpp BGRA, unassociated alpha.
    Bgra8Unassociated,
    /// 32bpp ARGB, unassociated alpha.
    Argb8Unassociated,
    /// 32bpp ABGR, unassociated alpha.
    Abgr8Unassociated,
    /// 24bpp RGB, no alpha.
    Rgb8,
    /// 24bpp BGR, no alpha.
    Bgr8,
}

/// All layout tags, in declaration order.
pub const PIXEL_TYPES: [PixelType; 10] = [
    PixelType::Rgba8Premultiplied,
    PixelType::Bgra8Premultiplied,
    PixelType::Argb8Premultiplied,
    PixelType::Abgr8Premultiplied,
    PixelType::Rgba8Unassociated,
    PixelType::Bgra8Unassociated,
    PixelType::Argb8Unassociated,
    PixelType::Abgr8Unassociated,
    PixelType::Rgb8,
    PixelType::Bgr8,
];

impl PixelType {
    /// Bytes per pixel for this layout.
    #[inline(always)]
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Rgb8 | PixelType::Bgr8 => 3,
            _ => 4,
        }
    }

    /// Whether this layout carries premultiplied alpha.
    #[inline(always)]
    #[must_use]
    pub const fn is_premultiplied(self) -> bool {
        matches!(
            self,
            PixelType::Rgba8Premultiplied
                | PixelType::Bgra8Premultiplied
                | PixelType::Argb8Premultiplied
                | PixelType::Abgr8Premultiplied
        )
    }

    /// Whether this layout carries an alpha channel at all.
    #[inline(always)]
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, PixelType::Rgb8 | PixelType::Bgr8)
    }

    /// Decodes one pixel at `p` into unassociated RGBA.
    #[inline(always)]
    #[must_use]
    pub fn decode(self, p: &[u8]) -> Color {
        let (r, g, b, a) = match self {
            PixelType::Rgba8Premultiplied | PixelType::Rgba8Unassociated => {
                (p[0], p[1], p[2], p[3])
            }
            PixelType::Bgra8Premultiplied | PixelType::Bgra8Unassociated => {
                (p[2], p[1], p[0], p[3])
            }
            PixelType::Argb8Premultiplied | PixelType::Argb8Unassociated => {
                (p[1], p[2], p[3], p[0])
            }
            PixelType::Abgr8Premultiplied | PixelType::Abgr8Unassociated => {
                (p[3], p[2], p[1], p[0])
            }
            PixelType::Rgb8 => (p[0], p[1], p[2], 0xff),
            PixelType::Bgr8 => (p[2], p[1], p[0], 0xff),
        };
        if self.is_premultiplied() && a != 0xff {
            if a == 0 {
                return Color::new(0, 0, 0, 0);
            }
            let un = |c: u8| -> u8 { ((u32::from(c) * 255) / u32::from(a)).min(255) as u8 };
            Color::new(un(r), un(g), un(b), a)
        } else {
            Color::new(r, g, b, a)
        }
    }
}

/// An immutable rectangular pixel buffer with an explicit layout tag.
///
/// Created by the caller, shared by reference (`Arc<Frame>`) from images
/// and placements.
///
/// # Example
/// ```
/// use gg_core::pixels::{Frame, PixelType};
/// let frame = Frame::new(PixelType::Rgb8, vec![255, 0, 0, 0, 255, 0], 2, 1, 6).unwrap();
/// assert_eq!(frame.pixel(1, 0).ch, [0, 255, 0, 255]);
/// ```
#[derive(Clone, Debug)]
pub struct Frame {
    pixel_type: PixelType,
    width: u32,
    height: u32,
    rowstride: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a pixel buffer, taking ownership of `data`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] when a dimension is zero,
    /// or [`CoreError::BufferTooSmall`] when `data` cannot hold
    /// `height * rowstride` bytes.
    pub fn new(
        pixel_type: PixelType,
        data: Vec<u8>,
        width: u32,
        height: u32,
        rowstride: u32,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let needed = height as usize * rowstride as usize;
        if rowstride < width * pixel_type.bytes_per_pixel() as u32 || data.len() < needed {
            return Err(CoreError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            pixel_type,
            width,
            height,
            rowstride,
            data,
        })
    }

    /// Width in pixels.
    #[inline(always)]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline(always)]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The layout tag the buffer was created with.
    #[inline(always)]
    #[must_use]
    pub const fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Decodes the pixel at (x, y) into unassociated RGBA.
    /// Out-of-bounds reads return fully transparent.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::new(0, 0, 0, 0);
        }
        let bpp = self.pixel_type.bytes_per_pixel();
        let idx = y as usize * self.rowstride as usize + x as usize * bpp;
        self.pixel_type.decode(&self.data[idx..idx + bpp])
    }
}

/// Converts a raw source buffer into a row-major RGBA pixel vector.
///
/// Returns `None` when the buffer is too small for the stated geometry;
/// the caller treats that as a silent no-op per the engine's permissive
/// error posture.
#[must_use]
pub fn unpack_pixels(
    pixel_type: PixelType,
    data: &[u8],
    width: u32,
    height: u32,
    rowstride: u32,
) -> Option<Vec<Color>> {
    let bpp = pixel_type.bytes_per_pixel();
    if (rowstride as usize) < width as usize * bpp
        || data.len() < height as usize * rowstride as usize
    {
        return None;
    }
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as usize {
        let row = &data[y * rowstride as usize..];
        for x in 0..width as usize {
            out.push(pixel_type.decode(&row[x * bpp..x * bpp + bpp]));
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_layouts_decode_solid_red() {
        // Opaque red encoded per layout.
        for pt in PIXEL_TYPES {
            let bytes: Vec<u8> = match pt {
                PixelType::Rgba8Premultiplied | PixelType::Rgba8Unassociated => {
                    vec![255, 0, 0, 255]
                }
                PixelType::Bgra8Premultiplied | PixelType::Bgra8Unassociated => {
                    vec![0, 0, 255, 255]
                }
                PixelType::Argb8Premultiplied | PixelType::Argb8Unassociated => {
                    vec![255, 255, 0, 0]
                }
                PixelType::Abgr8Premultiplied | PixelType::Abgr8Unassociated => {
                    vec![255, 0, 0, 255]
                }
                PixelType::Rgb8 => vec![255, 0, 0],
                PixelType::Bgr8 => vec![0, 0, 255],
            };
            let c = pt.decode(&bytes);
            assert_eq!(c, Color::new(255, 0, 0, 255), "layout {pt:?}");
        }
    }

    #[test]
    fn premultiplied_is_unassociated_on_decode() {
        // 50% alpha premultiplied mid-gray.
        let c = PixelType::Rgba8Premultiplied.decode(&[64, 64, 64, 128]);
        assert_eq!(c.ch[3], 128);
        assert!(c.ch[0] >= 126 && c.ch[0] <= 128);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(unpack_pixels(PixelType::Rgb8, &[0, 0], 2, 1, 6).is_none());
        assert!(Frame::new(PixelType::Rgb8, vec![0, 0], 2, 1, 6).is_err());
    }
}
