//! Images and their placements on a canvas.

use std::sync::Arc;

use gg_core::config::{Align, Tuck};
use gg_core::pixels::Frame;

/// A drawable image: a shared frame that can be swapped out.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use gg_canvas::placement::Image;
/// use gg_core::pixels::{Frame, PixelType};
///
/// let frame = Frame::new(PixelType::Rgb8, vec![0; 12], 2, 2, 6).unwrap();
/// let mut img = Image::new();
/// img.set_frame(Arc::new(frame));
/// assert_eq!(img.frame().map(|f| f.width()), Some(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Image {
    frame: Option<Arc<Frame>>,
}

impl Image {
    /// An image with no frame yet.
    #[must_use]
    pub fn new() -> Self {
        Image::default()
    }

    /// Replaces the frame. Existing placements see the new frame the
    /// next time they are drawn.
    pub fn set_frame(&mut self, frame: Arc<Frame>) {
        self.frame = Some(frame);
    }

    /// The current frame, if any.
    #[must_use]
    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.frame.as_ref()
    }
}

/// Where and how an image sits on a canvas.
#[derive(Clone, Debug)]
pub struct Placement {
    image: Arc<Image>,
    id: i32,
    /// Horizontal alignment inside the canvas.
    pub halign: Align,
    /// Vertical alignment inside the canvas.
    pub valign: Align,
    /// How the image is fitted when aspect ratios differ.
    pub tuck: Tuck,
}

impl Placement {
    /// A placement of `image` with defaults: start-aligned, fitted.
    ///
    /// `id` tags protocol-level placements (Kitty); pass a nonzero
    /// value to address the placement later, or 0 to let the terminal
    /// assign one.
    #[must_use]
    pub fn new(image: Arc<Image>, id: i32) -> Self {
        Placement {
            image,
            id,
            halign: Align::Start,
            valign: Align::Start,
            tuck: Tuck::Fit,
        }
    }

    /// The placed image.
    #[must_use]
    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }

    /// The caller-chosen placement id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_core::pixels::PixelType;

    #[test]
    fn placement_defaults_fit_at_start() {
        let img = Arc::new(Image::new());
        let p = Placement::new(img, 7);
        assert_eq!(p.id(), 7);
        assert_eq!(p.halign, Align::Start);
        assert_eq!(p.tuck, Tuck::Fit);
        assert!(p.image().frame().is_none());
    }

    #[test]
    fn swapping_the_frame_is_visible_through_the_placement() {
        let mut img = Image::new();
        let f = Frame::new(PixelType::Rgb8, vec![0; 30], 5, 2, 15).unwrap();
        img.set_frame(Arc::new(f));
        let p = Placement::new(Arc::new(img), 0);
        assert_eq!(p.image().frame().map(|f| f.height()), Some(2));
    }
}
