//! Canvas geometry calculation.

/// Computes an output cell geometry for a source image.
///
/// `dest_width` / `dest_height` are the maximum canvas dimensions in
/// character cells; a negative value means "unconstrained on that axis,
/// derive from the other and the aspect ratio". `font_ratio` is the
/// font's width divided by its height (0.5 is typical). With
/// `zoom = false` the output never exceeds the image's natural cell
/// size; with `stretch = true` the aspect ratio is abandoned and the
/// bounds are filled exactly.
///
/// Both outputs are zero only when an input dimension is zero; they are
/// never negative.
///
/// # Example
/// ```
/// use gg_core::geometry::calc_canvas_geometry;
/// let (w, h) = calc_canvas_geometry(100, 50, -1, -1, 0.5, true, false);
/// assert_eq!((w, h), (100, 25));
/// assert_eq!(calc_canvas_geometry(0, 37, 80, 24, 0.5, false, false), (0, 0));
/// ```
#[must_use]
pub fn calc_canvas_geometry(
    src_width: i32,
    src_height: i32,
    dest_width: i32,
    dest_height: i32,
    font_ratio: f32,
    zoom: bool,
    stretch: bool,
) -> (i32, i32) {
    if src_width <= 0 || src_height <= 0 {
        return (0, 0);
    }
    let font_ratio = if font_ratio > 0.0 { font_ratio } else { 0.5 };

    // Cells are narrower than they are tall; the image's aspect in cell
    // units is its pixel aspect divided by the font ratio.
    let aspect = (src_width as f32 / src_height as f32) / font_ratio;

    // Natural size: one cell per pixel column.
    let nat_w = src_width.max(1);
    let nat_h = ((src_height as f32) * font_ratio).round().max(1.0) as i32;

    let mut w = dest_width;
    let mut h = dest_height;
    if w < 0 && h < 0 {
        w = nat_w;
        h = nat_h;
    } else if w < 0 {
        w = ((h as f32) * aspect).round().max(1.0) as i32;
    } else if h < 0 {
        h = ((w as f32) / aspect).round().max(1.0) as i32;
    }

    if !stretch {
        let fit_w = ((h as f32) * aspect).round() as i32;
        if fit_w <= w {
            w = fit_w;
        } else {
            h = ((w as f32) / aspect).round() as i32;
        }
    }

    if !zoom && (w > nat_w || h > nat_h) {
        if stretch {
            w = w.min(nat_w);
            h = h.min(nat_h);
        } else {
            let scale = (nat_w as f32 / w.max(1) as f32).min(nat_h as f32 / h.max(1) as f32);
            w = ((w as f32) * scale).round() as i32;
            h = ((h as f32) * scale).round() as i32;
        }
    }

    (w.max(1), h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_source_dimension_yields_zero() {
        for h in [0, 1, 24, 1000] {
            assert_eq!(calc_canvas_geometry(0, h, 80, 24, 0.5, false, false), (0, 0));
        }
        assert_eq!(calc_canvas_geometry(64, 0, 80, 24, 0.5, true, true), (0, 0));
    }

    #[test]
    fn negative_bounds_derive_from_aspect() {
        let (w, h) = calc_canvas_geometry(100, 50, -1, -1, 0.5, true, false);
        assert!(w > 0 && h > 0);
        // 2:1 pixel aspect at font ratio 0.5 is 4:1 in cells.
        assert_eq!(w, 4 * h);

        let (w, h) = calc_canvas_geometry(100, 50, -1, 10, 0.5, true, false);
        assert_eq!((w, h), (40, 10));
    }

    #[test]
    fn fit_preserves_aspect_within_bounds() {
        let (w, h) = calc_canvas_geometry(100, 50, 80, 24, 0.5, true, false);
        assert!(w <= 80 && h <= 24);
        assert_eq!(w, 80);
        assert_eq!(h, 20);
    }

    #[test]
    fn stretch_fills_bounds_exactly() {
        let (w, h) = calc_canvas_geometry(100, 50, 80, 24, 0.5, true, true);
        assert_eq!((w, h), (80, 24));
    }

    #[test]
    fn no_zoom_caps_at_natural_size() {
        // A 10x10 image should not blow up to 80 cells without zoom.
        let (w, h) = calc_canvas_geometry(10, 10, 80, 24, 0.5, false, false);
        assert!(w <= 10);
        assert!(h <= 5);
        assert!(w >= 1 && h >= 1);
    }
}
