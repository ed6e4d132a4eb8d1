//! Sixel encoding.
//!
//! Pixels are quantized to a median-cut palette, then emitted in bands
//! of six rows. Within a band each pen gets one pass over the columns,
//! run-length encoded with the `!n` repeat introducer; `$` rewinds to
//! the band start between pens and `-` advances to the next band.

use gg_core::color::Color;
use gg_core::colorspace::ColorSpace;
use gg_term::seq::TermQuirks;
use gg_term::terminfo::TermInfo;

use crate::error::CanvasError;
use crate::palette::{Palette, TRANSPARENT_PEN};

use super::missing;

fn push_run(out: &mut Vec<u8>, ch: u8, run: usize) {
    if run > 3 {
        out.push(b'!');
        out.extend_from_slice(run.to_string().as_bytes());
        out.push(ch);
    } else {
        for _ in 0..run {
            out.push(ch);
        }
    }
}

pub(super) fn encode(
    out: &mut Vec<u8>,
    ti: &TermInfo,
    pixels: &[Color],
    width: usize,
    height: usize,
    alpha_threshold: i32,
) -> Result<(), CanvasError> {
    let palette = Palette::quantized(pixels, alpha_threshold);
    let pens: Vec<usize> = pixels
        .iter()
        .map(|&c| palette.lookup(c, ColorSpace::Rgb))
        .collect();

    // P2 = 1: pixels we skip stay at the terminal background.
    out.extend_from_slice(&ti.emit_begin_sixels(0, 1, 0).ok_or_else(|| missing("sixel"))?);

    // Raster attributes: 1:1 aspect and the pixel extent.
    out.extend_from_slice(format!("\"1;1;{width};{height}").as_bytes());

    for pen in 0..palette.len() {
        let c = palette.color(pen + palette.first_pen());
        let scale = |v: u8| (u32::from(v) * 100 + 127) / 255;
        out.extend_from_slice(
            format!(
                "#{pen};2;{};{};{}",
                scale(c.ch[0]),
                scale(c.ch[1]),
                scale(c.ch[2])
            )
            .as_bytes(),
        );
    }

    let bands = height.div_ceil(6);
    for band in 0..bands {
        let y0 = band * 6;
        let mut used: Vec<usize> = Vec::new();
        for y in y0..(y0 + 6).min(height) {
            for &pen in &pens[y * width..(y + 1) * width] {
                if pen != TRANSPARENT_PEN && !used.contains(&pen) {
                    used.push(pen);
                }
            }
        }
        used.sort_unstable();

        for (pi, &pen) in used.iter().enumerate() {
            out.extend_from_slice(format!("#{pen}").as_bytes());
            let mut run_ch = 0u8;
            let mut run = 0usize;
            for x in 0..width {
                let mut bits = 0u8;
                for dy in 0..6 {
                    let y = y0 + dy;
                    if y < height && pens[y * width + x] == pen {
                        bits |= 1 << dy;
                    }
                }
                let ch = 63 + bits;
                if ch == run_ch {
                    run += 1;
                } else {
                    push_run(out, run_ch, run);
                    run_ch = ch;
                    run = 1;
                }
            }
            push_run(out, run_ch, run);
            if pi + 1 < used.len() {
                out.push(b'$');
            }
        }
        // Some terminals scroll one extra row on the final advance.
        let last = band + 1 == bands;
        if !last || !ti.quirks().contains(TermQuirks::SIXEL_OVERSHOOT) {
            out.push(b'-');
        }
    }

    out.extend_from_slice(&ti.emit_end_sixels().ok_or_else(|| missing("sixel"))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_term::termdb::TermDb;

    fn sixel_term() -> TermInfo {
        TermDb::new().detect(vec![("TERM".to_string(), "foot".to_string())])
    }

    fn encode_str(pixels: &[Color], w: usize, h: usize) -> String {
        let mut out = Vec::new();
        encode(&mut out, &sixel_term(), pixels, w, h, 127).unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn flat_image_is_one_pen_of_full_columns() {
        let s = encode_str(&vec![Color::new(0, 0, 255, 255); 8 * 6], 8, 6);
        // One palette entry, pure blue at percent scale.
        assert!(s.contains("#0;2;0;0;100"), "{s}");
        // A full 6-row column is sixel value 63 + 0b111111 = '~'.
        assert!(s.contains("!8~") || s.contains("~~~~~~~~"), "{s}");
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut pixels = vec![Color::new(200, 10, 10, 255); 4 * 6];
        for p in pixels.iter_mut().take(4 * 3) {
            *p = Color::new(0, 0, 0, 0);
        }
        let s = encode_str(&pixels, 4, 6);
        // Upper three rows skipped: columns carry the top three band
        // bits only, 63 + 0b111000 = 'w'.
        assert!(s.contains('w'), "{s}");
    }

    #[test]
    fn run_length_introducer_compresses_wide_runs() {
        let s = encode_str(&vec![Color::new(9, 9, 9, 255); 100 * 6], 100, 6);
        assert!(s.contains("!100~"), "{s}");
    }
}
