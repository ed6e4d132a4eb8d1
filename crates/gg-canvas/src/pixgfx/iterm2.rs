//! iTerm2 inline image encoding.
//!
//! The payload is a PNG, base64-coded inside a single OSC 1337
//! sequence with the cell geometry in its header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use gg_term::terminfo::TermInfo;

use crate::error::CanvasError;

use super::missing;

pub(super) fn encode(
    out: &mut Vec<u8>,
    ti: &TermInfo,
    rgba: &[u8],
    width: usize,
    height: usize,
    cols: u32,
    rows: u32,
) -> Result<(), CanvasError> {
    let begin = ti
        .emit_begin_iterm2_image(cols, rows)
        .ok_or_else(|| missing("iterm2 inline image"))?;
    let end = ti
        .emit_end_iterm2_image()
        .ok_or_else(|| missing("iterm2 inline image"))?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgba, width as u32, height as u32, ExtendedColorType::Rgba8)
        .map_err(|e| CanvasError::Encode(format!("png: {e}")))?;

    out.extend_from_slice(&begin);
    out.extend_from_slice(BASE64.encode(&png).as_bytes());
    out.extend_from_slice(&end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_term::termdb::TermDb;

    #[test]
    fn emits_one_osc_1337_sequence() {
        let ti = TermDb::new().detect(vec![
            ("TERM".to_string(), "xterm-256color".to_string()),
            ("TERM_PROGRAM".to_string(), "iTerm.app".to_string()),
        ]);
        let rgba = vec![0x7f; 2 * 2 * 4];
        let mut out = Vec::new();
        encode(&mut out, &ti, &rgba, 2, 2, 1, 1).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.starts_with("\x1b]1337;File=inline=1;width=1;height=1;preserveAspectRatio=0:"));
        assert!(s.ends_with("\x07"));
        // The payload decodes back to a PNG signature.
        let body = &s
            [s.find(':').unwrap() + 1..s.len() - 1];
        let png = BASE64.decode(body).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
