//! Kitty graphics protocol encoding.
//!
//! The image goes out as raw 32-bit RGBA, base64-coded and split into
//! chunks so no single escape grows unbounded. The opening escape
//! carries the geometry; an empty `m=0` escape terminates the stream.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use gg_term::terminfo::TermInfo;

use crate::error::CanvasError;

use super::missing;

/// Base64 characters per chunk escape.
const CHUNK: usize = 4096;

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
        .emit_begin_kitty_immediate_image_v1(32, width as u32, height as u32, cols, rows)
        .ok_or_else(|| missing("kitty graphics"))?;
    let chunk_begin = ti
        .emit_begin_kitty_image_chunk()
        .ok_or_else(|| missing("kitty graphics"))?;
    let chunk_end = ti
        .emit_end_kitty_image_chunk()
        .ok_or_else(|| missing("kitty graphics"))?;
    let end = ti
        .emit_end_kitty_image()
        .ok_or_else(|| missing("kitty graphics"))?;

    out.extend_from_slice(&begin);
    let encoded = BASE64.encode(rgba);
    for chunk in encoded.as_bytes().chunks(CHUNK) {
        out.extend_from_slice(&chunk_begin);
        out.extend_from_slice(chunk);
        out.extend_from_slice(&chunk_end);
    }
    out.extend_from_slice(&end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_term::termdb::TermDb;

    fn kitty_term() -> TermInfo {
        TermDb::new().detect(vec![("TERM".to_string(), "xterm-kitty".to_string())])
    }

    #[test]
    fn large_payloads_are_chunked() {
        // 64x64 RGBA is 16384 bytes, several chunks of base64.
        let rgba = vec![0xaa; 64 * 64 * 4];
        let mut out = Vec::new();
        encode(&mut out, &kitty_term(), &rgba, 64, 64, 8, 4).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.matches("\x1b_Gm=1;").count() > 1);
        assert!(s.ends_with("\x1b_Gm=0;\x1b\\"));
    }

    #[test]
    fn geometry_lands_in_the_opening_escape() {
        let mut out = Vec::new();
        encode(&mut out, &kitty_term(), &[0; 4], 1, 1, 3, 2).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.starts_with("\x1b_Ga=T,q=2,f=32,s=1,v=1,c=3,r=2,m=1\x1b\\"));
    }
}
