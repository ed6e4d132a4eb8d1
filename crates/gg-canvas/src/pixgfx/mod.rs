//! Pixel-protocol payloads: sixels, Kitty graphics, iTerm2 inline
//! images.
//!
//! Drawing in a pixel mode stores the scaled pixels on the canvas;
//! encoding happens at print time against the target terminal's
//! sequences, wrapped for a multiplexer when the configuration asks
//! for it.

mod iterm2;
mod kitty;
mod sixel;

use gg_core::color::Color;
use gg_core::config::{Passthrough, PixelMode};
use gg_term::terminfo::TermInfo;

use crate::error::CanvasError;

/// Screen's DCS payload limit is small; chunk well under it.
const SCREEN_CHUNK: usize = 768;

/// A drawn pixel payload, encoded when the canvas is printed.
#[derive(Clone, Debug)]
pub enum PixelCanvas {
    /// Sixel pixels, quantized to a palette at encode time.
    Sixel {
        /// Scaled RGBA pixels.
        pixels: Vec<Color>,
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },
    /// Kitty graphics payload, raw RGBA.
    Kitty {
        /// Row-major RGBA bytes.
        rgba: Vec<u8>,
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },
    /// iTerm2 inline image payload, PNG-encoded on the wire.
    Iterm2 {
        /// Row-major RGBA bytes.
        rgba: Vec<u8>,
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },
}

impl PixelCanvas {
    /// The pixel mode this payload targets.
    #[must_use]
    pub fn mode(&self) -> PixelMode {
        match self {
            PixelCanvas::Sixel { .. } => PixelMode::Sixels,
            PixelCanvas::Kitty { .. } => PixelMode::Kitty,
            PixelCanvas::Iterm2 { .. } => PixelMode::Iterm2,
        }
    }

    /// Encodes the payload into `out`, wrapping it for a multiplexer
    /// when requested.
    pub(crate) fn emit(
        &self,
        out: &mut Vec<u8>,
        ti: &TermInfo,
        cols: u32,
        rows: u32,
        passthrough: Passthrough,
        alpha_threshold: i32,
    ) -> Result<(), CanvasError> {
        let mut payload = Vec::new();
        match self {
            PixelCanvas::Sixel {
                pixels,
                width,
                height,
            } => sixel::encode(&mut payload, ti, pixels, *width, *height, alpha_threshold)?,
            PixelCanvas::Kitty {
                rgba,
                width,
                height,
            } => kitty::encode(&mut payload, ti, rgba, *width, *height, cols, rows)?,
            PixelCanvas::Iterm2 {
                rgba,
                width,
                height,
            } => iterm2::encode(&mut payload, ti, rgba, *width, *height, cols, rows)?,
        }
        wrap_passthrough(out, ti, passthrough, &payload)
    }
}

fn missing(what: &str) -> CanvasError {
    CanvasError::Encode(format!("terminal lacks {what} sequences"))
}

/// Wraps an escape payload for tmux or Screen. Tmux doubles every ESC
/// inside one DCS envelope; Screen splits the payload across short DCS
/// chunks.
fn wrap_passthrough(
    out: &mut Vec<u8>,
    ti: &TermInfo,
    passthrough: Passthrough,
    payload: &[u8],
) -> Result<(), CanvasError> {
    match passthrough {
        Passthrough::None => {
            out.extend_from_slice(payload);
        }
        Passthrough::Tmux => {
            out.extend_from_slice(
                &ti.emit_begin_tmux_passthrough()
                    .ok_or_else(|| missing("tmux passthrough"))?,
            );
            for &b in payload {
                out.push(b);
                if b == 0x1b {
                    out.push(0x1b);
                }
            }
            out.extend_from_slice(
                &ti.emit_end_tmux_passthrough()
                    .ok_or_else(|| missing("tmux passthrough"))?,
            );
        }
        Passthrough::Screen => {
            let begin = ti
                .emit_begin_screen_passthrough()
                .ok_or_else(|| missing("screen passthrough"))?;
            let end = ti
                .emit_end_screen_passthrough()
                .ok_or_else(|| missing("screen passthrough"))?;
            for chunk in payload.chunks(SCREEN_CHUNK) {
                out.extend_from_slice(&begin);
                out.extend_from_slice(chunk);
                out.extend_from_slice(&end);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_term::termdb::TermDb;

    fn term(name: &str, extra: &[(&str, &str)]) -> TermInfo {
        let mut vars: Vec<(String, String)> = vec![("TERM".into(), name.into())];
        for (k, v) in extra {
            vars.push(((*k).into(), (*v).into()));
        }
        TermDb::new().detect(vars)
    }

    #[test]
    fn tmux_wrapping_doubles_escapes() {
        let ti = term("tmux-256color", &[("TMUX", "/tmp/tmux-0/default,1,0")]);
        let mut out = Vec::new();
        wrap_passthrough(&mut out, &ti, Passthrough::Tmux, b"\x1b[31mx").unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.starts_with("\x1bPtmux;"));
        assert!(s.contains("\x1b\x1b[31mx"));
        assert!(s.ends_with("\x1b\\"));
    }

    #[test]
    fn screen_wrapping_chunks_long_payloads() {
        let ti = term("screen-256color", &[("STY", "1234.pts-0.host")]);
        let payload = vec![b'a'; SCREEN_CHUNK * 2 + 10];
        let mut out = Vec::new();
        wrap_passthrough(&mut out, &ti, Passthrough::Screen, &payload).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert_eq!(s.matches("\x1bP").count(), 3);
        assert_eq!(s.matches("\x1b\\").count(), 3);
    }

    #[test]
    fn kitty_payload_emits_begin_chunks_and_terminator() {
        let ti = term("xterm-kitty", &[]);
        let pc = PixelCanvas::Kitty {
            rgba: vec![0x40; 16 * 16 * 4],
            width: 16,
            height: 16,
        };
        let mut out = Vec::new();
        pc.emit(&mut out, &ti, 4, 2, Passthrough::None, 127).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.starts_with("\x1b_Ga=T,q=2,f=32,s=16,v=16,c=4,r=2,m=1\x1b\\"));
        assert!(s.contains("\x1b_Gm=1;"));
        assert!(s.ends_with("\x1b_Gm=0;\x1b\\"));
    }

    #[test]
    fn sixel_payload_uses_dcs_envelope() {
        let ti = term("mlterm", &[]);
        let pixels = vec![gg_core::color::Color::new(255, 0, 0, 255); 12 * 12];
        let pc = PixelCanvas::Sixel {
            pixels,
            width: 12,
            height: 12,
        };
        let mut out = Vec::new();
        pc.emit(&mut out, &ti, 2, 1, Passthrough::None, 127).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.starts_with("\x1bP0;1;0q"));
        assert!(s.contains("\"1;1;12;12"));
        assert!(s.ends_with("\x1b\\"));
    }

    #[test]
    fn unsupported_terminal_errors_instead_of_garbage() {
        let ti = term("dumb", &[]);
        let pc = PixelCanvas::Iterm2 {
            rgba: vec![0; 4],
            width: 1,
            height: 1,
        };
        let mut out = Vec::new();
        assert!(pc.emit(&mut out, &ti, 1, 1, Passthrough::None, 127).is_err());
    }
}
