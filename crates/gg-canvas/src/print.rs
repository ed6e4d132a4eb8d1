//! Emitting a canvas as a terminal escape stream.
//!
//! Symbol canvases coalesce identical runs so color sequences go out
//! once per run, with three optional shrink passes: attribute reuse
//! across rows, cursor skips over cells unchanged since the last print,
//! and the ECH-style repeat introducer for long runs. Pixel canvases
//! defer to the protocol encoders in [`crate::pixgfx`].

use gg_core::config::{CanvasMode, Optimizations, PixelMode};
use gg_term::seq::SeqKind;
use gg_term::terminfo::TermInfo;

use crate::canvas::{Canvas, CanvasCell, CellColor};
use crate::error::CanvasError;
use crate::palette::Palette;

/// Shorter unchanged runs cost more to skip than to reprint.
const SKIP_MIN: usize = 4;
/// Runs longer than this use the repeat introducer.
const REPEAT_MIN: usize = 4;

struct Emitter<'a> {
    ti: &'a TermInfo,
    mode: CanvasMode,
    fg_only: bool,
    opts: Optimizations,
    palette: &'a Palette,
    cur: Option<(CellColor, CellColor)>,
    cur_invert: bool,
}

fn push(out: &mut Vec<u8>, seq: Option<Vec<u8>>) {
    if let Some(s) = seq {
        out.extend_from_slice(&s);
    }
}

impl Emitter<'_> {
    fn pen(&self, c: CellColor) -> Option<u32> {
        match c {
            CellColor::Pen(p) => Some(u32::from(p)),
            _ => None,
        }
    }

    fn emit_colors(&mut self, out: &mut Vec<u8>, fg: CellColor, bg: CellColor) {
        if self.cur == Some((fg, bg)) {
            return;
        }
        match self.mode {
            CanvasMode::FgBg | CanvasMode::FgBgBgFg => {
                // Two-color modes carry no SGR colors; pens encode
                // orientation only.
                let inverted = fg == CellColor::Pen(0);
                if inverted != self.cur_invert {
                    if inverted {
                        push(out, self.ti.emit_invert_colors());
                    } else {
                        push(out, self.ti.emit_reset_attributes());
                    }
                    self.cur_invert = inverted;
                }
            }
            CanvasMode::Truecolor => {
                let direct = |c: CellColor| match c {
                    CellColor::Direct(c) => Some(c),
                    CellColor::Pen(p) => {
                        let c = self.palette.color(usize::from(p));
                        (c.ch[3] > 0).then_some(c)
                    }
                    CellColor::Transparent => None,
                };
                match (direct(fg), direct(bg)) {
                    _ if self.fg_only => match direct(fg) {
                        Some(f) => push(out, self.ti.emit_set_color_fg_direct(f)),
                        None => push(out, self.ti.emit_reset_color_fg()),
                    },
                    (Some(f), Some(b)) => push(out, self.ti.emit_set_color_fgbg_direct(f, b)),
                    (Some(f), None) => {
                        push(out, self.ti.emit_reset_color_bg());
                        push(out, self.ti.emit_set_color_fg_direct(f));
                    }
                    (None, Some(b)) => {
                        push(out, self.ti.emit_reset_color_fg());
                        push(out, self.ti.emit_set_color_bg_direct(b));
                    }
                    (None, None) => push(out, self.ti.emit_reset_color_fgbg()),
                }
            }
            CanvasMode::Indexed256 | CanvasMode::Indexed240 => {
                self.emit_pens(out, fg, bg, |ti, p| ti.emit_set_color_fg_256(p), |ti, p| {
                    ti.emit_set_color_bg_256(p)
                }, |ti, f, b| ti.emit_set_color_fgbg_256(f, b));
            }
            CanvasMode::Indexed16 => {
                self.emit_pens(out, fg, bg, |ti, p| ti.emit_set_color_fg_16(p), |ti, p| {
                    ti.emit_set_color_bg_16(p)
                }, |ti, f, b| ti.emit_set_color_fgbg_16(f, b));
            }
            CanvasMode::Indexed16_8 => {
                // Full 16 pens in front, the dark 8 behind.
                self.emit_pens(out, fg, bg, |ti, p| ti.emit_set_color_fg_16(p), |ti, p| {
                    ti.emit_set_color_bg_8(p & 7)
                }, |ti, f, b| {
                    let mut v = ti.emit_set_color_fg_16(f)?;
                    v.extend(ti.emit_set_color_bg_8(b & 7)?);
                    Some(v)
                });
            }
            CanvasMode::Indexed8 => {
                self.emit_pens(out, fg, bg, |ti, p| ti.emit_set_color_fg_8(p & 7), |ti, p| {
                    ti.emit_set_color_bg_8(p & 7)
                }, |ti, f, b| ti.emit_set_color_fgbg_8(f & 7, b & 7));
            }
        }
        self.cur = Some((fg, bg));
    }

    fn emit_pens(
        &self,
        out: &mut Vec<u8>,
        fg: CellColor,
        bg: CellColor,
        set_fg: impl Fn(&TermInfo, u32) -> Option<Vec<u8>>,
        set_bg: impl Fn(&TermInfo, u32) -> Option<Vec<u8>>,
        set_fgbg: impl Fn(&TermInfo, u32, u32) -> Option<Vec<u8>>,
    ) {
        if self.fg_only {
            match self.pen(fg) {
                Some(p) => push(out, set_fg(self.ti, p)),
                None => push(out, self.ti.emit_reset_color_fg()),
            }
            return;
        }
        match (self.pen(fg), self.pen(bg)) {
            (Some(f), Some(b)) => push(out, set_fgbg(self.ti, f, b)),
            (Some(f), None) => {
                push(out, self.ti.emit_reset_color_bg());
                push(out, set_fg(self.ti, f));
            }
            (None, Some(b)) => {
                push(out, self.ti.emit_reset_color_fg());
                push(out, set_bg(self.ti, b));
            }
            (None, None) => push(out, self.ti.emit_reset_color_fgbg()),
        }
    }

    fn push_char(out: &mut Vec<u8>, c: char) {
        let mut buf = [0u8; 4];
        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn emit_row(&mut self, out: &mut Vec<u8>, row: &[CanvasCell], prev: Option<&[CanvasCell]>) {
        let w = row.len();
        let mut x = 0;
        while x < w {
            // Cells unchanged since the last print become a cursor skip.
            if self.opts.contains(Optimizations::SKIP_CELLS)
                && self.ti.have_seq(SeqKind::CursorRight)
            {
                if let Some(prev) = prev {
                    let mut n = 0;
                    while x + n < w
                        && row[x + n] == prev[x + n]
                        && !(n == 0 && row[x].c == '\0')
                    {
                        n += 1;
                    }
                    // Never split a wide pair.
                    if x + n < w && row[x + n].c == '\0' {
                        n = n.saturating_sub(1);
                    }
                    if n >= SKIP_MIN {
                        push(out, self.ti.emit_cursor_right(n as u32));
                        x += n;
                        continue;
                    }
                }
            }

            let cell = row[x];
            let unit = if x + 1 < w && row[x + 1].c == '\0' { 2 } else { 1 };
            let mut n = 1;
            while x + (n + 1) * unit <= w {
                let next = &row[x + n * unit..x + (n + 1) * unit];
                if next[0] != cell || (unit == 2 && next[1].c != '\0') {
                    break;
                }
                n += 1;
            }

            self.emit_colors(out, cell.fg, cell.bg);
            let c = if cell.c == '\0' { ' ' } else { cell.c };
            if unit == 1
                && n > REPEAT_MIN
                && self.opts.contains(Optimizations::REPEAT_CELLS)
                && self.ti.have_seq(SeqKind::RepeatChar)
            {
                Self::push_char(out, c);
                push(out, self.ti.emit_repeat_char(n as u32 - 1));
            } else {
                for _ in 0..n {
                    Self::push_char(out, c);
                }
            }
            x += n * unit;
        }

        if !self.opts.contains(Optimizations::REUSE_ATTRIBUTES) {
            push(out, self.ti.emit_reset_attributes());
            self.cur = None;
            self.cur_invert = false;
        }
    }
}

impl Canvas {
    /// Prints the canvas as one escape stream, rows separated by
    /// newlines. Pixel-mode canvases emit their protocol payload
    /// instead.
    pub fn print(&mut self, ti: &TermInfo) -> Result<Vec<u8>, CanvasError> {
        let config = self.peek_config();
        if config.pixel_mode != PixelMode::Symbols {
            let mut out = Vec::new();
            if let Some(pc) = &self.pixel_canvas {
                pc.emit(
                    &mut out,
                    ti,
                    self.width() as u32,
                    self.height() as u32,
                    config.passthrough,
                    config.alpha_threshold,
                )?;
            }
            return Ok(out);
        }
        let rows = self.print_rows(ti)?;
        let mut out = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&row);
        }
        Ok(out)
    }

    /// Prints the canvas row by row, one escape stream per row with no
    /// newlines, for callers that position the cursor themselves. Only
    /// symbol canvases can be split this way.
    pub fn print_rows(&mut self, ti: &TermInfo) -> Result<Vec<Vec<u8>>, CanvasError> {
        let config = self.peek_config();
        if config.pixel_mode != PixelMode::Symbols {
            return Err(CanvasError::Config(
                "row printing requires symbol mode".into(),
            ));
        }
        let (mode, fg_only, opts) = (config.canvas_mode, config.fg_only, config.optimizations);
        let w = self.width();
        let h = self.height();

        let palette = self.palette().clone();
        let mut em = Emitter {
            ti,
            mode,
            fg_only,
            opts,
            palette: &palette,
            cur: None,
            cur_invert: false,
        };

        let baseline = if opts.contains(Optimizations::SKIP_CELLS) {
            self.prev_cells.clone()
        } else {
            None
        };
        let cells = self.cells().to_vec();

        let mut rows = Vec::with_capacity(h);
        for y in 0..h {
            let mut out = Vec::new();
            let prev = baseline
                .as_ref()
                .map(|b| &b[y * w..(y + 1) * w]);
            em.emit_row(&mut out, &cells[y * w..(y + 1) * w], prev);
            rows.push(out);
        }
        if opts.contains(Optimizations::REUSE_ATTRIBUTES) {
            if let Some(last) = rows.last_mut() {
                push(last, ti.emit_reset_attributes());
            }
        }

        self.prev_cells = Some(cells);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use gg_core::pixels::PixelType;
    use gg_symbols::map::SymbolMap;
    use gg_symbols::tags::SymbolTags;
    use gg_term::termdb::TermDb;

    fn term() -> TermInfo {
        TermDb::new().detect(vec![
            ("TERM".to_string(), "xterm-256color".to_string()),
            ("COLORTERM".to_string(), "truecolor".to_string()),
        ])
    }

    fn red_canvas(mode: CanvasMode, opts: Optimizations) -> Canvas {
        let mut cfg = CanvasConfig::new();
        cfg.width = 6;
        cfg.height = 2;
        cfg.canvas_mode = mode;
        cfg.optimizations = opts;
        cfg.n_threads = 1;
        cfg.symbol_map = SymbolMap::new();
        cfg.symbol_map.add_by_tags(SymbolTags::SPACE | SymbolTags::SOLID);
        let mut canvas = Canvas::new(cfg).unwrap();
        let data: Vec<u8> = std::iter::repeat([255u8, 0, 0, 255])
            .take(4)
            .flatten()
            .collect();
        canvas
            .draw_all_pixels(PixelType::Rgba8Unassociated, &data, 2, 2, 8)
            .unwrap();
        canvas
    }

    #[test]
    fn truecolor_output_carries_direct_sgr_and_resets_each_row() {
        let mut canvas = red_canvas(CanvasMode::Truecolor, Optimizations::NONE);
        let out = canvas.print(&term()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains(";2;255;0;0"), "{s:?}");
        assert_eq!(s.matches("\x1b[0m").count(), 2);
        assert_eq!(s.matches('\n').count(), 1);
        // A flat run sets its color pair once per row.
        assert_eq!(s.matches("\x1b[38;2;255;0;0;48;2;255;0;0m").count(), 2);
    }

    #[test]
    fn reuse_attributes_resets_only_once() {
        let mut canvas = red_canvas(CanvasMode::Truecolor, Optimizations::REUSE_ATTRIBUTES);
        let out = canvas.print(&term()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s.matches("\x1b[0m").count(), 1);
        assert!(s.ends_with("\x1b[0m"));
    }

    #[test]
    fn repeat_cells_uses_the_ech_introducer() {
        let mut canvas = red_canvas(CanvasMode::Truecolor, Optimizations::REPEAT_CELLS);
        let out = canvas.print(&term()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("\x1b[5b"), "{s:?}");
    }

    #[test]
    fn skip_cells_turns_unchanged_rows_into_cursor_motion() {
        let mut canvas = red_canvas(CanvasMode::Truecolor, Optimizations::SKIP_CELLS);
        let ti = term();
        let first = canvas.print(&ti).unwrap();
        assert!(!String::from_utf8_lossy(&first).contains("\x1b[6C"));
        let second = canvas.print(&ti).unwrap();
        let s = String::from_utf8(second).unwrap();
        assert!(s.contains("\x1b[6C"), "{s:?}");
        assert!(!s.contains(";2;255;0;0"), "{s:?}");
    }

    #[test]
    fn indexed_256_emits_pen_sequences() {
        let mut canvas = red_canvas(CanvasMode::Indexed256, Optimizations::NONE);
        let out = canvas.print(&term()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("\x1b[38;5;") || s.contains("\x1b[48;5;"), "{s:?}");
    }

    #[test]
    fn fgbg_mode_emits_no_color_sequences() {
        let mut canvas = red_canvas(CanvasMode::FgBg, Optimizations::NONE);
        let out = canvas.print(&term()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(!s.contains("\x1b[38;"), "{s:?}");
        assert!(!s.contains("\x1b[48;"), "{s:?}");
    }

    #[test]
    fn print_rows_rejects_pixel_modes() {
        let mut cfg = CanvasConfig::new();
        cfg.pixel_mode = PixelMode::Kitty;
        cfg.n_threads = 1;
        let mut canvas = Canvas::new(cfg).unwrap();
        assert!(canvas.print_rows(&term()).is_err());
    }
}
