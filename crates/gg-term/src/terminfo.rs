//! Terminal capability records.
//!
//! A [`TermInfo`] holds one formatting template per [`SeqKind`], plus
//! quirks and passthrough requirements. Templates use `%n` placeholders
//! for 1-based positional arguments (`%%` is a literal percent sign);
//! they are validated when set, so emission never fails on a malformed
//! template, only on a missing one or a wrong argument count.

use gg_core::color::Color;
use gg_core::config::{PIXEL_MODE_COUNT, PixelMode};
use gg_symbols::tags::SymbolTags;

use crate::seq::{ParseResult, SEQ_ARGS_MAX, SEQ_COUNT, SEQ_LENGTH_MAX, SeqKind, TermQuirks};

/// Error raised when installing a sequence template.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// The template string could not be parsed or validated.
    #[error("bad template for {kind:?}: {reason}")]
    Template {
        /// The sequence being set.
        kind: SeqKind,
        /// What was wrong with it.
        reason: String,
    },
}

#[derive(Clone, Debug)]
enum Piece {
    Text(Vec<u8>),
    Arg(u8),
}

#[derive(Clone, Debug)]
struct SeqTemplate {
    pieces: Vec<Piece>,
}

impl SeqTemplate {
    fn parse(kind: SeqKind, s: &str) -> Result<SeqTemplate, TermError> {
        let err = |reason: String| TermError::Template { kind, reason };
        let mut pieces: Vec<Piece> = Vec::new();
        let mut text: Vec<u8> = Vec::new();
        let mut literal_len = 0usize;
        let mut n_arg_slots = 0usize;
        let mut seen = 0u32;

        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'%' {
                text.push(bytes[i]);
                literal_len += 1;
                i += 1;
                continue;
            }
            i += 1;
            match bytes.get(i) {
                Some(b'%') => {
                    text.push(b'%');
                    literal_len += 1;
                    i += 1;
                }
                Some(c) if c.is_ascii_digit() => {
                    let mut n = 0usize;
                    while let Some(c) = bytes.get(i) {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        n = n * 10 + usize::from(c - b'0');
                        i += 1;
                    }
                    if n == 0 || n > SEQ_ARGS_MAX {
                        return Err(err(format!("argument index {n} out of range")));
                    }
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Arg((n - 1) as u8));
                    n_arg_slots += 1;
                    seen |= 1 << (n - 1);
                }
                _ => return Err(err("dangling '%'".into())),
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        // Every argument 1..=n_args referenced, no gaps, nothing beyond.
        let full = (1u32 << kind.n_args()) - 1;
        if seen != full {
            let missing = !seen & full;
            let reason = if missing == 0 {
                format!("template takes more than {} arguments", kind.n_args())
            } else {
                format!(
                    "argument %{} is never referenced",
                    missing.trailing_zeros() + 1
                )
            };
            return Err(err(reason));
        }
        // Budget four digits per formatted argument.
        if literal_len + n_arg_slots * 4 > SEQ_LENGTH_MAX {
            return Err(err("formatted sequence may exceed the length cap".into()));
        }
        Ok(SeqTemplate { pieces })
    }

    fn emit(&self, args: &[u32], out: &mut Vec<u8>) {
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.extend_from_slice(t),
                Piece::Arg(i) => {
                    let mut buf = itoa_u32(args[usize::from(*i)]);
                    out.append(&mut buf);
                }
            }
        }
    }
}

fn itoa_u32(mut v: u32) -> Vec<u8> {
    if v == 0 {
        return vec![b'0'];
    }
    let mut buf = Vec::with_capacity(10);
    while v > 0 {
        buf.push(b'0' + (v % 10) as u8);
        v /= 10;
    }
    buf.reverse();
    buf
}

/// Capabilities of one terminal: sequence templates, quirks, and which
/// pixel modes need multiplexer passthrough.
///
/// # Example
/// ```
/// use gg_term::seq::SeqKind;
/// use gg_term::terminfo::TermInfo;
///
/// let mut ti = TermInfo::new("demo");
/// ti.set_seq(SeqKind::CursorToPos, "\x1b[%2;%1H").unwrap();
/// assert_eq!(ti.emit_cursor_to_pos(3, 5), Some(b"\x1b[6;4H".to_vec()));
/// ```
#[derive(Clone, Debug)]
pub struct TermInfo {
    name: String,
    seqs: [Option<SeqTemplate>; SEQ_COUNT],
    passthrough_needed: [bool; PIXEL_MODE_COUNT],
    quirks: TermQuirks,
    safe_symbol_tags: SymbolTags,
}

impl TermInfo {
    /// An empty record with no sequences at all.
    #[must_use]
    pub fn new(name: &str) -> Self {
        TermInfo {
            name: name.to_owned(),
            seqs: std::array::from_fn(|_| None),
            passthrough_needed: [false; PIXEL_MODE_COUNT],
            quirks: TermQuirks::NONE,
            safe_symbol_tags: SymbolTags::ALL,
        }
    }

    /// The record's name, e.g. the `TERM` value it was built for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs (or, with an empty string, clears) the template for `kind`.
    ///
    /// The template must reference exactly the arguments `kind` takes and
    /// must fit [`SEQ_LENGTH_MAX`] when formatted. On error the previous
    /// template is left in place.
    pub fn set_seq(&mut self, kind: SeqKind, template: &str) -> Result<(), TermError> {
        if template.is_empty() {
            self.seqs[kind.index()] = None;
            return Ok(());
        }
        let t = SeqTemplate::parse(kind, template)?;
        self.seqs[kind.index()] = Some(t);
        Ok(())
    }

    /// Whether a template for `kind` is installed.
    #[must_use]
    pub fn have_seq(&self, kind: SeqKind) -> bool {
        self.seqs[kind.index()].is_some()
    }

    /// Formats `kind` with `args`.
    ///
    /// Returns `None` when no template is installed or the argument count
    /// is wrong.
    #[must_use]
    pub fn emit_seq(&self, kind: SeqKind, args: &[u32]) -> Option<Vec<u8>> {
        if args.len() != kind.n_args() {
            return None;
        }
        let t = self.seqs[kind.index()].as_ref()?;
        let mut out = Vec::with_capacity(SEQ_LENGTH_MAX);
        t.emit(args, &mut out);
        Some(out)
    }

    /// Matches `input` against the template for `kind`.
    ///
    /// Returns [`ParseResult::Again`] when `input` is a proper prefix of
    /// the sequence, [`ParseResult::Failure`] when it cannot match, and
    /// the extracted arguments on success.
    #[must_use]
    pub fn parse_seq(&self, kind: SeqKind, input: &[u8]) -> ParseResult {
        let Some(t) = self.seqs[kind.index()].as_ref() else {
            return ParseResult::Failure;
        };
        let mut args: Vec<u32> = vec![0; kind.n_args()];
        let mut pos = 0usize;
        for (pi, piece) in t.pieces.iter().enumerate() {
            match piece {
                Piece::Text(text) => {
                    for &b in text {
                        match input.get(pos) {
                            None => return ParseResult::Again,
                            Some(&ib) if ib == b => pos += 1,
                            Some(_) => return ParseResult::Failure,
                        }
                    }
                }
                Piece::Arg(i) => {
                    let mut v: u64 = 0;
                    let mut digits = 0;
                    while let Some(&b) = input.get(pos) {
                        if !b.is_ascii_digit() {
                            break;
                        }
                        v = v * 10 + u64::from(b - b'0');
                        if v > u64::from(u32::MAX) {
                            return ParseResult::Failure;
                        }
                        digits += 1;
                        pos += 1;
                    }
                    if digits == 0 {
                        return if pos == input.len() {
                            ParseResult::Again
                        } else {
                            ParseResult::Failure
                        };
                    }
                    // Ran out of input while digits might continue.
                    if pos == input.len() && pi + 1 < t.pieces.len() {
                        return ParseResult::Again;
                    }
                    args[usize::from(*i)] = v as u32;
                }
            }
        }
        ParseResult::Success {
            args,
            consumed: pos,
        }
    }

    /// Copies every sequence missing here from `other`.
    pub fn supplement(&mut self, other: &TermInfo) {
        for i in 0..SEQ_COUNT {
            if self.seqs[i].is_none() {
                self.seqs[i].clone_from(&other.seqs[i]);
            }
        }
    }

    /// Known misbehaviors of this terminal.
    #[must_use]
    pub fn quirks(&self) -> TermQuirks {
        self.quirks
    }

    /// Adds quirk bits.
    pub fn add_quirks(&mut self, quirks: TermQuirks) {
        self.quirks |= quirks;
    }

    /// Symbol tags this terminal's fonts are trusted to render.
    #[must_use]
    pub fn safe_symbol_tags(&self) -> SymbolTags {
        self.safe_symbol_tags
    }

    /// Restricts the trusted symbol tags.
    pub fn set_safe_symbol_tags(&mut self, tags: SymbolTags) {
        self.safe_symbol_tags = tags;
    }

    /// Whether `mode` output must be wrapped in multiplexer passthrough.
    #[must_use]
    pub fn pixel_passthrough_needed(&self, mode: PixelMode) -> bool {
        self.passthrough_needed[mode.index()]
    }

    /// Marks `mode` as requiring passthrough wrapping.
    pub fn set_pixel_passthrough_needed(&mut self, mode: PixelMode, needed: bool) {
        self.passthrough_needed[mode.index()] = needed;
    }
}

/// Typed emit helpers. Wrong pens and missing templates yield `None`.
impl TermInfo {
    /// `reset_attributes`.
    #[must_use]
    pub fn emit_reset_attributes(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::ResetAttributes, &[])
    }

    /// `invert_colors`.
    #[must_use]
    pub fn emit_invert_colors(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::InvertColors, &[])
    }

    /// `clear`.
    #[must_use]
    pub fn emit_clear(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::Clear, &[])
    }

    /// `cursor_to_pos` with 0-based cell coordinates.
    #[must_use]
    pub fn emit_cursor_to_pos(&self, x: u32, y: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::CursorToPos, &[x + 1, y + 1])
    }

    /// `cursor_right` by `n` cells.
    #[must_use]
    pub fn emit_cursor_right(&self, n: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::CursorRight, &[n])
    }

    /// `cursor_down` by `n` rows.
    #[must_use]
    pub fn emit_cursor_down(&self, n: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::CursorDown, &[n])
    }

    /// `repeat_char`: repeat the preceding character `n` more times.
    #[must_use]
    pub fn emit_repeat_char(&self, n: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::RepeatChar, &[n])
    }

    /// `set_color_fg_direct`.
    #[must_use]
    pub fn emit_set_color_fg_direct(&self, c: Color) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::SetColorFgDirect,
            &[c.ch[0].into(), c.ch[1].into(), c.ch[2].into()],
        )
    }

    /// `set_color_bg_direct`.
    #[must_use]
    pub fn emit_set_color_bg_direct(&self, c: Color) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::SetColorBgDirect,
            &[c.ch[0].into(), c.ch[1].into(), c.ch[2].into()],
        )
    }

    /// `set_color_fgbg_direct`.
    #[must_use]
    pub fn emit_set_color_fgbg_direct(&self, fg: Color, bg: Color) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::SetColorFgbgDirect,
            &[
                fg.ch[0].into(),
                fg.ch[1].into(),
                fg.ch[2].into(),
                bg.ch[0].into(),
                bg.ch[1].into(),
                bg.ch[2].into(),
            ],
        )
    }

    /// `set_color_fg_256`.
    #[must_use]
    pub fn emit_set_color_fg_256(&self, pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SetColorFg256, &[pen])
    }

    /// `set_color_bg_256`.
    #[must_use]
    pub fn emit_set_color_bg_256(&self, pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SetColorBg256, &[pen])
    }

    /// `set_color_fgbg_256`.
    #[must_use]
    pub fn emit_set_color_fgbg_256(&self, fg_pen: u32, bg_pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SetColorFgbg256, &[fg_pen, bg_pen])
    }

    fn sgr_16(pen: u32, base: u32, bright_base: u32) -> Option<u32> {
        match pen {
            0..=7 => Some(base + pen),
            8..=15 => Some(bright_base + pen - 8),
            _ => None,
        }
    }

    /// `set_color_fg_16` for ANSI pens 0..=15.
    #[must_use]
    pub fn emit_set_color_fg_16(&self, pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SetColorFg16, &[Self::sgr_16(pen, 30, 90)?])
    }

    /// `set_color_bg_16` for ANSI pens 0..=15.
    #[must_use]
    pub fn emit_set_color_bg_16(&self, pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SetColorBg16, &[Self::sgr_16(pen, 40, 100)?])
    }

    /// `set_color_fgbg_16` for ANSI pens 0..=15.
    #[must_use]
    pub fn emit_set_color_fgbg_16(&self, fg_pen: u32, bg_pen: u32) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::SetColorFgbg16,
            &[
                Self::sgr_16(fg_pen, 30, 90)?,
                Self::sgr_16(bg_pen, 40, 100)?,
            ],
        )
    }

    /// `set_color_fg_8` for ANSI pens 0..=7.
    #[must_use]
    pub fn emit_set_color_fg_8(&self, pen: u32) -> Option<Vec<u8>> {
        if pen > 7 {
            return None;
        }
        self.emit_seq(SeqKind::SetColorFg8, &[30 + pen])
    }

    /// `set_color_bg_8` for ANSI pens 0..=7.
    #[must_use]
    pub fn emit_set_color_bg_8(&self, pen: u32) -> Option<Vec<u8>> {
        if pen > 7 {
            return None;
        }
        self.emit_seq(SeqKind::SetColorBg8, &[40 + pen])
    }

    /// `set_color_fgbg_8` for ANSI pens 0..=7.
    #[must_use]
    pub fn emit_set_color_fgbg_8(&self, fg_pen: u32, bg_pen: u32) -> Option<Vec<u8>> {
        if fg_pen > 7 || bg_pen > 7 {
            return None;
        }
        self.emit_seq(SeqKind::SetColorFgbg8, &[30 + fg_pen, 40 + bg_pen])
    }

    /// `reset_color_fg`.
    #[must_use]
    pub fn emit_reset_color_fg(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::ResetColorFg, &[])
    }

    /// `reset_color_bg`.
    #[must_use]
    pub fn emit_reset_color_bg(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::ResetColorBg, &[])
    }

    /// `reset_color_fgbg`.
    #[must_use]
    pub fn emit_reset_color_fgbg(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::ResetColorFgbg, &[])
    }

    /// `begin_sixels`. All three DCS parameters can normally be 0.
    #[must_use]
    pub fn emit_begin_sixels(&self, p1: u32, p2: u32, p3: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::BeginSixels, &[p1, p2, p3])
    }

    /// `end_sixels`.
    #[must_use]
    pub fn emit_end_sixels(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndSixels, &[])
    }

    /// `begin_kitty_immediate_image_v1`.
    ///
    /// `bpp` is 24 for RGB, 32 for RGBA, 100 for embedded PNG.
    #[must_use]
    pub fn emit_begin_kitty_immediate_image_v1(
        &self,
        bpp: u32,
        width_px: u32,
        height_px: u32,
        width_cells: u32,
        height_cells: u32,
    ) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::BeginKittyImmediateImageV1,
            &[bpp, width_px, height_px, width_cells, height_cells],
        )
    }

    /// `begin_kitty_immediate_virt_image_v1` (placement via placeholders).
    #[must_use]
    pub fn emit_begin_kitty_immediate_virt_image_v1(
        &self,
        bpp: u32,
        width_px: u32,
        height_px: u32,
        width_cells: u32,
        height_cells: u32,
    ) -> Option<Vec<u8>> {
        self.emit_seq(
            SeqKind::BeginKittyImmediateVirtImageV1,
            &[bpp, width_px, height_px, width_cells, height_cells],
        )
    }

    /// `begin_kitty_image_chunk`.
    #[must_use]
    pub fn emit_begin_kitty_image_chunk(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::BeginKittyImageChunk, &[])
    }

    /// `end_kitty_image_chunk`.
    #[must_use]
    pub fn emit_end_kitty_image_chunk(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndKittyImageChunk, &[])
    }

    /// `end_kitty_image`.
    #[must_use]
    pub fn emit_end_kitty_image(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndKittyImage, &[])
    }

    /// `begin_iterm2_image` with the placement size in cells.
    #[must_use]
    pub fn emit_begin_iterm2_image(&self, width: u32, height: u32) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::BeginIterm2Image, &[width, height])
    }

    /// `end_iterm2_image`.
    #[must_use]
    pub fn emit_end_iterm2_image(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndIterm2Image, &[])
    }

    /// `begin_screen_passthrough`.
    #[must_use]
    pub fn emit_begin_screen_passthrough(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::BeginScreenPassthrough, &[])
    }

    /// `end_screen_passthrough`.
    #[must_use]
    pub fn emit_end_screen_passthrough(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndScreenPassthrough, &[])
    }

    /// `begin_tmux_passthrough`.
    #[must_use]
    pub fn emit_begin_tmux_passthrough(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::BeginTmuxPassthrough, &[])
    }

    /// `end_tmux_passthrough`.
    #[must_use]
    pub fn emit_end_tmux_passthrough(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::EndTmuxPassthrough, &[])
    }

    /// `save_cursor_pos`.
    #[must_use]
    pub fn emit_save_cursor_pos(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::SaveCursorPos, &[])
    }

    /// `restore_cursor_pos`.
    #[must_use]
    pub fn emit_restore_cursor_pos(&self) -> Option<Vec<u8>> {
        self.emit_seq(SeqKind::RestoreCursorPos, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> TermInfo {
        let mut ti = TermInfo::new("demo");
        ti.set_seq(SeqKind::ResetAttributes, "\x1b[0m").unwrap();
        ti.set_seq(SeqKind::CursorToPos, "\x1b[%2;%1H").unwrap();
        ti.set_seq(SeqKind::SetColorFgDirect, "\x1b[38;2;%1;%2;%3m")
            .unwrap();
        ti.set_seq(SeqKind::SetColorFg16, "\x1b[%1m").unwrap();
        ti
    }

    #[test]
    fn emit_formats_positional_args() {
        let ti = demo();
        assert_eq!(ti.emit_reset_attributes(), Some(b"\x1b[0m".to_vec()));
        assert_eq!(ti.emit_cursor_to_pos(0, 0), Some(b"\x1b[1;1H".to_vec()));
        assert_eq!(
            ti.emit_set_color_fg_direct(Color::new(255, 128, 0, 255)),
            Some(b"\x1b[38;2;255;128;0m".to_vec())
        );
        assert_eq!(ti.emit_clear(), None);
    }

    #[test]
    fn bright_pens_use_the_aixterm_range() {
        let ti = demo();
        assert_eq!(ti.emit_set_color_fg_16(1), Some(b"\x1b[31m".to_vec()));
        assert_eq!(ti.emit_set_color_fg_16(9), Some(b"\x1b[91m".to_vec()));
        assert_eq!(ti.emit_set_color_fg_16(16), None);
    }

    #[test]
    fn bad_templates_leave_the_previous_one_installed() {
        let mut ti = demo();
        assert!(ti.set_seq(SeqKind::CursorToPos, "\x1b[%2;%1;%3H").is_err());
        assert!(ti.set_seq(SeqKind::CursorToPos, "\x1b[%").is_err());
        assert_eq!(ti.emit_cursor_to_pos(1, 2), Some(b"\x1b[3;2H".to_vec()));
        ti.set_seq(SeqKind::CursorToPos, "").unwrap();
        assert_eq!(ti.emit_cursor_to_pos(1, 2), None);
    }

    #[test]
    fn templates_must_reference_every_argument() {
        let mut ti = TermInfo::new("gap");
        // %2 twice, %1 never: a typo, not a two-argument template.
        assert!(ti.set_seq(SeqKind::CursorToPos, "\x1b[%2;%2H").is_err());
        assert!(!ti.have_seq(SeqKind::CursorToPos));
        assert!(ti.set_seq(SeqKind::CursorToPos, "\x1b[%2;%1H").is_ok());
    }

    #[test]
    fn parse_reports_success_failure_and_again() {
        let ti = demo();
        match ti.parse_seq(SeqKind::CursorToPos, b"\x1b[24;80Hrest") {
            ParseResult::Success { args, consumed } => {
                assert_eq!(args, vec![80, 24]);
                assert_eq!(consumed, 8);
            }
            other => panic!("{other:?}"),
        }
        assert_eq!(ti.parse_seq(SeqKind::CursorToPos, b"\x1b[24"), ParseResult::Again);
        assert_eq!(ti.parse_seq(SeqKind::CursorToPos, b"\x1bX"), ParseResult::Failure);
        assert_eq!(
            ti.parse_seq(SeqKind::CursorToPos, b"\x1b[;1H"),
            ParseResult::Failure
        );
    }

    #[test]
    fn supplement_fills_only_gaps() {
        let mut a = TermInfo::new("a");
        a.set_seq(SeqKind::Clear, "\x1b[2J").unwrap();
        let mut b = TermInfo::new("b");
        b.set_seq(SeqKind::Clear, "CLEAR").unwrap();
        b.set_seq(SeqKind::ResetAttributes, "\x1b[0m").unwrap();
        a.supplement(&b);
        assert_eq!(a.emit_clear(), Some(b"\x1b[2J".to_vec()));
        assert!(a.have_seq(SeqKind::ResetAttributes));
    }
}
