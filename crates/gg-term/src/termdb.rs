//! Built-in terminal database and environment detection.
//!
//! [`TermDb::detect`] inspects `TERM`, `COLORTERM` and friends and
//! assembles a [`TermInfo`] from layered capability blocks: a VT/xterm
//! base, 256-color and direct-color extensions, pixel image protocols,
//! and multiplexer passthrough. All layering happens here, at
//! construction; the resulting record needs no fallback chasing at emit
//! time.

use std::collections::HashMap;

use gg_core::config::{CanvasMode, PixelMode};
use gg_symbols::tags::SymbolTags;

use crate::seq::{SeqKind, TermQuirks};
use crate::terminfo::TermInfo;

fn set(ti: &mut TermInfo, kind: SeqKind, template: &str) {
    if let Err(e) = ti.set_seq(kind, template) {
        log::error!("builtin template rejected: {e}");
    }
}

fn add_keys(ti: &mut TermInfo) {
    set(ti, SeqKind::ReturnKey, "\r");
    set(ti, SeqKind::BackspaceKey, "\x7f");
    set(ti, SeqKind::TabKey, "\t");
    set(ti, SeqKind::TabShiftKey, "\x1b[Z");

    // Arrows: plain, ctrl and shift variants share the final letter.
    let arrows = [
        (SeqKind::UpKey, 'A'),
        (SeqKind::DownKey, 'B'),
        (SeqKind::LeftKey, 'D'),
        (SeqKind::RightKey, 'C'),
    ];
    for (kind, letter) in arrows {
        set(ti, kind, &format!("\x1b[{letter}"));
        if let Some(ctrl) = SeqKind::from_index(kind.index() + 1) {
            set(ti, ctrl, &format!("\x1b[1;5{letter}"));
        }
        if let Some(shift) = SeqKind::from_index(kind.index() + 2) {
            set(ti, shift, &format!("\x1b[1;2{letter}"));
        }
    }

    // Edit pad: CSI n ~ with the usual modifier parameters.
    let edit = [
        (SeqKind::InsertKey, 2),
        (SeqKind::DeleteKey, 3),
        (SeqKind::PageUpKey, 5),
        (SeqKind::PageDownKey, 6),
    ];
    for (kind, code) in edit {
        set(ti, kind, &format!("\x1b[{code}~"));
        if let Some(ctrl) = SeqKind::from_index(kind.index() + 1) {
            set(ti, ctrl, &format!("\x1b[{code};5~"));
        }
        if let Some(shift) = SeqKind::from_index(kind.index() + 2) {
            set(ti, shift, &format!("\x1b[{code};2~"));
        }
    }

    for (kind, letter) in [(SeqKind::HomeKey, 'H'), (SeqKind::EndKey, 'F')] {
        set(ti, kind, &format!("\x1b[{letter}"));
        if let Some(ctrl) = SeqKind::from_index(kind.index() + 1) {
            set(ti, ctrl, &format!("\x1b[1;5{letter}"));
        }
        if let Some(shift) = SeqKind::from_index(kind.index() + 2) {
            set(ti, shift, &format!("\x1b[1;2{letter}"));
        }
    }

    // F1..F4 are SS3, F5..F12 CSI with fixed codes.
    for (n, letter) in ['P', 'Q', 'R', 'S'].into_iter().enumerate() {
        let base = SeqKind::F1Key.index() + n * 3;
        if let Some(kind) = SeqKind::from_index(base) {
            set(ti, kind, &format!("\x1bO{letter}"));
        }
        if let Some(ctrl) = SeqKind::from_index(base + 1) {
            set(ti, ctrl, &format!("\x1b[1;5{letter}"));
        }
        if let Some(shift) = SeqKind::from_index(base + 2) {
            set(ti, shift, &format!("\x1b[1;2{letter}"));
        }
    }
    for (n, code) in [15, 17, 18, 19, 20, 21, 23, 24].into_iter().enumerate() {
        let base = SeqKind::F5Key.index() + n * 3;
        if let Some(kind) = SeqKind::from_index(base) {
            set(ti, kind, &format!("\x1b[{code}~"));
        }
        if let Some(ctrl) = SeqKind::from_index(base + 1) {
            set(ti, ctrl, &format!("\x1b[{code};5~"));
        }
        if let Some(shift) = SeqKind::from_index(base + 2) {
            set(ti, shift, &format!("\x1b[{code};2~"));
        }
    }
}

/// VT/xterm base block: motion, attributes, 8/16 colors, keys.
fn base_ansi(name: &str) -> TermInfo {
    let mut ti = TermInfo::new(name);

    set(&mut ti, SeqKind::ResetTerminalSoft, "\x1b[!p");
    set(&mut ti, SeqKind::ResetTerminalHard, "\x1bc");
    set(&mut ti, SeqKind::ResetAttributes, "\x1b[0m");
    set(&mut ti, SeqKind::Clear, "\x1b[2J");
    set(&mut ti, SeqKind::InvertColors, "\x1b[7m");
    set(&mut ti, SeqKind::EnableBold, "\x1b[1m");

    set(&mut ti, SeqKind::CursorToTopLeft, "\x1b[H");
    set(&mut ti, SeqKind::CursorToBottomLeft, "\x1b[9999;1H");
    set(&mut ti, SeqKind::CursorToPos, "\x1b[%2;%1H");
    set(&mut ti, SeqKind::CursorUp1, "\x1b[A");
    set(&mut ti, SeqKind::CursorUp, "\x1b[%1A");
    set(&mut ti, SeqKind::CursorDown1, "\x1b[B");
    set(&mut ti, SeqKind::CursorDown, "\x1b[%1B");
    set(&mut ti, SeqKind::CursorLeft1, "\x1b[D");
    set(&mut ti, SeqKind::CursorLeft, "\x1b[%1D");
    set(&mut ti, SeqKind::CursorRight1, "\x1b[C");
    set(&mut ti, SeqKind::CursorRight, "\x1b[%1C");
    set(&mut ti, SeqKind::CursorUpScroll, "\x1bM");
    set(&mut ti, SeqKind::CursorDownScroll, "\x1bD");
    set(&mut ti, SeqKind::InsertCells, "\x1b[%1@");
    set(&mut ti, SeqKind::DeleteCells, "\x1b[%1P");
    set(&mut ti, SeqKind::InsertRows, "\x1b[%1L");
    set(&mut ti, SeqKind::DeleteRows, "\x1b[%1M");
    set(&mut ti, SeqKind::SetScrollingRows, "\x1b[%1;%2r");
    set(&mut ti, SeqKind::ResetScrollingRows, "\x1b[r");
    set(&mut ti, SeqKind::SaveCursorPos, "\x1b[s");
    set(&mut ti, SeqKind::RestoreCursorPos, "\x1b[u");
    set(&mut ti, SeqKind::RepeatChar, "\x1b[%1b");

    set(&mut ti, SeqKind::EnableInsert, "\x1b[4h");
    set(&mut ti, SeqKind::DisableInsert, "\x1b[4l");
    set(&mut ti, SeqKind::EnableCursor, "\x1b[?25h");
    set(&mut ti, SeqKind::DisableCursor, "\x1b[?25l");
    set(&mut ti, SeqKind::EnableEcho, "\x1b[12l");
    set(&mut ti, SeqKind::DisableEcho, "\x1b[12h");
    set(&mut ti, SeqKind::EnableWrap, "\x1b[?7h");
    set(&mut ti, SeqKind::DisableWrap, "\x1b[?7l");
    set(&mut ti, SeqKind::EnableAltScreen, "\x1b[?1049h");
    set(&mut ti, SeqKind::DisableAltScreen, "\x1b[?1049l");

    // Templates carry the raw SGR parameter; pen mapping is done by the
    // typed emit helpers.
    set(&mut ti, SeqKind::SetColorFg8, "\x1b[%1m");
    set(&mut ti, SeqKind::SetColorBg8, "\x1b[%1m");
    set(&mut ti, SeqKind::SetColorFgbg8, "\x1b[%1;%2m");
    set(&mut ti, SeqKind::SetColorFg16, "\x1b[%1m");
    set(&mut ti, SeqKind::SetColorBg16, "\x1b[%1m");
    set(&mut ti, SeqKind::SetColorFgbg16, "\x1b[%1;%2m");
    set(&mut ti, SeqKind::ResetColorFg, "\x1b[39m");
    set(&mut ti, SeqKind::ResetColorBg, "\x1b[49m");
    set(&mut ti, SeqKind::ResetColorFgbg, "\x1b[39;49m");
    set(&mut ti, SeqKind::QueryDefaultFg, "\x1b]10;?\x1b\\");
    set(&mut ti, SeqKind::QueryDefaultBg, "\x1b]11;?\x1b\\");

    add_keys(&mut ti);
    ti
}

fn add_256(ti: &mut TermInfo) {
    set(ti, SeqKind::SetColorFg256, "\x1b[38;5;%1m");
    set(ti, SeqKind::SetColorBg256, "\x1b[48;5;%1m");
    set(ti, SeqKind::SetColorFgbg256, "\x1b[38;5;%1;48;5;%2m");
}

fn add_direct(ti: &mut TermInfo) {
    set(ti, SeqKind::SetColorFgDirect, "\x1b[38;2;%1;%2;%3m");
    set(ti, SeqKind::SetColorBgDirect, "\x1b[48;2;%1;%2;%3m");
    set(
        ti,
        SeqKind::SetColorFgbgDirect,
        "\x1b[38;2;%1;%2;%3;48;2;%4;%5;%6m",
    );
}

fn add_sixel(ti: &mut TermInfo) {
    set(ti, SeqKind::BeginSixels, "\x1bP%1;%2;%3q");
    set(ti, SeqKind::EndSixels, "\x1b\\");
    set(ti, SeqKind::EnableSixelScrolling, "\x1b[?80h");
    set(ti, SeqKind::DisableSixelScrolling, "\x1b[?80l");
    set(ti, SeqKind::SetSixelAdvanceDown, "\x1b[?8452l");
    set(ti, SeqKind::SetSixelAdvanceRight, "\x1b[?8452h");
}

fn add_kitty(ti: &mut TermInfo) {
    set(
        ti,
        SeqKind::BeginKittyImmediateImageV1,
        "\x1b_Ga=T,q=2,f=%1,s=%2,v=%3,c=%4,r=%5,m=1\x1b\\",
    );
    set(
        ti,
        SeqKind::BeginKittyImmediateVirtImageV1,
        "\x1b_Ga=T,q=2,U=1,f=%1,s=%2,v=%3,c=%4,r=%5,m=1\x1b\\",
    );
    set(ti, SeqKind::BeginKittyImageChunk, "\x1b_Gm=1;");
    set(ti, SeqKind::EndKittyImageChunk, "\x1b\\");
    set(ti, SeqKind::EndKittyImage, "\x1b_Gm=0;\x1b\\");
}

fn add_iterm2(ti: &mut TermInfo) {
    set(
        ti,
        SeqKind::BeginIterm2Image,
        "\x1b]1337;File=inline=1;width=%1;height=%2;preserveAspectRatio=0:",
    );
    set(ti, SeqKind::EndIterm2Image, "\x07");
}

fn add_tmux_passthrough(ti: &mut TermInfo) {
    set(ti, SeqKind::BeginTmuxPassthrough, "\x1bPtmux;");
    set(ti, SeqKind::EndTmuxPassthrough, "\x1b\\");
    for mode in [PixelMode::Sixels, PixelMode::Kitty, PixelMode::Iterm2] {
        ti.set_pixel_passthrough_needed(mode, true);
    }
}

fn add_screen_passthrough(ti: &mut TermInfo) {
    set(ti, SeqKind::BeginScreenPassthrough, "\x1bP");
    set(ti, SeqKind::EndScreenPassthrough, "\x1b\\");
    for mode in [PixelMode::Sixels, PixelMode::Kitty, PixelMode::Iterm2] {
        ti.set_pixel_passthrough_needed(mode, true);
    }
}

/// The Linux console renders only a small glyph set and 8 colors.
fn linux_console() -> TermInfo {
    let mut ti = base_ansi("linux");
    for kind in [SeqKind::SetColorFg16, SeqKind::SetColorBg16, SeqKind::SetColorFgbg16] {
        set(&mut ti, kind, "");
    }
    ti.set_safe_symbol_tags(
        SymbolTags::SPACE
            | SymbolTags::SOLID
            | SymbolTags::HALF
            | SymbolTags::STIPPLE
            | SymbolTags::BLOCK
            | SymbolTags::BORDER
            | SymbolTags::ASCII
            | SymbolTags::ALNUM,
    );
    ti
}

/// The built-in terminal database.
#[derive(Clone, Copy, Debug, Default)]
pub struct TermDb;

impl TermDb {
    /// A database handle. Stateless; records are built on demand.
    #[must_use]
    pub fn new() -> Self {
        TermDb
    }

    /// A conservative record for unknown terminals: xterm base plus
    /// 256-color, no image protocols.
    #[must_use]
    pub fn fallback_info(&self) -> TermInfo {
        let mut ti = base_ansi("fallback");
        add_256(&mut ti);
        ti
    }

    /// Builds a record from environment variables.
    ///
    /// # Example
    /// ```
    /// use gg_term::termdb::TermDb;
    ///
    /// let env = [("TERM".to_owned(), "xterm-256color".to_owned())];
    /// let ti = TermDb::new().detect(env);
    /// assert!(ti.emit_set_color_fg_256(196).is_some());
    /// ```
    #[must_use]
    pub fn detect<I>(&self, env: I) -> TermInfo
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: HashMap<String, String> = env.into_iter().collect();
        let get = |k: &str| env.get(k).map(String::as_str).unwrap_or("");

        let term = get("TERM");
        if term.is_empty() {
            log::debug!("TERM unset, using fallback record");
            return self.fallback_info();
        }
        if term == "linux" {
            return linux_console();
        }

        let mut ti = base_ansi(term);

        if term.contains("256color") || term.contains("direct") {
            add_256(&mut ti);
        }
        let colorterm = get("COLORTERM");
        if colorterm == "truecolor" || colorterm == "24bit" || term.contains("direct") {
            add_256(&mut ti);
            add_direct(&mut ti);
        }

        if term == "xterm-kitty" || term.contains("kitty") || !get("KITTY_WINDOW_ID").is_empty() {
            add_256(&mut ti);
            add_direct(&mut ti);
            add_kitty(&mut ti);
        }
        if get("TERM_PROGRAM") == "iTerm.app" || get("LC_TERMINAL") == "iTerm2" {
            add_256(&mut ti);
            add_direct(&mut ti);
            add_iterm2(&mut ti);
        }
        if get("TERM_PROGRAM") == "WezTerm" || term.starts_with("wezterm") {
            add_256(&mut ti);
            add_direct(&mut ti);
            add_sixel(&mut ti);
            add_iterm2(&mut ti);
        }
        if term.contains("sixel") || term.starts_with("foot") || term.starts_with("mlterm") {
            add_256(&mut ti);
            add_sixel(&mut ti);
            if term.starts_with("mlterm") {
                ti.add_quirks(TermQuirks::SIXEL_OVERSHOOT);
            }
        }

        if !get("TMUX").is_empty() || term.starts_with("tmux") {
            add_tmux_passthrough(&mut ti);
        } else if term.starts_with("screen") || !get("STY").is_empty() {
            add_screen_passthrough(&mut ti);
        }

        ti
    }
}

impl TermInfo {
    /// The richest canvas mode this record's color sequences support.
    #[must_use]
    pub fn best_canvas_mode(&self) -> CanvasMode {
        if self.have_seq(SeqKind::SetColorFgbgDirect) {
            CanvasMode::Truecolor
        } else if self.have_seq(SeqKind::SetColorFgbg256) {
            CanvasMode::Indexed256
        } else if self.have_seq(SeqKind::SetColorFgbg16) {
            CanvasMode::Indexed16
        } else if self.have_seq(SeqKind::SetColorFgbg8) {
            CanvasMode::Indexed8
        } else if self.have_seq(SeqKind::InvertColors) {
            CanvasMode::FgBgBgFg
        } else {
            CanvasMode::FgBg
        }
    }

    /// The richest pixel mode this record can drive.
    #[must_use]
    pub fn best_pixel_mode(&self) -> PixelMode {
        if self.have_seq(SeqKind::BeginKittyImmediateImageV1) {
            PixelMode::Kitty
        } else if self.have_seq(SeqKind::BeginSixels) {
            PixelMode::Sixels
        } else if self.have_seq(SeqKind::BeginIterm2Image) {
            PixelMode::Iterm2
        } else {
            PixelMode::Symbols
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn xterm_256color_gets_indexed_256() {
        let ti = TermDb::new().detect(env(&[("TERM", "xterm-256color")]));
        assert_eq!(ti.best_canvas_mode(), CanvasMode::Indexed256);
        assert_eq!(ti.best_pixel_mode(), PixelMode::Symbols);
        assert_eq!(
            ti.emit_set_color_fg_256(196),
            Some(b"\x1b[38;5;196m".to_vec())
        );
    }

    #[test]
    fn colorterm_promotes_to_truecolor() {
        let ti = TermDb::new().detect(env(&[
            ("TERM", "xterm-256color"),
            ("COLORTERM", "truecolor"),
        ]));
        assert_eq!(ti.best_canvas_mode(), CanvasMode::Truecolor);
    }

    #[test]
    fn kitty_is_detected_by_term_or_window_id() {
        let ti = TermDb::new().detect(env(&[("TERM", "xterm-kitty")]));
        assert_eq!(ti.best_pixel_mode(), PixelMode::Kitty);
        assert_eq!(ti.best_canvas_mode(), CanvasMode::Truecolor);

        let ti = TermDb::new().detect(env(&[
            ("TERM", "xterm-256color"),
            ("KITTY_WINDOW_ID", "1"),
        ]));
        assert_eq!(ti.best_pixel_mode(), PixelMode::Kitty);
    }

    #[test]
    fn tmux_marks_pixel_modes_for_passthrough() {
        let ti = TermDb::new().detect(env(&[
            ("TERM", "tmux-256color"),
            ("TMUX", "/tmp/tmux-0/default,123,0"),
        ]));
        assert!(ti.pixel_passthrough_needed(PixelMode::Sixels));
        assert!(!ti.pixel_passthrough_needed(PixelMode::Symbols));
        assert!(ti.have_seq(SeqKind::BeginTmuxPassthrough));
    }

    #[test]
    fn linux_console_is_restricted() {
        let ti = TermDb::new().detect(env(&[("TERM", "linux")]));
        assert_eq!(ti.best_canvas_mode(), CanvasMode::Indexed8);
        assert!(!ti.safe_symbol_tags().intersects(SymbolTags::BRAILLE));
        assert!(ti.safe_symbol_tags().intersects(SymbolTags::BLOCK));
    }

    #[test]
    fn unknown_term_falls_back() {
        let ti = TermDb::new().detect(Vec::new());
        assert_eq!(ti.name(), "fallback");
        assert_eq!(ti.best_canvas_mode(), CanvasMode::Indexed256);
    }

    #[test]
    fn mlterm_gets_the_sixel_overshoot_quirk() {
        let ti = TermDb::new().detect(env(&[("TERM", "mlterm")]));
        assert_eq!(ti.best_pixel_mode(), PixelMode::Sixels);
        assert!(ti.quirks().contains(TermQuirks::SIXEL_OVERSHOOT));
    }
}
