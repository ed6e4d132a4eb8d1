//! The catalog of terminal control sequences.
//!
//! Every sequence a terminal record can carry is one [`SeqKind`]. The
//! ordinals are stable and contiguous so records can store templates in
//! a flat array.

/// Number of sequence kinds.
pub const SEQ_COUNT: usize = 146;

/// Longest formatted sequence, in bytes.
pub const SEQ_LENGTH_MAX: usize = 96;

/// Most positional arguments a single sequence template may take.
pub const SEQ_ARGS_MAX: usize = 24;

macro_rules! seq_kinds {
    ($($(#[$meta:meta])* $name:ident = $val:literal),+ $(,)?) => {
        /// One kind of terminal control sequence.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum SeqKind {
            $($(#[$meta])* $name = $val),+
        }

        impl SeqKind {
            /// Every kind, in ordinal order.
            pub const ALL: [SeqKind; SEQ_COUNT] = [$(SeqKind::$name),+];
        }
    };
}

seq_kinds! {
    ResetTerminalSoft = 0,
    ResetTerminalHard = 1,
    ResetAttributes = 2,
    Clear = 3,
    InvertColors = 4,
    CursorToTopLeft = 5,
    CursorToBottomLeft = 6,
    /// Args: column, row (0-based at the call site, 1-based on the wire).
    CursorToPos = 7,
    CursorUp1 = 8,
    CursorUp = 9,
    CursorDown1 = 10,
    CursorDown = 11,
    CursorLeft1 = 12,
    CursorLeft = 13,
    CursorRight1 = 14,
    CursorRight = 15,
    CursorUpScroll = 16,
    CursorDownScroll = 17,
    InsertCells = 18,
    DeleteCells = 19,
    InsertRows = 20,
    DeleteRows = 21,
    SetScrollingRows = 22,
    EnableInsert = 23,
    DisableInsert = 24,
    EnableCursor = 25,
    DisableCursor = 26,
    EnableEcho = 27,
    DisableEcho = 28,
    EnableWrap = 29,
    DisableWrap = 30,
    SetColorFgDirect = 31,
    SetColorBgDirect = 32,
    SetColorFgbgDirect = 33,
    SetColorFg256 = 34,
    SetColorBg256 = 35,
    SetColorFgbg256 = 36,
    /// Takes the raw SGR parameter; pens are mapped by the emit helper.
    SetColorFg16 = 37,
    SetColorBg16 = 38,
    SetColorFgbg16 = 39,
    BeginSixels = 40,
    EndSixels = 41,
    RepeatChar = 42,
    BeginKittyImmediateImageV1 = 43,
    EndKittyImage = 44,
    BeginKittyImageChunk = 45,
    EndKittyImageChunk = 46,
    BeginIterm2Image = 47,
    EndIterm2Image = 48,
    EnableSixelScrolling = 49,
    DisableSixelScrolling = 50,
    EnableBold = 51,
    SetColorFg8 = 52,
    SetColorBg8 = 53,
    SetColorFgbg8 = 54,
    ResetDefaultFg = 55,
    SetDefaultFg = 56,
    QueryDefaultFg = 57,
    ResetDefaultBg = 58,
    SetDefaultBg = 59,
    QueryDefaultBg = 60,
    ReturnKey = 61,
    BackspaceKey = 62,
    TabKey = 63,
    TabShiftKey = 64,
    UpKey = 65,
    UpCtrlKey = 66,
    UpShiftKey = 67,
    DownKey = 68,
    DownCtrlKey = 69,
    DownShiftKey = 70,
    LeftKey = 71,
    LeftCtrlKey = 72,
    LeftShiftKey = 73,
    RightKey = 74,
    RightCtrlKey = 75,
    RightShiftKey = 76,
    PageUpKey = 77,
    PageUpCtrlKey = 78,
    PageUpShiftKey = 79,
    PageDownKey = 80,
    PageDownCtrlKey = 81,
    PageDownShiftKey = 82,
    HomeKey = 83,
    HomeCtrlKey = 84,
    HomeShiftKey = 85,
    EndKey = 86,
    EndCtrlKey = 87,
    EndShiftKey = 88,
    InsertKey = 89,
    InsertCtrlKey = 90,
    InsertShiftKey = 91,
    DeleteKey = 92,
    DeleteCtrlKey = 93,
    DeleteShiftKey = 94,
    F1Key = 95,
    F1CtrlKey = 96,
    F1ShiftKey = 97,
    F2Key = 98,
    F2CtrlKey = 99,
    F2ShiftKey = 100,
    F3Key = 101,
    F3CtrlKey = 102,
    F3ShiftKey = 103,
    F4Key = 104,
    F4CtrlKey = 105,
    F4ShiftKey = 106,
    F5Key = 107,
    F5CtrlKey = 108,
    F5ShiftKey = 109,
    F6Key = 110,
    F6CtrlKey = 111,
    F6ShiftKey = 112,
    F7Key = 113,
    F7CtrlKey = 114,
    F7ShiftKey = 115,
    F8Key = 116,
    F8CtrlKey = 117,
    F8ShiftKey = 118,
    F9Key = 119,
    F9CtrlKey = 120,
    F9ShiftKey = 121,
    F10Key = 122,
    F10CtrlKey = 123,
    F10ShiftKey = 124,
    F11Key = 125,
    F11CtrlKey = 126,
    F11ShiftKey = 127,
    F12Key = 128,
    F12CtrlKey = 129,
    F12ShiftKey = 130,
    ResetColorFg = 131,
    ResetColorBg = 132,
    ResetColorFgbg = 133,
    ResetScrollingRows = 134,
    SaveCursorPos = 135,
    RestoreCursorPos = 136,
    SetSixelAdvanceDown = 137,
    SetSixelAdvanceRight = 138,
    EnableAltScreen = 139,
    DisableAltScreen = 140,
    BeginScreenPassthrough = 141,
    EndScreenPassthrough = 142,
    BeginTmuxPassthrough = 143,
    EndTmuxPassthrough = 144,
    BeginKittyImmediateVirtImageV1 = 145,
}

impl SeqKind {
    /// Ordinal used to index flat per-record tables.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`SeqKind::index`].
    #[must_use]
    pub fn from_index(i: usize) -> Option<SeqKind> {
        SeqKind::ALL.get(i).copied()
    }

    /// Number of positional arguments this kind's templates must take.
    #[must_use]
    pub const fn n_args(self) -> usize {
        match self {
            SeqKind::CursorUp
            | SeqKind::CursorDown
            | SeqKind::CursorLeft
            | SeqKind::CursorRight
            | SeqKind::InsertCells
            | SeqKind::DeleteCells
            | SeqKind::InsertRows
            | SeqKind::DeleteRows
            | SeqKind::SetColorFg256
            | SeqKind::SetColorBg256
            | SeqKind::SetColorFg16
            | SeqKind::SetColorBg16
            | SeqKind::SetColorFg8
            | SeqKind::SetColorBg8
            | SeqKind::RepeatChar => 1,
            SeqKind::CursorToPos
            | SeqKind::SetScrollingRows
            | SeqKind::SetColorFgbg256
            | SeqKind::SetColorFgbg16
            | SeqKind::SetColorFgbg8
            | SeqKind::BeginIterm2Image => 2,
            SeqKind::SetColorFgDirect
            | SeqKind::SetColorBgDirect
            | SeqKind::BeginSixels
            | SeqKind::SetDefaultFg
            | SeqKind::SetDefaultBg => 3,
            SeqKind::BeginKittyImmediateImageV1 | SeqKind::BeginKittyImmediateVirtImageV1 => 5,
            SeqKind::SetColorFgbgDirect => 6,
            _ => 0,
        }
    }
}

/// Outcome of matching input bytes against a sequence template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// The input begins with the sequence; `consumed` bytes were used.
    Success {
        /// Extracted positional arguments, in template order.
        args: Vec<u32>,
        /// Bytes of input covered by the match.
        consumed: usize,
    },
    /// The input cannot begin with this sequence.
    Failure,
    /// The input is a prefix of the sequence; more bytes are needed.
    Again,
}

/// Known misbehaviors to compensate for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermQuirks(pub u32);

impl TermQuirks {
    /// No quirks.
    pub const NONE: TermQuirks = TermQuirks(0);
    /// Sixel image height is rounded up to a multiple of 6 rows.
    pub const SIXEL_OVERSHOOT: TermQuirks = TermQuirks(1 << 0);

    /// Whether any bit of `other` is set.
    #[inline(always)]
    #[must_use]
    pub const fn contains(self, other: TermQuirks) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for TermQuirks {
    type Output = TermQuirks;
    fn bitor(self, rhs: TermQuirks) -> TermQuirks {
        TermQuirks(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for TermQuirks {
    fn bitor_assign(&mut self, rhs: TermQuirks) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_contiguous_and_stable() {
        assert_eq!(SeqKind::ALL.len(), SEQ_COUNT);
        for (i, k) in SeqKind::ALL.iter().enumerate() {
            assert_eq!(k.index(), i);
            assert_eq!(SeqKind::from_index(i), Some(*k));
        }
        assert_eq!(SeqKind::from_index(SEQ_COUNT), None);
        assert_eq!(SeqKind::BeginKittyImmediateVirtImageV1.index(), 145);
    }

    #[test]
    fn arg_counts_match_sequence_shape() {
        assert_eq!(SeqKind::CursorToPos.n_args(), 2);
        assert_eq!(SeqKind::SetColorFgbgDirect.n_args(), 6);
        assert_eq!(SeqKind::BeginKittyImmediateImageV1.n_args(), 5);
        assert_eq!(SeqKind::ResetAttributes.n_args(), 0);
    }
}
