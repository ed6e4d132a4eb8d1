//! Shape-category tags for candidate symbols.
//!
//! Every selectable code point carries a tag bitmask; selectors address
//! symbols by tag name. `ALL` deliberately excludes `EXTRA` and `BAD`.

/// Bitmask of shape categories a symbol belongs to.
///
/// # Example
/// ```
/// use gg_symbols::tags::SymbolTags;
/// let t = SymbolTags::BLOCK | SymbolTags::QUAD;
/// assert!(t.intersects(SymbolTags::QUAD));
/// assert!(!SymbolTags::ALL.intersects(SymbolTags::EXTRA));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolTags(pub u32);

impl SymbolTags {
    /// Empty set.
    pub const NONE: SymbolTags = SymbolTags(0);
    /// The space character.
    pub const SPACE: SymbolTags = SymbolTags(1 << 0);
    /// Fully inked block.
    pub const SOLID: SymbolTags = SymbolTags(1 << 1);
    /// Stipple/shade patterns.
    pub const STIPPLE: SymbolTags = SymbolTags(1 << 2);
    /// Block elements.
    pub const BLOCK: SymbolTags = SymbolTags(1 << 3);
    /// Box-drawing borders.
    pub const BORDER: SymbolTags = SymbolTags(1 << 4);
    /// Diagonal lines and wedges.
    pub const DIAGONAL: SymbolTags = SymbolTags(1 << 5);
    /// Dots and bullets.
    pub const DOT: SymbolTags = SymbolTags(1 << 6);
    /// 2x2 quadrant blocks.
    pub const QUAD: SymbolTags = SymbolTags(1 << 7);
    /// Halves split by a horizontal line.
    pub const HHALF: SymbolTags = SymbolTags(1 << 8);
    /// Halves split by a vertical line.
    pub const VHALF: SymbolTags = SymbolTags(1 << 9);
    /// Any half block.
    pub const HALF: SymbolTags = SymbolTags(Self::HHALF.0 | Self::VHALF.0);
    /// Inverse-video variants.
    pub const INVERTED: SymbolTags = SymbolTags(1 << 10);
    /// Braille patterns.
    pub const BRAILLE: SymbolTags = SymbolTags(1 << 11);
    /// Technical symbols.
    pub const TECHNICAL: SymbolTags = SymbolTags(1 << 12);
    /// Geometric shapes.
    pub const GEOMETRIC: SymbolTags = SymbolTags(1 << 13);
    /// Printable 7-bit ASCII.
    pub const ASCII: SymbolTags = SymbolTags(1 << 14);
    /// Letters.
    pub const ALPHA: SymbolTags = SymbolTags(1 << 15);
    /// Digits.
    pub const DIGIT: SymbolTags = SymbolTags(1 << 16);
    /// Letters and digits.
    pub const ALNUM: SymbolTags = SymbolTags(Self::ALPHA.0 | Self::DIGIT.0);
    /// Single-cell symbols.
    pub const NARROW: SymbolTags = SymbolTags(1 << 17);
    /// Double-cell symbols.
    pub const WIDE: SymbolTags = SymbolTags(1 << 18);
    /// Ambiguous-width symbols.
    pub const AMBIGUOUS: SymbolTags = SymbolTags(1 << 19);
    /// Symbols that render badly in common fonts.
    pub const UGLY: SymbolTags = SymbolTags(1 << 20);
    /// Legacy computing symbols.
    pub const LEGACY: SymbolTags = SymbolTags(1 << 21);
    /// 2x3 sextant blocks.
    pub const SEXTANT: SymbolTags = SymbolTags(1 << 22);
    /// Wedge/triangle shapes.
    pub const WEDGE: SymbolTags = SymbolTags(1 << 23);
    /// Latin letters beyond ASCII.
    pub const LATIN: SymbolTags = SymbolTags(1 << 24);
    /// Caller-registered glyphs.
    pub const IMPORTED: SymbolTags = SymbolTags(1 << 25);
    /// 2x4 octant blocks.
    pub const OCTANT: SymbolTags = SymbolTags(1 << 26);
    /// Never selected implicitly.
    pub const EXTRA: SymbolTags = SymbolTags(1 << 30);
    /// Ambiguous or ugly.
    pub const BAD: SymbolTags = SymbolTags(Self::AMBIGUOUS.0 | Self::UGLY.0);
    /// Everything except `EXTRA` and `BAD`.
    pub const ALL: SymbolTags = SymbolTags(!(Self::EXTRA.0 | Self::BAD.0));

    /// Whether any bit is shared with `other`.
    #[inline(always)]
    #[must_use]
    pub const fn intersects(self, other: SymbolTags) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every bit of `other` is set.
    #[inline(always)]
    #[must_use]
    pub const fn contains(self, other: SymbolTags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses one selector tag name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<SymbolTags> {
        Some(match name {
            "none" => Self::NONE,
            "space" => Self::SPACE,
            "solid" => Self::SOLID,
            "stipple" => Self::STIPPLE,
            "block" => Self::BLOCK,
            "border" => Self::BORDER,
            "diagonal" => Self::DIAGONAL,
            "dot" => Self::DOT,
            "quad" => Self::QUAD,
            "hhalf" => Self::HHALF,
            "vhalf" => Self::VHALF,
            "half" => Self::HALF,
            "inverted" => Self::INVERTED,
            "braille" => Self::BRAILLE,
            "technical" => Self::TECHNICAL,
            "geometric" => Self::GEOMETRIC,
            "ascii" => Self::ASCII,
            "alpha" => Self::ALPHA,
            "digit" => Self::DIGIT,
            "alnum" => Self::ALNUM,
            "narrow" => Self::NARROW,
            "wide" => Self::WIDE,
            "ambiguous" => Self::AMBIGUOUS,
            "ugly" => Self::UGLY,
            "legacy" => Self::LEGACY,
            "sextant" => Self::SEXTANT,
            "wedge" => Self::WEDGE,
            "latin" => Self::LATIN,
            "imported" => Self::IMPORTED,
            "octant" => Self::OCTANT,
            "extra" => Self::EXTRA,
            "bad" => Self::BAD,
            "all" => Self::ALL,
            _ => return None,
        })
    }
}

impl std::ops::BitOr for SymbolTags {
    type Output = SymbolTags;
    fn bitor(self, rhs: SymbolTags) -> SymbolTags {
        SymbolTags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SymbolTags {
    fn bitor_assign(&mut self, rhs: SymbolTags) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_excludes_extra_and_bad() {
        assert!(!SymbolTags::ALL.intersects(SymbolTags::EXTRA));
        assert!(!SymbolTags::ALL.intersects(SymbolTags::UGLY));
        assert!(!SymbolTags::ALL.intersects(SymbolTags::AMBIGUOUS));
        assert!(SymbolTags::ALL.contains(SymbolTags::BLOCK | SymbolTags::BRAILLE));
    }

    #[test]
    fn names_round_trip_for_selector_grammar() {
        for name in [
            "space", "solid", "block", "border", "diagonal", "dot", "quad", "half", "braille",
            "technical", "geometric", "ascii", "extra", "all", "none", "sextant", "wedge",
        ] {
            assert!(SymbolTags::from_name(name).is_some(), "{name}");
        }
        assert!(SymbolTags::from_name("blocc").is_none());
        assert!(SymbolTags::from_name("").is_none());
    }
}
