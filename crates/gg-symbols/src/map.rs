//! Symbol selection and the prepared candidate set.
//!
//! A [`SymbolMap`] records which code points the matcher may use, as an
//! ordered list of include/exclude selectors over tags and code point
//! ranges, plus caller-registered glyphs. [`SymbolMap::prepare`] resolves
//! the selectors against the built-in repertoire and the registered
//! glyphs into a flat candidate list with precomputed popcounts.

use std::collections::HashMap;

use gg_core::pixels::PixelType;

use crate::repertoire::{builtin_glyphs, find_builtin};
use crate::tags::SymbolTags;

/// Error raised by symbol selection.
#[derive(Debug, thiserror::Error)]
pub enum SymbolsError {
    /// A selector string failed to parse; the map is unchanged.
    #[error("bad symbol selector: {0}")]
    Selector(String),
    /// A caller-registered glyph had an unusable geometry.
    #[error("glyph for {c:?} must be 8x8 or 16x8, got {width}x{height}")]
    GlyphGeometry {
        /// The code point being registered.
        c: char,
        /// Supplied pixel width.
        width: u32,
        /// Supplied pixel height.
        height: u32,
    },
    /// A glyph buffer was shorter than its geometry requires.
    #[error("glyph buffer too small: need {needed} bytes, got {got}")]
    GlyphBuffer {
        /// Bytes required by width, height and layout.
        needed: usize,
        /// Bytes supplied.
        got: usize,
    },
}

/// A caller-registered glyph bitmap.
#[derive(Clone, Copy, Debug)]
pub struct Glyph {
    /// Tags this glyph carries; always includes `IMPORTED`.
    pub tags: SymbolTags,
    /// Coverage for the cell, plus the right cell for wide glyphs.
    pub bitmaps: [u64; 2],
    /// Whether this glyph spans two cells.
    pub wide: bool,
}

#[derive(Clone, Copy, Debug)]
enum Selector {
    IncludeTags(SymbolTags),
    ExcludeTags(SymbolTags),
    IncludeRange(char, char),
    ExcludeRange(char, char),
}

/// One narrow matching candidate.
#[derive(Clone, Copy, Debug)]
pub struct Symbol {
    /// The code point emitted for this candidate.
    pub c: char,
    /// Shape categories.
    pub tags: SymbolTags,
    /// 8x8 coverage bitmap, bit `y * 8 + x`.
    pub bitmap: u64,
    /// Number of inked pixels.
    pub popcount: u32,
}

/// One wide (two-cell) matching candidate.
#[derive(Clone, Copy, Debug)]
pub struct Symbol2 {
    /// Left cell coverage and metadata.
    pub sym: Symbol,
    /// Right cell coverage bitmap.
    pub bitmap2: u64,
    /// Inked pixels across both cells.
    pub popcount2: u32,
}

/// Resolved candidate set, ready for the matcher.
#[derive(Clone, Debug, Default)]
pub struct PreparedMap {
    /// Single-cell candidates.
    pub symbols: Vec<Symbol>,
    /// Two-cell candidates.
    pub symbols2: Vec<Symbol2>,
}

impl PreparedMap {
    /// Whether no candidate at all survived selection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.symbols2.is_empty()
    }
}

/// Records which symbols the matcher may pick.
///
/// # Example
/// ```
/// use gg_symbols::map::SymbolMap;
/// use gg_symbols::tags::SymbolTags;
///
/// let mut map = SymbolMap::new();
/// map.apply_selectors("block+border-quad").unwrap();
/// let prepared = map.prepare();
/// assert!(prepared.symbols.iter().all(|s| !s.tags.intersects(SymbolTags::QUAD)));
/// ```
#[derive(Clone, Debug)]
pub struct SymbolMap {
    selectors: Vec<Selector>,
    glyphs: HashMap<char, Glyph>,
    allow_builtin: bool,
}

impl Default for SymbolMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolMap {
    /// An empty map. Nothing is selected until a selector is applied.
    #[must_use]
    pub fn new() -> Self {
        SymbolMap {
            selectors: Vec::new(),
            glyphs: HashMap::new(),
            allow_builtin: true,
        }
    }

    /// Selects all symbols tagged with any bit of `tags`.
    pub fn add_by_tags(&mut self, tags: SymbolTags) {
        self.selectors.push(Selector::IncludeTags(tags));
    }

    /// Deselects all symbols tagged with any bit of `tags`.
    pub fn remove_by_tags(&mut self, tags: SymbolTags) {
        self.selectors.push(Selector::ExcludeTags(tags));
    }

    /// Selects every code point in `first..=last` for which a glyph exists.
    pub fn add_by_range(&mut self, first: char, last: char) {
        self.selectors.push(Selector::IncludeRange(first, last));
    }

    /// Deselects every code point in `first..=last`.
    pub fn remove_by_range(&mut self, first: char, last: char) {
        self.selectors.push(Selector::ExcludeRange(first, last));
    }

    /// Applies a selector string like `block+border-quad` or `-dot,stipple`.
    ///
    /// Comma and plus both mean "more of the current operation"; a minus
    /// switches to removal. A string starting with a bare tag name first
    /// clears the map; a leading `+` or `-` edits the current selection.
    /// On any parse error the map is left untouched.
    pub fn apply_selectors(&mut self, selectors: &str) -> Result<(), SymbolsError> {
        let trimmed = selectors.trim();
        let clear_first = !trimmed.starts_with(['+', '-']);
        let mut staged: Vec<Selector> = Vec::new();
        let mut adding = true;
        let mut at_start = true;
        let mut name = String::new();

        let mut flush = |name: &mut String, adding: bool, staged: &mut Vec<Selector>| {
            let tags = SymbolTags::from_name(name)
                .ok_or_else(|| SymbolsError::Selector(format!("unknown tag {name:?}")))?;
            staged.push(if adding {
                Selector::IncludeTags(tags)
            } else {
                Selector::ExcludeTags(tags)
            });
            name.clear();
            Ok(())
        };

        for ch in trimmed.chars() {
            match ch {
                '+' | ',' | '-' => {
                    if name.is_empty() {
                        if !(at_start && ch != ',') {
                            return Err(SymbolsError::Selector(format!(
                                "dangling {ch:?} in {selectors:?}"
                            )));
                        }
                    } else {
                        flush(&mut name, adding, &mut staged)?;
                    }
                    match ch {
                        '-' => adding = false,
                        '+' => adding = true,
                        _ => {}
                    }
                    at_start = false;
                }
                c if c.is_ascii_alphanumeric() => {
                    name.push(c.to_ascii_lowercase());
                    at_start = false;
                }
                c if c.is_whitespace() => {}
                c => {
                    return Err(SymbolsError::Selector(format!(
                        "unexpected {c:?} in {selectors:?}"
                    )));
                }
            }
        }
        if name.is_empty() {
            return Err(SymbolsError::Selector(format!(
                "trailing operator or empty selector in {selectors:?}"
            )));
        }
        flush(&mut name, adding, &mut staged)?;

        if clear_first {
            self.selectors.clear();
        }
        self.selectors.extend(staged);
        Ok(())
    }

    /// Whether built-in glyph bitmaps may be used.
    ///
    /// With this off, only code points registered through
    /// [`SymbolMap::add_glyph`] can be selected.
    pub fn set_allow_builtin_glyphs(&mut self, allow: bool) {
        self.allow_builtin = allow;
    }

    /// Registers a glyph bitmap for `c`, replacing any previous one.
    ///
    /// The pixel data is thresholded to a monochrome coverage bitmap:
    /// layouts with alpha ink where alpha exceeds 127, opaque layouts ink
    /// where the channel average exceeds 127. `width` must be 8 (narrow)
    /// or 16 (wide) and `height` must be 8.
    pub fn add_glyph(
        &mut self,
        c: char,
        pixel_type: PixelType,
        pixels: &[u8],
        width: u32,
        height: u32,
        rowstride: u32,
    ) -> Result<(), SymbolsError> {
        if height != 8 || (width != 8 && width != 16) {
            return Err(SymbolsError::GlyphGeometry { c, width, height });
        }
        let bpp = pixel_type.bytes_per_pixel();
        let rowstride = if rowstride == 0 {
            width as usize * bpp
        } else {
            rowstride as usize
        };
        let needed = rowstride * (height as usize - 1) + width as usize * bpp;
        if pixels.len() < needed {
            return Err(SymbolsError::GlyphBuffer {
                needed,
                got: pixels.len(),
            });
        }

        let wide = width == 16;
        let mut bitmaps = [0u64; 2];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let px = &pixels[y * rowstride + x * bpp..];
                let col = pixel_type.decode(px);
                let ink = if pixel_type.has_alpha() {
                    col.ch[3] > 127
                } else {
                    (u32::from(col.ch[0]) + u32::from(col.ch[1]) + u32::from(col.ch[2])) / 3 > 127
                };
                if ink {
                    bitmaps[x / 8] |= 1 << (y * 8 + x % 8);
                }
            }
        }

        let mut tags = SymbolTags::IMPORTED;
        tags |= if wide {
            SymbolTags::WIDE
        } else {
            SymbolTags::NARROW
        };
        self.glyphs.insert(c, Glyph { tags, bitmaps, wide });
        Ok(())
    }

    /// Returns the registered or built-in coverage bitmap for `c`.
    ///
    /// Wide glyphs report `(left, Some(right))`.
    #[must_use]
    pub fn glyph(&self, c: char) -> Option<(u64, Option<u64>)> {
        if let Some(g) = self.glyphs.get(&c) {
            return Some((g.bitmaps[0], g.wide.then_some(g.bitmaps[1])));
        }
        if self.allow_builtin {
            return find_builtin(c).map(|g| (g.bitmap, None));
        }
        None
    }

    fn tags_for(&self, c: char) -> Option<SymbolTags> {
        if let Some(g) = self.glyphs.get(&c) {
            return Some(g.tags);
        }
        if self.allow_builtin {
            return find_builtin(c).map(|g| g.tags);
        }
        None
    }

    /// Resolves the selectors into a flat candidate list.
    #[must_use]
    pub fn prepare(&self) -> PreparedMap {
        let mut selected: HashMap<char, SymbolTags> = HashMap::new();

        for sel in &self.selectors {
            match *sel {
                Selector::IncludeTags(tags) => {
                    if self.allow_builtin {
                        for g in builtin_glyphs() {
                            if g.tags.intersects(tags) && !self.glyphs.contains_key(&g.c) {
                                selected.insert(g.c, g.tags);
                            }
                        }
                    }
                    for (&c, g) in &self.glyphs {
                        if g.tags.intersects(tags) {
                            selected.insert(c, g.tags);
                        }
                    }
                }
                Selector::ExcludeTags(tags) => {
                    selected.retain(|_, t| !t.intersects(tags));
                }
                Selector::IncludeRange(first, last) => {
                    for cp in first..=last {
                        if let Some(t) = self.tags_for(cp) {
                            selected.insert(cp, t);
                        }
                    }
                }
                Selector::ExcludeRange(first, last) => {
                    selected.retain(|&c, _| c < first || c > last);
                }
            }
        }

        let mut out = PreparedMap::default();
        let mut chars: Vec<char> = selected.keys().copied().collect();
        chars.sort_unstable();
        for c in chars {
            let tags = selected[&c];
            let Some((bitmap, right)) = self.glyph(c) else {
                continue;
            };
            let sym = Symbol {
                c,
                tags,
                bitmap,
                popcount: bitmap.count_ones(),
            };
            match right {
                Some(bitmap2) => out.symbols2.push(Symbol2 {
                    sym,
                    bitmap2,
                    popcount2: sym.popcount + bitmap2.count_ones(),
                }),
                None => out.symbols.push(sym),
            }
        }
        if out.is_empty() {
            log::debug!("symbol map prepared empty; matcher will fall back to space");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_selection_picks_builtins() {
        let mut map = SymbolMap::new();
        map.add_by_tags(SymbolTags::QUAD);
        let p = map.prepare();
        assert!(!p.symbols.is_empty());
        assert!(p.symbols.iter().all(|s| s.tags.intersects(SymbolTags::QUAD)));
        assert!(p.symbols.iter().any(|s| s.c == '▞'));
    }

    #[test]
    fn selector_string_replaces_then_edits() {
        let mut map = SymbolMap::new();
        map.apply_selectors("block").unwrap();
        let n_block = map.prepare().symbols.len();
        assert!(n_block > 0);

        // Bare name replaces the previous selection outright.
        map.apply_selectors("braille").unwrap();
        let p = map.prepare();
        assert!(p.symbols.iter().all(|s| s.tags.intersects(SymbolTags::BRAILLE)));

        // Leading sign edits in place.
        map.apply_selectors("+space").unwrap();
        assert!(map.prepare().symbols.iter().any(|s| s.c == ' '));
    }

    #[test]
    fn bad_selector_leaves_map_unchanged() {
        let mut map = SymbolMap::new();
        map.apply_selectors("block+border").unwrap();
        let before = map.prepare().symbols.len();
        assert!(map.apply_selectors("block+frobnicate").is_err());
        assert!(map.apply_selectors("block+").is_err());
        assert_eq!(map.prepare().symbols.len(), before);
    }

    #[test]
    fn range_selection_honors_allow_builtin() {
        let mut map = SymbolMap::new();
        map.add_by_range('\u{2580}', '\u{259f}');
        assert!(!map.prepare().symbols.is_empty());

        let mut map = SymbolMap::new();
        map.set_allow_builtin_glyphs(false);
        map.add_by_range('\u{2580}', '\u{259f}');
        assert!(map.prepare().is_empty());
    }

    #[test]
    fn registered_glyph_is_selectable_and_overrides_builtin() {
        let mut map = SymbolMap::new();
        // Solid 8x8 alpha block registered under 'Q'.
        let px = vec![0xffu8; 8 * 8 * 4];
        map.add_glyph('Q', PixelType::Rgba8Unassociated, &px, 8, 8, 0)
            .unwrap();
        map.add_by_tags(SymbolTags::IMPORTED);
        let p = map.prepare();
        assert_eq!(p.symbols.len(), 1);
        assert_eq!(p.symbols[0].c, 'Q');
        assert_eq!(p.symbols[0].popcount, 64);
    }

    #[test]
    fn wide_glyph_lands_in_symbols2() {
        let mut map = SymbolMap::new();
        let px = vec![0xffu8; 16 * 8 * 4];
        map.add_glyph('漢', PixelType::Rgba8Unassociated, &px, 16, 8, 0)
            .unwrap();
        map.add_by_tags(SymbolTags::WIDE);
        let p = map.prepare();
        assert!(p.symbols.is_empty());
        assert_eq!(p.symbols2.len(), 1);
        assert_eq!(p.symbols2[0].popcount2, 128);
    }

    #[test]
    fn glyph_geometry_is_validated() {
        let mut map = SymbolMap::new();
        let px = vec![0u8; 1024];
        assert!(
            map.add_glyph('x', PixelType::Rgba8Unassociated, &px, 7, 8, 0)
                .is_err()
        );
        assert!(
            map.add_glyph('x', PixelType::Rgba8Unassociated, &px[..16], 8, 8, 0)
                .is_err()
        );
    }
}
