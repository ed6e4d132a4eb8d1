//! Built-in glyph repertoire.
//!
//! Every selectable code point gets an 8x8 monochrome coverage bitmap,
//! bit `y * 8 + x` set for inked pixels, (0, 0) top-left. Block, border
//! and shade glyphs are hand-drawn or generated from their geometric
//! definition; braille and sextants are decomposed from their code
//! points; ASCII falls back to a density estimate where no hand-drawn
//! bitmap exists.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::tags::SymbolTags;

/// One built-in symbol: code point, shape tags, 8x8 coverage bitmap.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinGlyph {
    /// The code point.
    pub c: char,
    /// Shape categories.
    pub tags: SymbolTags,
    /// 8x8 coverage, bit `y * 8 + x`.
    pub bitmap: u64,
}

/// Packs eight row bytes (MSB = leftmost pixel) into a coverage bitmap.
#[must_use]
pub const fn bitmap_from_rows(rows: [u8; 8]) -> u64 {
    let mut bm = 0u64;
    let mut y = 0;
    while y < 8 {
        let mut x = 0;
        while x < 8 {
            if rows[y] & (0x80 >> x) != 0 {
                bm |= 1 << (y * 8 + x);
            }
            x += 1;
        }
        y += 1;
    }
    bm
}

fn rect(x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
    let mut bm = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            bm |= 1 << (y * 8 + x);
        }
    }
    bm
}

/// Hand-drawn ASCII shapes for the glyphs that matter most in matching.
const ASCII_ROWS: &[(char, [u8; 8])] = &[
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30]),
    (':', [0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x00]),
    (';', [0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x30]),
    ('\'', [0x18, 0x18, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('`', [0x30, 0x18, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('"', [0x66, 0x66, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('-', [0x00, 0x00, 0x00, 0x7e, 0x00, 0x00, 0x00, 0x00]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff]),
    ('=', [0x00, 0x00, 0x7e, 0x00, 0x7e, 0x00, 0x00, 0x00]),
    ('+', [0x00, 0x18, 0x18, 0x7e, 0x7e, 0x18, 0x18, 0x00]),
    ('*', [0x00, 0x5a, 0x3c, 0x7e, 0x3c, 0x5a, 0x00, 0x00]),
    ('|', [0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18]),
    ('!', [0x18, 0x18, 0x18, 0x18, 0x18, 0x00, 0x18, 0x00]),
    ('i', [0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3c, 0x00]),
    ('o', [0x00, 0x00, 0x3c, 0x66, 0x66, 0x66, 0x3c, 0x00]),
    ('O', [0x3c, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3c, 0x00]),
    ('x', [0x00, 0x00, 0x66, 0x3c, 0x18, 0x3c, 0x66, 0x00]),
    ('X', [0x66, 0x66, 0x3c, 0x18, 0x3c, 0x66, 0x66, 0x00]),
    ('#', [0x24, 0x24, 0xff, 0x24, 0x24, 0xff, 0x24, 0x24]),
    ('@', [0x3c, 0x42, 0x9d, 0xa5, 0xa5, 0x9e, 0x40, 0x3c]),
    ('%', [0x62, 0x64, 0x08, 0x10, 0x20, 0x4c, 0x8c, 0x00]),
    ('&', [0x38, 0x44, 0x44, 0x38, 0x9a, 0xa4, 0x46, 0x00]),
    ('8', [0x3c, 0x66, 0x66, 0x3c, 0x66, 0x66, 0x3c, 0x00]),
    ('W', [0x81, 0x81, 0x81, 0x99, 0x99, 0xa5, 0x66, 0x00]),
    ('M', [0x81, 0xc3, 0xa5, 0x99, 0x81, 0x81, 0x81, 0x00]),
];

/// Center-out density fill for ASCII glyphs without a hand-drawn bitmap.
fn estimate_density(c: char) -> u64 {
    let density = match c {
        'a'..='z' => 20,
        'A'..='Z' => 26,
        '0'..='9' => 24,
        _ => 14,
    };
    let mut order: Vec<u32> = (0..64).collect();
    order.sort_by_key(|&i| {
        let x = i64::from(i % 8) * 2 - 7;
        let y = i64::from(i / 8) * 2 - 7;
        x * x + y * y
    });
    let mut bm = 0u64;
    for &bit in order.iter().take(density) {
        bm |= 1 << bit;
    }
    bm
}

fn push(out: &mut Vec<BuiltinGlyph>, c: char, tags: SymbolTags, bitmap: u64) {
    out.push(BuiltinGlyph { c, tags, bitmap });
}

fn build_blocks(out: &mut Vec<BuiltinGlyph>) {
    let t = SymbolTags::NARROW;

    push(out, ' ', t | SymbolTags::SPACE | SymbolTags::ASCII, 0);
    push(out, '\u{2588}', t | SymbolTags::SOLID | SymbolTags::BLOCK, !0u64);

    // Quadrants, bit 0 = top-left, 1 = top-right, 2 = bottom-left, 3 = bottom-right.
    const QUADRANT_CHARS: [char; 16] = [
        ' ', '▘', '▝', '▀', '▖', '▌', '▞', '▛', '▗', '▚', '▐', '▜', '▄', '▙', '▟', '█',
    ];
    for (bits, &c) in QUADRANT_CHARS.iter().enumerate().skip(1) {
        if c == '█' {
            continue;
        }
        let mut bm = 0u64;
        if bits & 1 != 0 {
            bm |= rect(0, 0, 4, 4);
        }
        if bits & 2 != 0 {
            bm |= rect(4, 0, 8, 4);
        }
        if bits & 4 != 0 {
            bm |= rect(0, 4, 4, 8);
        }
        if bits & 8 != 0 {
            bm |= rect(4, 4, 8, 8);
        }
        let shape = match c {
            '▀' | '▄' => SymbolTags::HHALF,
            '▌' | '▐' => SymbolTags::VHALF,
            _ => SymbolTags::QUAD,
        };
        push(out, c, t | SymbolTags::BLOCK | shape, bm);
    }

    // Eighth-block ramps (skipping the halves covered above).
    for n in 1..8u32 {
        if n != 4 {
            // U+2580 block: lower n/8.
            let c = char::from_u32(0x2580 + n).unwrap_or('▁');
            push(out, c, t | SymbolTags::BLOCK, rect(0, 8 - n, 8, 8));
        }
        if n != 4 {
            // U+2590 - n block: left n/8, from ▏ (1/8) up to ▉ (7/8).
            let c = char::from_u32(0x2590 - n).unwrap_or('▏');
            push(out, c, t | SymbolTags::BLOCK, rect(0, 0, n, 8));
        }
    }
    push(out, '\u{2594}', t | SymbolTags::BLOCK, rect(0, 0, 8, 1));
    push(out, '\u{2595}', t | SymbolTags::BLOCK, rect(7, 0, 8, 8));

    // Shades.
    push(
        out,
        '░',
        t | SymbolTags::STIPPLE,
        bitmap_from_rows([0xaa, 0x00, 0x55, 0x00, 0xaa, 0x00, 0x55, 0x00]),
    );
    push(
        out,
        '▒',
        t | SymbolTags::STIPPLE,
        bitmap_from_rows([0xaa, 0x55, 0xaa, 0x55, 0xaa, 0x55, 0xaa, 0x55]),
    );
    push(
        out,
        '▓',
        t | SymbolTags::STIPPLE,
        bitmap_from_rows([0xff, 0xaa, 0xff, 0x55, 0xff, 0xaa, 0xff, 0x55]),
    );
}

fn build_borders(out: &mut Vec<BuiltinGlyph>) {
    // Arms: (char, up, down, left, right) with strokes through row/col 3.
    const ARMS: &[(char, bool, bool, bool, bool)] = &[
        ('─', false, false, true, true),
        ('│', true, true, false, false),
        ('┌', false, true, false, true),
        ('┐', false, true, true, false),
        ('└', true, false, false, true),
        ('┘', true, false, true, false),
        ('├', true, true, false, true),
        ('┤', true, true, true, false),
        ('┬', false, true, true, true),
        ('┴', true, false, true, true),
        ('┼', true, true, true, true),
        ('╴', false, false, true, false),
        ('╵', true, false, false, false),
        ('╶', false, false, false, true),
        ('╷', false, true, false, false),
    ];
    for &(c, up, down, left, right) in ARMS {
        let mut bm = 0u64;
        if up {
            bm |= rect(3, 0, 4, 4);
        }
        if down {
            bm |= rect(3, 3, 4, 8);
        }
        if left {
            bm |= rect(0, 3, 4, 4);
        }
        if right {
            bm |= rect(3, 3, 8, 4);
        }
        push(out, c, SymbolTags::NARROW | SymbolTags::BORDER, bm);
    }
}

fn build_diagonals(out: &mut Vec<BuiltinGlyph>) {
    let t = SymbolTags::NARROW;
    let mut rising = 0u64; // ╱ bottom-left to top-right
    let mut falling = 0u64; // ╲
    for y in 0..8u32 {
        for x in 0..8u32 {
            if x + y == 7 || x + y == 8 {
                rising |= 1 << (y * 8 + x);
            }
            if x == y || x == y + 1 {
                falling |= 1 << (y * 8 + x);
            }
        }
    }
    push(out, '╱', t | SymbolTags::DIAGONAL | SymbolTags::BORDER, rising);
    push(out, '╲', t | SymbolTags::DIAGONAL | SymbolTags::BORDER, falling);
    push(
        out,
        '╳',
        t | SymbolTags::DIAGONAL | SymbolTags::BORDER,
        rising | falling,
    );

    // Filled corner triangles.
    let mut lr = 0u64;
    let mut ll = 0u64;
    let mut ul = 0u64;
    let mut ur = 0u64;
    for y in 0..8u32 {
        for x in 0..8u32 {
            let bit = 1 << (y * 8 + x);
            if x + y >= 7 {
                lr |= bit;
            }
            if x <= y {
                ll |= bit;
            }
            if x + y <= 7 {
                ul |= bit;
            }
            if x >= y {
                ur |= bit;
            }
        }
    }
    let wt = t | SymbolTags::WEDGE | SymbolTags::GEOMETRIC | SymbolTags::DIAGONAL;
    push(out, '◢', wt, lr);
    push(out, '◣', wt, ll);
    push(out, '◤', wt, ul);
    push(out, '◥', wt, ur);
}

fn build_dots_and_misc(out: &mut Vec<BuiltinGlyph>) {
    let t = SymbolTags::NARROW;
    push(out, '·', t | SymbolTags::DOT, rect(3, 3, 5, 5));
    push(
        out,
        '•',
        t | SymbolTags::DOT | SymbolTags::GEOMETRIC,
        rect(2, 2, 6, 6),
    );
    push(out, '▪', t | SymbolTags::GEOMETRIC, rect(2, 2, 6, 6));
    push(out, '■', t | SymbolTags::GEOMETRIC, rect(1, 1, 7, 7));

    // Horizontal scan lines.
    for (i, c) in ['⎺', '⎻', '⎼', '⎽'].into_iter().enumerate() {
        let y = (i as u32) * 2;
        push(out, c, t | SymbolTags::TECHNICAL, rect(0, y, 8, y + 1));
    }
}

fn build_ascii(out: &mut Vec<BuiltinGlyph>) {
    let drawn: HashMap<char, u64> = ASCII_ROWS
        .iter()
        .map(|&(c, rows)| (c, bitmap_from_rows(rows)))
        .collect();
    for cp in 0x21u32..=0x7e {
        let c = char::from_u32(cp).unwrap_or('?');
        let mut tags = SymbolTags::NARROW | SymbolTags::ASCII;
        match c {
            'a'..='z' | 'A'..='Z' => tags |= SymbolTags::ALPHA,
            '0'..='9' => tags |= SymbolTags::DIGIT,
            '/' | '\\' => tags |= SymbolTags::DIAGONAL,
            _ => {}
        }
        let bitmap = match c {
            '/' => {
                let mut bm = 0u64;
                for y in 0..8u32 {
                    for x in 0..8u32 {
                        if x + y == 7 || x + y == 8 {
                            bm |= 1 << (y * 8 + x);
                        }
                    }
                }
                bm
            }
            '\\' => {
                let mut bm = 0u64;
                for y in 0..8u32 {
                    for x in 0..8u32 {
                        if x == y || x == y + 1 {
                            bm |= 1 << (y * 8 + x);
                        }
                    }
                }
                bm
            }
            _ => drawn.get(&c).copied().unwrap_or_else(|| estimate_density(c)),
        };
        push(out, c, tags, bitmap);
    }
}

fn build_braille(out: &mut Vec<BuiltinGlyph>) {
    // Dot k of U+2800+n: column k/3 rows 0..2 for k < 6, bottom row for 6/7.
    for n in 1u32..=0xff {
        let c = char::from_u32(0x2800 + n).unwrap_or('⠁');
        let mut bm = 0u64;
        for k in 0..8u32 {
            if n & (1 << k) == 0 {
                continue;
            }
            let (col, row) = if k < 6 { (k / 3, k % 3) } else { (k - 6, 3) };
            // 2x2 dot centered in its 4x2 cell.
            let x0 = col * 4 + 1;
            let y0 = row * 2;
            bm |= rect(x0, y0, x0 + 2, y0 + 2);
        }
        push(out, c, SymbolTags::NARROW | SymbolTags::BRAILLE, bm);
    }
}

fn build_sextants(out: &mut Vec<BuiltinGlyph>) {
    // U+1FB00.. covers the 2x3 patterns except empty, the two vertical
    // halves and full, which live in the block range.
    let mut cp = 0x1fb00u32;
    for n in 1u32..=62 {
        if n == 0b01_0101 || n == 0b10_1010 {
            continue;
        }
        let c = char::from_u32(cp).unwrap_or('🬀');
        cp += 1;
        let mut bm = 0u64;
        for k in 0..6u32 {
            if n & (1 << k) == 0 {
                continue;
            }
            let (col, row) = (k % 2, k / 2);
            let (y0, y1) = match row {
                0 => (0, 3),
                1 => (3, 6),
                _ => (6, 8),
            };
            bm |= rect(col * 4, y0, col * 4 + 4, y1);
        }
        push(
            out,
            c,
            SymbolTags::NARROW | SymbolTags::SEXTANT | SymbolTags::BLOCK | SymbolTags::LEGACY,
            bm,
        );
    }
}

/// The full built-in repertoire, built once.
#[must_use]
pub fn builtin_glyphs() -> &'static [BuiltinGlyph] {
    static GLYPHS: OnceLock<Vec<BuiltinGlyph>> = OnceLock::new();
    GLYPHS.get_or_init(|| {
        let mut out = Vec::with_capacity(512);
        build_blocks(&mut out);
        build_borders(&mut out);
        build_diagonals(&mut out);
        build_dots_and_misc(&mut out);
        build_ascii(&mut out);
        build_braille(&mut out);
        build_sextants(&mut out);
        out
    })
}

/// Looks up the built-in glyph for a code point.
#[must_use]
pub fn find_builtin(c: char) -> Option<&'static BuiltinGlyph> {
    static INDEX: OnceLock<HashMap<char, usize>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        builtin_glyphs()
            .iter()
            .enumerate()
            .map(|(i, g)| (g.c, i))
            .collect()
    });
    index.get(&c).map(|&i| &builtin_glyphs()[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repertoire_has_no_duplicate_code_points() {
        let mut seen = std::collections::HashSet::new();
        for g in builtin_glyphs() {
            assert!(seen.insert(g.c), "duplicate {:?}", g.c);
        }
    }

    #[test]
    fn solid_and_space_are_complementary() {
        let space = find_builtin(' ').map(|g| g.bitmap);
        let solid = find_builtin('█').map(|g| g.bitmap);
        assert_eq!(space, Some(0));
        assert_eq!(solid, Some(!0u64));
    }

    #[test]
    fn half_blocks_cover_half_the_cell() {
        for c in ['▀', '▄', '▌', '▐'] {
            let g = find_builtin(c).map(|g| g.bitmap.count_ones());
            assert_eq!(g, Some(32), "{c}");
        }
    }

    #[test]
    fn eighth_block_ramps_ink_n_eighths() {
        for n in 1..8u32 {
            let lower = char::from_u32(0x2580 + n).unwrap();
            let left = char::from_u32(0x2590 - n).unwrap();
            for c in [lower, left] {
                let ones = find_builtin(c).map(|g| g.bitmap.count_ones());
                assert_eq!(ones, Some(n * 8), "{c} ({n}/8)");
            }
        }
    }

    #[test]
    fn braille_full_cell_has_all_dots() {
        let g = find_builtin('\u{28ff}');
        assert!(g.is_some());
        let g = g.map(|g| g.bitmap.count_ones());
        assert_eq!(g, Some(8 * 4));
    }

    #[test]
    fn sextant_range_is_complete() {
        let count = builtin_glyphs()
            .iter()
            .filter(|g| g.tags.intersects(SymbolTags::SEXTANT))
            .count();
        assert_eq!(count, 60);
    }
}
