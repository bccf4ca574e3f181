//! Built-in fixed-size bitmap face used when no font file fits.
//!
//! Glyphs come from the 8x8 tables in `font8x8`. The face is never scaled:
//! text always renders at its natural 8 px cell, so the size constraint is
//! not guaranteed in this mode.

use font8x8::{UnicodeFonts, BASIC_FONTS, GREEK_FONTS, LATIN_FONTS};

use super::font::TextBox;
use super::overlay::TextMask;

/// Width and height of one glyph cell.
pub const CELL: u32 = 8;

/// Bitmap rows for `c`, each byte one row with bit 0 as the leftmost pixel.
/// Characters outside the tables render as `?`.
fn glyph_rows(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Every lit pixel of `text`, in layout coordinates.
fn lit_pixels(text: &str) -> impl Iterator<Item = (i64, i64)> + '_ {
    text.split('\n').enumerate().flat_map(|(line_no, line)| {
        line.chars()
            .filter(|c| !c.is_control())
            .enumerate()
            .flat_map(move |(col, c)| {
                let rows = glyph_rows(c);
                (0..CELL as i64).flat_map(move |row| {
                    let bits = rows[row as usize];
                    (0..CELL as i64)
                        .filter(move |bit| bits & (1u8 << *bit) != 0)
                        .map(move |bit| {
                            (
                                col as i64 * CELL as i64 + bit,
                                line_no as i64 * CELL as i64 + row,
                            )
                        })
                })
            })
    })
}

/// Ink bounding box of `text` in the built-in face.
pub fn measure(text: &str) -> TextBox {
    let mut bbox: Option<TextBox> = None;
    for (x, y) in lit_pixels(text) {
        let pixel = TextBox::new(x, y, x + 1, y + 1);
        bbox = Some(match bbox {
            Some(b) => b.union(&pixel),
            None => pixel,
        });
    }
    bbox.unwrap_or_default()
}

/// Rasterize `text` into a mask tight around its ink.
pub fn rasterize(text: &str) -> TextMask {
    let bbox = measure(text);
    let mut mask = TextMask::new(bbox.width(), bbox.height());
    for (x, y) in lit_pixels(text) {
        mask.add(x - bbox.min_x, y - bbox.min_y, 1.0);
    }
    mask
}
