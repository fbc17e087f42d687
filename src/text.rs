//! Bitmap text
//!
//! Procedural 5x7 bitmap font drawn with filled rectangles, plus the
//! version label shown in the top-left corner of the menu.

use crate::video::VideoDriver;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

/// Horizontal advance of one glyph at scale 1 (5 pixels + 1 spacing)
pub const GLYPH_ADVANCE: u32 = 6;
pub const GLYPH_HEIGHT: u32 = 7;

/// First character in [`FONT`]
const FONT_FIRST: u8 = b' ';

/// Printable ASCII from space to underscore, five columns per glyph.
/// Bit 0 of each column is the top row.
#[rustfmt::skip]
const FONT: [[u8; 5]; 64] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x03, 0x00, 0x03, 0x00], // '"'
    [0x22, 0x7F, 0x22, 0x7F, 0x22], // '#'
    [0x2E, 0x2A, 0x7F, 0x2A, 0x3A], // '$'
    [0x43, 0x33, 0x08, 0x66, 0x61], // '%'
    [0x3A, 0x4D, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x00, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x00, 0x3E, 0x41, 0x00], // '('
    [0x00, 0x41, 0x3E, 0x00, 0x00], // ')'
    [0x2A, 0x1C, 0x3E, 0x1C, 0x2A], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x40, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x00, 0x40, 0x00, 0x00], // '.'
    [0x60, 0x10, 0x08, 0x04, 0x03], // '/'
    [0x7F, 0x51, 0x49, 0x45, 0x7F], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x79, 0x49, 0x49, 0x49, 0x4F], // '2'
    [0x41, 0x49, 0x49, 0x49, 0x7F], // '3'
    [0x0F, 0x08, 0x08, 0x08, 0x7F], // '4'
    [0x4F, 0x49, 0x49, 0x49, 0x79], // '5'
    [0x7F, 0x49, 0x49, 0x49, 0x79], // '6'
    [0x01, 0x01, 0x79, 0x05, 0x03], // '7'
    [0x7F, 0x49, 0x49, 0x49, 0x7F], // '8'
    [0x4F, 0x49, 0x49, 0x49, 0x7F], // '9'
    [0x00, 0x00, 0x22, 0x00, 0x00], // ':'
    [0x00, 0x40, 0x32, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x01, 0x01, 0x59, 0x09, 0x0F], // '?'
    [0x7F, 0x41, 0x5D, 0x55, 0x5F], // '@'
    [0x7F, 0x09, 0x09, 0x09, 0x7F], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x7F, 0x41, 0x41, 0x41, 0x41], // 'C'
    [0x7F, 0x41, 0x41, 0x41, 0x3E], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x7F, 0x41, 0x49, 0x49, 0x79], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x41, 0x41, 0x7F, 0x41, 0x41], // 'I'
    [0x60, 0x40, 0x40, 0x40, 0x7F], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x02, 0x04, 0x08, 0x7F], // 'N'
    [0x7F, 0x41, 0x41, 0x41, 0x7F], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x0F], // 'P'
    [0x7F, 0x41, 0x51, 0x21, 0x5F], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x4F], // 'R'
    [0x4F, 0x49, 0x49, 0x49, 0x79], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x7F, 0x40, 0x40, 0x40, 0x7F], // 'U'
    [0x0F, 0x30, 0x40, 0x30, 0x0F], // 'V'
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // 'W'
    [0x41, 0x36, 0x08, 0x36, 0x41], // 'X'
    [0x03, 0x04, 0x78, 0x04, 0x03], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x03, 0x04, 0x08, 0x10, 0x60], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
];

/// Shown for characters outside [`FONT`]
const MISSING_GLYPH: [u8; 5] = [0x7F; 5];

/// Column bitmaps for `c`. Lowercase letters share the uppercase glyphs.
fn glyph(c: char) -> [u8; 5] {
    let c = c.to_ascii_uppercase();
    if !c.is_ascii() {
        return MISSING_GLYPH;
    }
    match (c as u8).checked_sub(FONT_FIRST) {
        Some(i) if (i as usize) < FONT.len() => FONT[i as usize],
        _ => MISSING_GLYPH,
    }
}

/// Vertical runs of set bits in a glyph column as (first row, length)
fn column_runs(mut bits: u8) -> impl Iterator<Item = (u32, u32)> {
    let mut row = 0;
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let skip = bits.trailing_zeros();
        bits >>= skip;
        let len = bits.trailing_ones();
        bits = bits.checked_shr(len).unwrap_or(0);
        let run = (row + skip, len);
        row += skip + len;
        Some(run)
    })
}

/// Width in pixels of `text` drawn at `scale`
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale
}

/// Renders bitmap text with its top-left corner at (`x`, `y`)
///
/// Each glyph column is drawn as one filled rectangle per vertical run.
///
/// # Parameters
///
/// - `driver`: Target of the fill calls
/// - `text`: Characters to draw. Case-insensitive; characters with no glyph show as a block
/// - `x, y`: Screen position of the first glyph's top-left pixel
/// - `color`: Fill color for every pixel
/// - `scale`: Pixel size. 1 gives 5x7 glyphs, 2 gives 10x14
///
/// # Returns
///
/// The driver's error message if a fill fails
///
/// # Example
///
/// ```rust
/// draw_simple_text(&mut driver, "Loading", 20, 20, Color::RGB(255, 255, 255), 2)?;
/// ```
pub fn draw_simple_text<D: VideoDriver>(
    driver: &mut D,
    text: &str,
    x: i32,
    y: i32,
    color: Color,
    scale: u32,
) -> Result<(), String> {
    let char_width = (GLYPH_ADVANCE * scale) as i32;
    let pixel_size = scale as i32;

    for (i, c) in text.chars().enumerate() {
        let char_x = x + i as i32 * char_width;

        for (col, bits) in glyph(c).into_iter().enumerate() {
            for (row, len) in column_runs(bits) {
                driver.fill_rect(
                    color,
                    Rect::new(
                        char_x + col as i32 * pixel_size,
                        y + (row * scale) as i32,
                        scale,
                        len * scale,
                    ),
                )?;
            }
        }
    }

    Ok(())
}

/// Status line in the top-left corner: the version label plus an optional suffix
pub struct TopLeftText {
    label: String,
    text: String,
}

impl TopLeftText {
    pub fn new(label: &str) -> Self {
        TopLeftText {
            label: label.to_string(),
            text: label.to_string(),
        }
    }

    /// Resets the text to the version label followed by `append`
    pub fn set_suffix(&mut self, append: &str) {
        self.text = format!("{}{}", self.label, append);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Draws at 2% of the screen from the top-left corner
    pub fn render<D: VideoDriver>(&self, driver: &mut D) -> Result<(), String> {
        if self.text.is_empty() {
            return Ok(());
        }
        let (w, h) = driver.screen_size();
        let x = (w as f32 * 0.02) as i32 + 4;
        let y = (h as f32 * 0.02) as i32;
        draw_simple_text(driver, &self.text, x, y, Color::RGB(255, 255, 255), 2)
    }
}
