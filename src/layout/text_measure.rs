//! Text Measurement
//!
//! Display width of label text in terminal cells. Text leaves in the
//! [`Document`](super::Document) are sized with this, single line, no wrapping.

use unicode_width::UnicodeWidthChar;

/// Display width of a single character in cells.
///
/// Emoji ranges are forced to 2, the way terminals usually render them.
#[inline]
pub fn char_width(c: char) -> u16 {
    match c as u32 {
        0x2600..=0x27BF => 2,
        0x1F300..=0x1F64F => 2,
        0x1F680..=0x1F6FF => 2,
        0x1F900..=0x1F9FF => 2,
        0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0) as u16,
    }
}

/// Measure the display width of a string in terminal cells.
///
/// Newlines are ignored: labels are single-line.
pub fn string_width(s: &str) -> u16 {
    s.chars()
        .filter(|c| *c != '\n')
        .fold(0u16, |width, c| width.saturating_add(char_width(c)))
}
