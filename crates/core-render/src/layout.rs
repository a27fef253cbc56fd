//! Cell geometry of the prompt plus line, wrapped at the terminal width.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells a tab occupies on screen.
pub const TAB_WIDTH: usize = 4;

pub fn rune_width(c: char) -> usize {
    match c {
        '\t' => TAB_WIDTH,
        _ => c.width().unwrap_or(0),
    }
}

pub fn str_width(s: &str) -> usize {
    s.width()
}

/// Row and column (relative to the prompt row) reached after drawing `prompt`
/// followed by `runes`. A `'\n'` rune starts a new row; a rune that does not fit
/// in the remaining cells wraps whole.
pub fn position_after(prompt_width: usize, runes: &[char], cols: usize) -> (usize, usize) {
    let cols = cols.max(1);
    let mut row = prompt_width / cols;
    let mut col = prompt_width % cols;
    for &c in runes {
        if c == '\n' {
            row += 1;
            col = 0;
            continue;
        }
        let w = rune_width(c);
        if col + w > cols {
            row += 1;
            col = 0;
        }
        col += w;
        if col >= cols {
            row += 1;
            col = 0;
        }
    }
    (row, col)
}
