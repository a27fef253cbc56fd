//! Rune buffer holding the edited line, its cursor and mark.

pub mod keyword;
pub mod tokenizer;

pub use keyword::{KeywordSwitch, switch_keyword};
pub use tokenizer::Tokenizer;

/// Display-safe form of one input rune.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted {
    pub runes: Vec<char>,
    /// Cursor units occupied once inserted.
    pub width: usize,
}

/// Encode a rune for insertion. Control characters other than tab are
/// rendered in caret notation (`^A`, `^?` for DEL) and occupy two units.
pub fn quote(r: char) -> Quoted {
    let runes = match r {
        '\t' => vec![r],
        '\x7f' => vec!['^', '?'],
        c if (c as u32) < 0x20 => vec!['^', char::from(b'@' + c as u8)],
        c => vec![c],
    };
    Quoted {
        width: runes.len(),
        runes,
    }
}

/// The edited line. Cursor and mark are rune offsets bounded by `[0, len]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    runes: Vec<char>,
    pos: usize,
    mark: Option<usize>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `text` with the cursor appended at its end.
    pub fn from_str(text: &str) -> Self {
        let runes: Vec<char> = text.chars().collect();
        Self {
            pos: runes.len(),
            runes,
            mark: None,
        }
    }

    pub fn len(&self) -> usize {
        self.runes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }

    pub fn text(&self) -> String {
        self.runes.iter().collect()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.runes.get(pos).copied()
    }

    /// Rune under the cursor.
    pub fn current(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    /// Replace the whole line, placing the cursor at `pos` (clamped).
    pub fn set_line(&mut self, text: &str, pos: usize) {
        self.runes = text.chars().collect();
        self.mark = self.mark.map(|m| m.min(self.runes.len()));
        self.set(pos);
    }

    pub fn clear(&mut self) {
        self.runes.clear();
        self.pos = 0;
        self.mark = None;
    }

    /// Insert `runes` at `pos` (clamped). The cursor and mark shift when at or
    /// after the insertion point.
    pub fn insert(&mut self, pos: usize, runes: &[char]) {
        let at = pos.min(self.runes.len());
        self.runes.splice(at..at, runes.iter().copied());
        if self.pos >= at {
            self.pos += runes.len();
        }
        if let Some(m) = self.mark.as_mut()
            && *m > at
        {
            *m += runes.len();
        }
    }

    /// Insert at the cursor and advance past the inserted runes.
    pub fn insert_at_cursor(&mut self, runes: &[char]) {
        let at = self.pos;
        self.runes.splice(at..at, runes.iter().copied());
        self.pos = at + runes.len();
        if let Some(m) = self.mark.as_mut()
            && *m > at
        {
            *m += runes.len();
        }
    }

    /// Insert the quoted form of `r` and advance the cursor by its width.
    pub fn insert_quoted(&mut self, r: char) -> usize {
        let quoted = quote(r);
        self.insert_at_cursor(&quoted.runes);
        quoted.width
    }

    /// Remove `[bpos, epos)` and return it. Reversed bounds are swapped and
    /// both ends are clamped to the line.
    pub fn cut(&mut self, bpos: usize, epos: usize) -> String {
        let (b, e) = normalize(bpos, epos, self.runes.len());
        if b == e {
            return String::new();
        }
        let removed: String = self.runes.drain(b..e).collect();
        let n = e - b;
        self.pos = shift_after_cut(self.pos, b, e, n);
        self.mark = self.mark.map(|m| shift_after_cut(m, b, e, n));
        removed
    }

    /// Remove the rune at `pos`, if any.
    pub fn cut_rune(&mut self, pos: usize) -> Option<char> {
        if pos >= self.runes.len() {
            return None;
        }
        self.cut(pos, pos + 1).chars().next()
    }

    /// Replace `[bpos, epos)` with `runes`, leaving the cursor after the
    /// replacement.
    pub fn replace(&mut self, bpos: usize, epos: usize, runes: &[char]) {
        let (b, _) = normalize(bpos, epos, self.runes.len());
        self.cut(bpos, epos);
        self.pos = b;
        self.insert_at_cursor(runes);
    }

    /// Map the runes of `[bpos, epos)` in place. Cursor and length are unchanged.
    pub fn map_runes(&mut self, bpos: usize, epos: usize, f: impl Fn(char) -> char) {
        let (b, e) = normalize(bpos, epos, self.runes.len());
        for r in &mut self.runes[b..e] {
            *r = f(*r);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Cursor
    // ---------------------------------------------------------------------------------------------

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set(&mut self, pos: usize) {
        self.pos = pos.min(self.runes.len());
    }

    pub fn inc(&mut self) {
        self.set(self.pos + 1);
    }

    pub fn dec(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn move_by(&mut self, offset: isize) {
        let target = self.pos as isize + offset;
        self.set(target.max(0) as usize);
    }

    /// Start of the line containing the cursor.
    pub fn beginning_of_line(&mut self) {
        self.pos = self.line_start(self.pos);
    }

    /// Last rune of the current line (vi-command resting position).
    pub fn end_of_line(&mut self) {
        let end = self.line_end(self.pos);
        self.pos = if end > self.line_start(self.pos) {
            end - 1
        } else {
            end
        };
    }

    /// One past the last rune of the current line (insert-mode append).
    pub fn end_of_line_append(&mut self) {
        self.pos = self.line_end(self.pos);
    }

    /// Move `lines` newline-separated lines down (negative: up), keeping the
    /// column where the target line is long enough.
    pub fn line_move(&mut self, lines: isize) {
        let col = self.pos - self.line_start(self.pos);
        let mut start = self.line_start(self.pos);
        if lines < 0 {
            for _ in 0..lines.unsigned_abs() {
                if start == 0 {
                    break;
                }
                start = self.line_start(start - 1);
            }
        } else {
            for _ in 0..lines {
                let end = self.line_end(start);
                if end >= self.runes.len() {
                    break;
                }
                start = end + 1;
            }
        }
        self.pos = (start + col).min(self.line_end(start));
    }

    /// Clamp the cursor onto the last rune (vi-command resting rule).
    pub fn check_command(&mut self) {
        if !self.runes.is_empty() && self.pos >= self.runes.len() {
            self.pos = self.runes.len() - 1;
        }
    }

    pub fn line_start(&self, pos: usize) -> usize {
        let pos = pos.min(self.runes.len());
        self.runes[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn line_end(&self, pos: usize) -> usize {
        let pos = pos.min(self.runes.len());
        self.runes[pos..]
            .iter()
            .position(|&c| c == '\n')
            .map(|i| pos + i)
            .unwrap_or(self.runes.len())
    }

    // ---------------------------------------------------------------------------------------------
    // Mark
    // ---------------------------------------------------------------------------------------------

    pub fn set_mark(&mut self) {
        self.mark = Some(self.pos);
    }

    pub fn mark(&self) -> Option<usize> {
        self.mark
    }

    /// Swap cursor and mark. Returns false when no mark is set.
    pub fn exchange_mark(&mut self) -> bool {
        match self.mark {
            Some(m) => {
                let m = m.min(self.runes.len());
                self.mark = Some(self.pos);
                self.pos = m;
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Token helpers
    // ---------------------------------------------------------------------------------------------

    pub fn forward(&self, tok: Tokenizer) -> usize {
        tok.forward(&self.runes, self.pos)
    }

    pub fn forward_end(&self, tok: Tokenizer) -> usize {
        tok.forward_end(&self.runes, self.pos)
    }

    pub fn backward(&self, tok: Tokenizer) -> usize {
        tok.backward(&self.runes, self.pos)
    }
}

fn normalize(a: usize, b: usize, len: usize) -> (usize, usize) {
    let (b, e) = if a <= b { (a, b) } else { (b, a) };
    (b.min(len), e.min(len))
}

fn shift_after_cut(p: usize, b: usize, e: usize, n: usize) -> usize {
    if p >= e {
        p - n
    } else if p > b {
        b
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_control_characters() {
        assert_eq!(quote('a').runes, vec!['a']);
        assert_eq!(quote('\t').width, 1);
        let ctrl_a = quote('\x01');
        assert_eq!(ctrl_a.runes, vec!['^', 'A']);
        assert_eq!(ctrl_a.width, 2);
        assert_eq!(quote('\x7f').runes, vec!['^', '?']);
        assert_eq!(quote('\x1b').runes, vec!['^', '[']);
    }

    #[test]
    fn quoted_insert_keeps_cursor_in_sync() {
        let mut buf = EditBuffer::from_str("ab");
        buf.set(1);
        let width = buf.insert_quoted('\x03');
        assert_eq!(width, 2);
        assert_eq!(buf.text(), "a^Cb");
        assert_eq!(buf.pos(), 3);
    }

    #[test]
    fn cut_normalizes_reversed_bounds() {
        let mut buf = EditBuffer::from_str("hello world");
        let removed = buf.cut(11, 5);
        assert_eq!(removed, " world");
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.pos(), 5);
        assert_eq!(buf.cut(2, 99), "llo");
        assert_eq!(buf.cut_rune(0), Some('h'));
        assert_eq!(buf.cut_rune(9), None);
        assert_eq!(buf.text(), "e");
    }

    #[test]
    fn insert_shifts_cursor_and_mark() {
        let mut buf = EditBuffer::from_str("ac");
        buf.set(1);
        buf.set_mark();
        buf.set(2);
        buf.insert(1, &['b']);
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.pos(), 3);
        assert_eq!(buf.mark(), Some(1));
        assert!(buf.exchange_mark());
        assert_eq!(buf.pos(), 1);
        assert_eq!(buf.mark(), Some(3));
    }

    #[test]
    fn cursor_moves_clamp() {
        let mut buf = EditBuffer::from_str("abc");
        buf.inc();
        assert_eq!(buf.pos(), 3);
        buf.move_by(-10);
        assert_eq!(buf.pos(), 0);
        buf.dec();
        assert_eq!(buf.pos(), 0);
        buf.set(42);
        assert_eq!(buf.pos(), 3);
        buf.check_command();
        assert_eq!(buf.pos(), 2);
        buf.beginning_of_line();
        assert_eq!(buf.pos(), 0);
        buf.end_of_line_append();
        assert_eq!(buf.pos(), 3);
        buf.end_of_line();
        assert_eq!(buf.pos(), 2);
    }

    #[test]
    fn line_move_keeps_column() {
        let mut buf = EditBuffer::from_str("first\nab\nthird");
        buf.set(4);
        buf.line_move(1);
        assert_eq!(buf.pos(), 8);
        buf.line_move(1);
        assert_eq!(buf.pos(), 11);
        buf.line_move(-5);
        assert_eq!(buf.pos(), 2);
    }
}
