//! Anchored region over the edit buffer.
//!
//! The anchor is fixed when the selection starts; the live end either follows
//! the cursor or is pinned by `mark_range`. Orientation is kept as set and only
//! normalized to `[min, max)` when the span is read.

use core_text::{EditBuffer, Tokenizer};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: bool,
    anchor: usize,
    /// Pinned live end; `None` follows the cursor.
    live: Option<usize>,
    visual: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a selection anchored at `pos` whose live end follows the cursor.
    pub fn mark(&mut self, pos: usize) {
        self.active = true;
        self.anchor = pos;
        self.live = None;
        trace!(target: "state.selection", anchor = pos, "mark");
    }

    /// Select `[b, e)` with `b` as the anchor. Orientation is kept as given.
    pub fn mark_range(&mut self, b: usize, e: usize) {
        self.active = true;
        self.anchor = b;
        self.live = Some(e);
        trace!(target: "state.selection", anchor = b, live = e, "mark_range");
    }

    /// Line versus block framing. Only consulted by renderers.
    pub fn visual(&mut self, line: bool) {
        self.visual = line;
    }

    pub fn is_visual_line(&self) -> bool {
        self.visual
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `(anchor, live)` as set, before normalization.
    pub fn oriented(&self, buf: &EditBuffer) -> Option<(usize, usize)> {
        self.active
            .then(|| (self.anchor, self.live.unwrap_or(buf.pos())))
    }

    /// Normalized `[begin, end)` clamped to the line.
    pub fn pos(&self, buf: &EditBuffer) -> Option<(usize, usize)> {
        let (a, l) = self.oriented(buf)?;
        let len = buf.len();
        Some((a.min(l).min(len), a.max(l).min(len)))
    }

    /// Selected text, leaving the selection and buffer untouched.
    pub fn text(&self, buf: &EditBuffer) -> String {
        match self.pos(buf) {
            Some((b, e)) => buf.runes()[b..e].iter().collect(),
            None => String::new(),
        }
    }

    /// Consume the selection: its text and bounds, then deactivate.
    pub fn pop(&mut self, buf: &EditBuffer) -> Option<(String, usize, usize)> {
        let (b, e) = self.pos(buf)?;
        let text = buf.runes()[b..e].iter().collect();
        self.reset();
        Some((text, b, e))
    }

    /// Remove the selected span from the buffer and return it.
    pub fn cut(&mut self, buf: &mut EditBuffer) -> Option<String> {
        let (_, b, e) = self.pop(buf)?;
        let removed = buf.cut(b, e);
        buf.set(b);
        Some(removed)
    }

    /// Map every rune of the span in place. Length is preserved.
    pub fn replace_with(&mut self, buf: &mut EditBuffer, f: impl Fn(char) -> char) -> bool {
        match self.pop(buf) {
            Some((_, b, e)) => {
                buf.map_runes(b, e, f);
                true
            }
            None => false,
        }
    }

    /// Insert `left` before and `right` after the span.
    pub fn surround(&mut self, buf: &mut EditBuffer, left: char, right: char) -> bool {
        match self.pop(buf) {
            Some((_, b, e)) => {
                buf.insert(e, &[right]);
                buf.insert(b, &[left]);
                true
            }
            None => false,
        }
    }

    /// Select the token of `tok` under `pos`. With `around`, trailing blanks
    /// are included (leading blanks when the token ends the line).
    pub fn select_token(&mut self, buf: &EditBuffer, tok: Tokenizer, pos: usize, around: bool) -> bool {
        let runes = buf.runes();
        let Some(span) = tok.token_at(runes, pos) else {
            return false;
        };
        let (mut b, mut e) = (span.start, span.end);
        if around {
            let trailing = runes[e..].iter().take_while(|c| c.is_whitespace()).count();
            if trailing > 0 {
                e += trailing;
            } else {
                b -= runes[..b].iter().rev().take_while(|c| c.is_whitespace()).count();
            }
        }
        self.mark_range(b, e);
        true
    }

    /// Select the region enclosed by `open`/`close` around `pos`, excluding the
    /// delimiters unless `around`.
    pub fn select_surround(&mut self, buf: &EditBuffer, open: char, close: char, pos: usize, around: bool) -> bool {
        let runes = buf.runes();
        if runes.is_empty() {
            return false;
        }
        let pos = pos.min(runes.len() - 1);
        let left = if runes[pos] == open {
            Some(pos)
        } else {
            runes[..pos].iter().rposition(|&c| c == open)
        };
        let Some(left) = left else {
            return false;
        };
        let Some(right) = runes[left + 1..].iter().position(|&c| c == close).map(|i| left + 1 + i) else {
            return false;
        };
        if around {
            self.mark_range(left, right + 1);
        } else {
            self.mark_range(left + 1, right);
        }
        true
    }
}
