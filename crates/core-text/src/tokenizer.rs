//! Word boundary classifiers.
//!
//! Every classifier reduces the line to a list of token spans and answers
//! boundary queries against that list, so the three rule sets share one
//! navigation implementation.

use std::ops::Range;

/// Token rule set used by word motions and word edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tokenizer {
    /// Maximal runs of alphanumeric runes.
    Word,
    /// Maximal runs of non-whitespace runes.
    Blank,
    /// Blank tokens where `'` and `"` open an atomic span up to the matching
    /// quote (or end of input when unmatched). A backslash escapes the next rune.
    Shell,
}

impl Tokenizer {
    /// Token spans in ascending order, as half-open rune ranges.
    pub fn spans(self, runes: &[char]) -> Vec<Range<usize>> {
        match self {
            Tokenizer::Word => runs(runes, |c| c.is_alphanumeric()),
            Tokenizer::Blank => runs(runes, |c| !c.is_whitespace()),
            Tokenizer::Shell => shell_spans(runes),
        }
    }

    /// Offset one past the end of the token under or after `pos`.
    pub fn forward(self, runes: &[char], pos: usize) -> usize {
        self.spans(runes)
            .into_iter()
            .find(|span| span.end > pos)
            .map(|span| span.end)
            .unwrap_or(runes.len())
    }

    /// Offset of the last rune of the current or next token (inclusive).
    pub fn forward_end(self, runes: &[char], pos: usize) -> usize {
        self.spans(runes)
            .into_iter()
            .map(|span| span.end - 1)
            .find(|&last| last > pos)
            .unwrap_or(runes.len().saturating_sub(1))
    }

    /// Offset of the start of the current-or-previous token.
    pub fn backward(self, runes: &[char], pos: usize) -> usize {
        self.spans(runes)
            .into_iter()
            .rev()
            .find(|span| span.start < pos)
            .map(|span| span.start)
            .unwrap_or(0)
    }

    /// Start of the next token strictly after `pos` (vi `w`), or the line length.
    pub fn next_start(self, runes: &[char], pos: usize) -> usize {
        self.spans(runes)
            .into_iter()
            .find(|span| span.start > pos)
            .map(|span| span.start)
            .unwrap_or(runes.len())
    }

    /// The token containing `pos`, if any.
    pub fn token_at(self, runes: &[char], pos: usize) -> Option<Range<usize>> {
        self.spans(runes).into_iter().find(|span| span.contains(&pos))
    }
}

fn runs(runes: &[char], member: impl Fn(char) -> bool) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, &c) in runes.iter().enumerate() {
        match (member(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..runes.len());
    }
    spans
}

fn shell_spans(runes: &[char]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let n = runes.len();
    let mut i = 0;
    while i < n {
        if runes[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && !runes[i].is_whitespace() {
            match runes[i] {
                q @ ('\'' | '"') => {
                    i = runes[i + 1..]
                        .iter()
                        .position(|&c| c == q)
                        .map(|off| i + 1 + off + 1)
                        .unwrap_or(n);
                }
                '\\' => i = (i + 2).min(n),
                _ => i += 1,
            }
        }
        spans.push(start..i);
    }
    spans
}
