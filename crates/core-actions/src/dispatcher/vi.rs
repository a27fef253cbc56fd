//! Vi-command commands, motions and the pending-operator interpreter.

use super::emacs::find_char;
use super::{Flow, LineEditor};
use crate::ReadlineError;
use core_events::keys::ESC;
use core_state::{Mode, PendingOp, Tokenizer};
use tracing::{debug, trace};

/// A resolved motion: target offset and whether the rune at the target is
/// part of the range an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Motion {
    target: usize,
    inclusive: bool,
}

impl LineEditor {
    /// Run `name` if it is a vi-command command.
    pub(super) fn vi_command(&mut self, name: &str) -> Result<Option<Flow>, ReadlineError> {
        let count = self.state.iterations.get();
        let motion_key = match name {
            "vi-forward-word" => Some('w'),
            "vi-forward-bigword" => Some('W'),
            "vi-backward-word" => Some('b'),
            "vi-backward-bigword" => Some('B'),
            "vi-end-word" => Some('e'),
            "vi-end-bigword" => Some('E'),
            "vi-first-print" => Some('^'),
            "vi-char-search-forward" => Some('f'),
            "vi-char-search-backward" => Some('F'),
            "vi-till-forward" => Some('t'),
            "vi-till-backward" => Some('T'),
            _ => None,
        };
        if let Some(key) = motion_key {
            self.state.undo.skip_save();
            if let Some(motion) = self.motion(key, count)? {
                self.state.line.set(motion.target);
            }
            return Ok(Some(Flow::Continue));
        }

        match name {
            "vi-zero" => {
                self.state.undo.skip_save();
                if self.state.iterations.is_set() {
                    self.state.iterations.add('0');
                    self.keep_iterations = true;
                } else {
                    self.state.line.beginning_of_line();
                }
            }
            "vi-insert-mode" => self.enter_insert(),
            "vi-append-mode" => {
                self.state.line.inc();
                self.enter_insert();
            }
            "vi-insert-beg" => {
                self.state.line.beginning_of_line();
                self.enter_insert();
            }
            "vi-append-eol" => {
                self.state.line.end_of_line_append();
                self.enter_insert();
            }
            "vi-delete-char" => {
                let pos = self.state.line.pos();
                if pos >= self.state.line.line_end(pos) {
                    self.state.undo.skip_save();
                } else {
                    let end = (pos + count).min(self.state.line.line_end(pos));
                    self.kill(pos, end);
                }
            }
            "vi-backward-delete-char" => {
                let pos = self.state.line.pos();
                let start = pos.saturating_sub(count).max(self.state.line.line_start(pos));
                self.kill(start, pos);
            }
            "vi-delete-to" => self.start_operator(PendingOp::Delete),
            "vi-change-to" => self.start_operator(PendingOp::Change),
            "vi-yank-to" => self.start_operator(PendingOp::Yank),
            "vi-kill-eol" => {
                let pos = self.state.line.pos();
                let end = self.state.line.line_end(pos);
                self.kill(pos, end);
            }
            "vi-change-eol" => {
                let pos = self.state.line.pos();
                let end = self.state.line.line_end(pos);
                self.kill(pos, end);
                self.state.mode = Mode::Insert;
            }
            "vi-replace-char" => {
                self.state.undo.skip_save();
                self.state.mode = Mode::ReplaceOnce;
            }
            "vi-overstrike" => {
                self.state.undo.skip_save();
                self.start_overwrite();
            }
            "vi-put-after" => self.put(true, count),
            "vi-put-before" => self.put(false, count),
            "vi-change-case" => {
                let pos = self.state.line.pos();
                let end = (pos + count).min(self.state.line.line_end(pos));
                self.state.line.map_runes(pos, end, toggle_case);
                self.state.line.set(end);
            }
            "vi-subst" => {
                let pos = self.state.line.pos();
                let end = (pos + count).min(self.state.line.line_end(pos));
                self.kill(pos, end);
                self.state.mode = Mode::Insert;
            }
            "vi-change-line" => {
                self.whole_line(PendingOp::Change);
            }
            _ => return Ok(None),
        }
        Ok(Some(Flow::Continue))
    }

    fn enter_insert(&mut self) {
        self.state.undo.skip_save();
        self.state.mode = Mode::Insert;
        trace!(target: "actions.dispatch", "enter_insert");
    }

    fn start_operator(&mut self, op: PendingOp) {
        self.state.undo.skip_save();
        self.state.mode = Mode::ViDeletePending(op);
        self.keep_iterations = true;
    }

    /// Insert the active kill-ring slot `count` times after (or at) the
    /// cursor, leaving the cursor on the last inserted rune.
    fn put(&mut self, after: bool, count: usize) {
        let Some(text) = self.state.kill_ring.active().map(|s| s.chars().collect::<Vec<char>>()) else {
            self.state.undo.skip_save();
            return;
        };
        if after && !self.state.line.is_empty() {
            self.state.line.inc();
        }
        for _ in 0..count {
            self.state.line.insert_at_cursor(&text);
        }
        self.state.line.dec();
    }

    /// Resolve a motion key from the cursor. Character searches read their
    /// target with `read_key`; `None` means the motion does not apply.
    fn motion(&mut self, key: char, count: usize) -> Result<Option<Motion>, ReadlineError> {
        if matches!(key, 'f' | 'F' | 't' | 'T') {
            return self.char_motion(key, count);
        }
        let line = &self.state.line;
        let pos = line.pos();
        let runes = line.runes();
        let repeat = |tok: Tokenizer, step: fn(Tokenizer, &[char], usize) -> usize| {
            (0..count).fold(pos, |at, _| step(tok, runes, at))
        };
        let exclusive = |target| Some(Motion { target, inclusive: false });
        let inclusive = |target| Some(Motion { target, inclusive: true });
        let motion = match key {
            'h' => exclusive(pos.saturating_sub(count).max(line.line_start(pos))),
            'l' | ' ' => exclusive((pos + count).min(line.line_end(pos))),
            'w' => exclusive(repeat(Tokenizer::Word, Tokenizer::next_start)),
            'W' => exclusive(repeat(Tokenizer::Blank, Tokenizer::next_start)),
            'b' => exclusive(repeat(Tokenizer::Word, Tokenizer::backward)),
            'B' => exclusive(repeat(Tokenizer::Blank, Tokenizer::backward)),
            'e' => inclusive(repeat(Tokenizer::Word, Tokenizer::forward_end)),
            'E' => inclusive(repeat(Tokenizer::Blank, Tokenizer::forward_end)),
            '0' => exclusive(line.line_start(pos)),
            '$' => exclusive(line.line_end(pos)),
            '^' => {
                let start = line.line_start(pos);
                let end = line.line_end(pos);
                let blanks = runes[start..end].iter().take_while(|c| c.is_whitespace()).count();
                exclusive(start + blanks)
            }
            _ => None,
        };
        Ok(motion)
    }

    fn char_motion(&mut self, key: char, count: usize) -> Result<Option<Motion>, ReadlineError> {
        let Some((target, abort)) = self.stream.read_key()? else {
            return Ok(None);
        };
        if abort {
            return Ok(None);
        }
        let pos = self.state.line.pos();
        let forward = key.is_ascii_lowercase();
        let Some(found) = find_char(self.state.line.runes(), pos, target, forward, count) else {
            return Ok(None);
        };
        let motion = match key {
            'f' => Motion { target: found, inclusive: true },
            // till the adjacent rune covers nothing
            't' if found == pos + 1 => Motion { target: pos, inclusive: false },
            't' => Motion { target: found - 1, inclusive: true },
            'F' => Motion { target: found, inclusive: false },
            _ => Motion { target: found + 1, inclusive: false },
        };
        Ok(Some(motion))
    }

    /// One key for the operator waiting in vi-delete-pending.
    pub(super) fn pending_operator(&mut self, op: PendingOp, key: char) -> Result<(), ReadlineError> {
        if key.is_ascii_digit() && (key != '0' || self.state.iterations.is_set()) {
            self.state.iterations.add(key);
            self.keep_iterations = true;
            self.state.undo.skip_save();
            return Ok(());
        }
        let count = self.state.iterations.get();
        if key == ESC {
            self.cancel_operator();
            return Ok(());
        }
        if key == op.key() {
            self.whole_line(op);
            return Ok(());
        }
        if key == 'i' || key == 'a' {
            return self.text_object(op, key == 'a');
        }
        let motion = match (op, key) {
            (PendingOp::Change, 'w' | 'W') => Some(self.change_word_end(key == 'W', count)),
            _ => self.motion(key, count)?,
        };
        match motion {
            Some(Motion { target, inclusive }) => {
                let pos = self.state.line.pos();
                let (b, e) = (pos.min(target), pos.max(target));
                let e = if inclusive { (e + 1).min(self.state.line.len()) } else { e };
                self.apply_operator(op, b, e);
            }
            None => self.cancel_operator(),
        }
        Ok(())
    }

    /// `cw` changes to the end of the word under the cursor rather than up
    /// to the next word.
    fn change_word_end(&self, big: bool, count: usize) -> Motion {
        let tok = if big { Tokenizer::Blank } else { Tokenizer::Word };
        let runes = self.state.line.runes();
        let pos = self.state.line.pos();
        let mut target = pos;
        for i in 0..count {
            target = match tok.token_at(runes, target) {
                Some(span) if i == 0 => span.end - 1,
                _ => tok.forward_end(runes, target),
            };
        }
        Motion { target, inclusive: true }
    }

    /// `iw`, `aW`, `i"`, `a(` and friends.
    fn text_object(&mut self, op: PendingOp, around: bool) -> Result<(), ReadlineError> {
        let Some((object, abort)) = self.stream.read_key()? else {
            self.cancel_operator();
            return Ok(());
        };
        let pos = self.state.line.pos();
        let line = &self.state.line;
        let selection = &mut self.state.selection;
        let selected = !abort
            && match object {
                'w' => selection.select_token(line, Tokenizer::Word, pos, around),
                'W' => selection.select_token(line, Tokenizer::Blank, pos, around),
                '"' | '\'' | '`' => selection.select_surround(line, object, object, pos, around),
                '(' | ')' | 'b' => selection.select_surround(line, '(', ')', pos, around),
                '[' | ']' => selection.select_surround(line, '[', ']', pos, around),
                '{' | '}' | 'B' => selection.select_surround(line, '{', '}', pos, around),
                '<' | '>' => selection.select_surround(line, '<', '>', pos, around),
                _ => false,
            };
        match self.state.selection.pop(&self.state.line) {
            Some((_, b, e)) if selected => self.apply_operator(op, b, e),
            _ => self.cancel_operator(),
        }
        Ok(())
    }

    /// Apply `op` to the current line (`dd`, `cc`, `yy`, `S`).
    fn whole_line(&mut self, op: PendingOp) {
        let pos = self.state.line.pos();
        let b = self.state.line.line_start(pos);
        let e = self.state.line.line_end(pos);
        self.apply_operator(op, b, e);
    }

    fn apply_operator(&mut self, op: PendingOp, b: usize, e: usize) {
        debug!(target: "actions.command", op = ?op, len = e - b, "operator");
        if b == e {
            self.state.undo.skip_save();
            self.state.mode = match op {
                PendingOp::Change => Mode::Insert,
                PendingOp::Delete | PendingOp::Yank => Mode::ViCommand,
            };
            return;
        }
        match op {
            PendingOp::Delete => {
                self.kill(b, e);
                self.state.mode = Mode::ViCommand;
            }
            PendingOp::Change => {
                self.kill(b, e);
                self.state.mode = Mode::Insert;
            }
            PendingOp::Yank => {
                self.state.undo.skip_save();
                self.copy(b, e);
                self.state.line.set(b);
                self.state.mode = Mode::ViCommand;
            }
        }
    }

    fn cancel_operator(&mut self) {
        self.state.undo.skip_save();
        self.state.mode = Mode::ViCommand;
        trace!(target: "actions.dispatch", "operator_cancelled");
    }
}

fn toggle_case(c: char) -> char {
    if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c.to_uppercase().next().unwrap_or(c)
    }
}
