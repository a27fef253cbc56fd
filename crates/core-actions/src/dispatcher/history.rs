//! History walking and history token insertion.

use super::LineEditor;
use core_state::Tokenizer;
use tracing::trace;

impl LineEditor {
    /// Move between lines of a multi-line buffer, falling back to history
    /// when the cursor is already on the first (or last) line.
    pub(super) fn history_or_line_move(&mut self, delta: isize) {
        let line = &self.state.line;
        let pos = line.pos();
        let on_edge = if delta < 0 {
            line.line_start(pos) == 0
        } else {
            line.line_end(pos) == line.len()
        };
        if on_edge {
            self.walk_history(delta);
        } else {
            self.state.line.line_move(delta);
        }
    }

    /// Replace the line with the history entry `delta` steps away. Leaving
    /// the end of history stores the line being edited; returning restores it.
    pub(super) fn walk_history(&mut self, delta: isize) {
        let len = self.history.len();
        let target = (self.history_pos as isize + delta).clamp(0, len as isize) as usize;
        if target == self.history_pos {
            return;
        }
        if self.history_pos >= len {
            self.history_draft = Some(self.state.line.text());
        }
        let text = if target == len {
            self.history_draft.clone().unwrap_or_default()
        } else {
            match self.history.get(target) {
                Some(text) => text,
                None => return,
            }
        };
        self.state.line.set_line(&text, text.chars().count());
        self.history_pos = target;
        trace!(target: "actions.command", index = target, total = len, "history_walk");
    }

    /// Insert the Nth blank-separated token of the most recent history line,
    /// N being the digit that invoked the command.
    pub(super) fn insert_history_token(&mut self) {
        let n = self
            .stream
            .caller()
            .last()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(1) as usize;
        let last = self.history.len().checked_sub(1).and_then(|i| self.history.get(i));
        let token: Option<Vec<char>> = last.and_then(|line| {
            let runes: Vec<char> = line.chars().collect();
            Tokenizer::Blank
                .spans(&runes)
                .get(n.saturating_sub(1))
                .map(|span| runes[span.clone()].to_vec())
        });
        match token {
            Some(token) => self.state.line.insert_at_cursor(&token),
            None => self.state.undo.skip_save(),
        }
    }
}
