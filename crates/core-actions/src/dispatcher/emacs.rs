//! Commands bound in the emacs and vi-insert keymaps.
//!
//! Every command reads its count from `iterations`, mutates the line through
//! `EditBuffer`/`Selection` and feeds removed text to the kill ring. Commands
//! that leave the text unchanged skip the undo save for their step.

use super::{Flow, LineEditor};
use crate::ReadlineError;
use core_config::EditingStyle;
use core_events::keys::ESC;
use core_input::inputrc_notation;
use core_keymap::{KeymapId, Resolution};
use core_state::{EditorError, Mode, SearchKind, SubMode, Tokenizer, switch_keyword};
use tracing::{debug, trace};

fn closing_pair(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '\'' | '"' => Some(c),
        _ => None,
    }
}

impl LineEditor {
    /// Run `name` if it is a command of this set.
    pub(super) fn emacs_command(&mut self, name: &str) -> Result<Option<Flow>, ReadlineError> {
        let count = self.state.iterations.get();
        match name {
            // Motion
            "forward-char" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    self.state.line.inc();
                }
            }
            "backward-char" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    self.state.line.dec();
                }
            }
            "forward-word" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    let end = self.state.line.forward_end(Tokenizer::Word);
                    self.state.line.set(end + 1);
                }
            }
            "backward-word" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    let start = self.state.line.backward(Tokenizer::Word);
                    self.state.line.set(start);
                }
            }
            "shell-forward-word" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    let end = self.state.line.forward(Tokenizer::Shell);
                    self.state.line.set(end);
                }
            }
            "shell-backward-word" => {
                self.state.undo.skip_save();
                for _ in 0..count {
                    let start = self.state.line.backward(Tokenizer::Shell);
                    self.state.line.set(start);
                }
            }
            "beginning-of-line" => {
                self.state.undo.skip_save();
                self.state.line.beginning_of_line();
            }
            "end-of-line" => {
                self.state.undo.skip_save();
                self.state.line.end_of_line_append();
            }
            "clear-screen" => {
                self.state.undo.skip_save();
                self.renderer.clear_screen();
            }
            "accept-line" => return Ok(Some(Flow::Accept)),
            "vi-command-mode" => {
                self.state.undo.skip_save();
                if self.state.mode == Mode::Insert {
                    self.state.line.dec();
                }
                self.state.mode = Mode::ViCommand;
                self.state.selection.reset();
                trace!(target: "actions.dispatch", "enter_vi_command");
            }

            // Changing text
            "self-insert" => {
                for key in self.stream.caller() {
                    for _ in 0..count {
                        self.state.line.insert_quoted(key);
                    }
                }
            }
            "tab-insert" => {
                for _ in 0..count {
                    self.state.line.insert_at_cursor(&['\t']);
                }
            }
            "quoted-insert" => {
                self.state.undo.skip_save();
                if let Some((key, _)) = self.stream.read_key()? {
                    self.state.line.insert_quoted(key);
                }
            }
            "delete-char" => {
                for _ in 0..count {
                    let pos = self.state.line.pos();
                    self.state.line.cut_rune(pos);
                }
            }
            "backward-delete-char" => self.backward_delete_char(count),
            "forward-backward-delete-char" => {
                if self.state.line.pos() == self.state.line.len() {
                    self.backward_delete_char(count);
                } else {
                    let pos = self.state.line.pos();
                    self.state.line.cut_rune(pos);
                }
            }
            "transpose-chars" => self.transpose_chars(),
            "transpose-words" => self.transpose_tokens(Tokenizer::Word),
            "shell-transpose-words" => self.transpose_tokens(Tokenizer::Shell),
            "upcase-word" => self.map_word(|c| c.to_uppercase().next().unwrap_or(c), false),
            "downcase-word" => self.map_word(|c| c.to_lowercase().next().unwrap_or(c), false),
            "capitalize-word" => self.map_word(|c| c.to_uppercase().next().unwrap_or(c), true),
            "overwrite-mode" => {
                if self.state.mode == Mode::ReplaceMany {
                    self.state.mode = Mode::Insert;
                } else {
                    self.start_overwrite();
                }
            }
            "delete-horizontal-whitespace" => {
                let runes = self.state.line.runes();
                let pos = self.state.line.pos();
                let before = runes[..pos].iter().rev().take_while(|c| c.is_whitespace()).count();
                let after = runes[pos..].iter().take_while(|c| c.is_whitespace()).count();
                self.state.line.cut(pos - before, pos + after);
            }
            "delete-word" => {
                let pos = self.state.line.pos();
                let end = self.state.line.forward_end(Tokenizer::Word);
                self.state.line.cut(pos, end + 1);
            }
            "quote-region" => {
                if self.region() && self.state.selection.surround(&mut self.state.line, '\'', '\'') {
                    self.state.line.inc();
                }
            }
            "quote-line" => self.quote_line(),
            "keyword-increase" => self.keyword_switch(true, count),
            "keyword-decrease" => self.keyword_switch(false, count),
            "insert-comment" => {
                self.insert_comment();
                return Ok(Some(Flow::Accept));
            }

            // Killing and yanking
            "kill-line" => {
                let pos = self.state.line.pos();
                let end = self.state.line.line_end(pos);
                self.kill(pos, end);
            }
            "backward-kill-line" => {
                let pos = self.state.line.pos();
                let start = self.state.line.line_start(pos);
                self.kill(start, pos);
            }
            "kill-whole-line" | "kill-buffer" => {
                if self.state.line.is_empty() {
                    self.state.undo.skip_save();
                } else {
                    let len = self.state.line.len();
                    self.kill(0, len);
                }
            }
            "kill-word" => {
                let pos = self.state.line.pos();
                let end = self.state.line.forward(Tokenizer::Word);
                self.kill(pos, end);
            }
            "backward-kill-word" => {
                let pos = self.state.line.pos();
                let start = self.state.line.backward(Tokenizer::Word);
                self.kill(start, pos);
            }
            "unix-word-rubout" => {
                let pos = self.state.line.pos();
                let start = self.state.line.backward(Tokenizer::Blank);
                self.kill(start, pos);
            }
            "shell-kill-word" => {
                let pos = self.state.line.pos();
                let end = self.state.line.forward(Tokenizer::Shell);
                self.kill(pos, end);
            }
            "shell-backward-kill-word" => {
                let pos = self.state.line.pos();
                let start = self.state.line.backward(Tokenizer::Shell);
                self.kill(start, pos);
            }
            "kill-region" => {
                if self.region()
                    && let Some(text) = self.state.selection.cut(&mut self.state.line)
                {
                    self.state.kill_ring.write(text);
                }
            }
            "copy-region-as-kill" => {
                self.state.undo.skip_save();
                if self.region() {
                    let text = self.state.selection.text(&self.state.line);
                    self.state.kill_ring.write(text);
                    self.state.selection.reset();
                }
            }
            "copy-backward-word" => {
                self.state.undo.skip_save();
                let pos = self.state.line.pos();
                let start = self.state.line.backward(Tokenizer::Word);
                self.copy(start, pos);
            }
            "copy-forward-word" => {
                self.state.undo.skip_save();
                let pos = self.state.line.pos();
                let end = self.state.line.forward(Tokenizer::Word);
                self.copy(pos, end);
            }
            "copy-prev-shell-word" => {
                let pos = self.state.line.pos();
                let runes = self.state.line.runes();
                let word: Option<Vec<char>> = Tokenizer::Shell
                    .spans(runes)
                    .into_iter()
                    .rev()
                    .find(|span| span.end <= pos)
                    .map(|span| runes[span].to_vec());
                match word {
                    Some(word) => self.state.line.insert_at_cursor(&word),
                    None => self.state.undo.skip_save(),
                }
            }
            "yank" => self.yank(count),
            "yank-pop" => self.yank_pop(),

            // Arguments and macros
            "digit-argument" => {
                self.state.undo.skip_save();
                for key in self.stream.caller() {
                    self.state.iterations.add(key);
                }
                self.keep_iterations = true;
            }
            "start-kbd-macro" => {
                self.state.undo.skip_save();
                self.macros.start_record();
            }
            "end-kbd-macro" => {
                self.state.undo.skip_save();
                self.macros.stop_record();
            }
            "call-last-kbd-macro" => {
                self.state.undo.skip_save();
                if let Err(e) = self.macros.run_last_macro(&self.stream) {
                    self.state.hint = Some(e.to_string());
                }
            }
            "print-last-kbd-macro" => {
                self.state.undo.skip_save();
                let described = self.macros.describe_last();
                self.renderer.clear_helpers();
                self.renderer.notice(&described);
            }
            "abort" => {
                self.state.undo.skip_save();
                self.state.iterations.reset();
                self.state.selection.reset();
                self.state.sub_mode = SubMode::None;
                self.renderer.clear_helpers();
            }
            "prefix-meta" => self.prefix_meta()?,
            "do-lowercase-version" => self.do_lowercase_version(),
            "dump-functions" => self.dump_functions(),
            "dump-variables" => self.dump_variables(),
            "dump-macros" => self.dump_macros(),

            // Undo, mark and search
            "undo" => {
                self.state.undo.undo(&mut self.state.line);
            }
            "redo" => {
                self.state.undo.redo(&mut self.state.line);
            }
            "revert-line" => {
                self.state.undo.revert(&mut self.state.line);
            }
            "set-mark" => {
                self.state.undo.skip_save();
                self.state.line.set_mark();
            }
            "exchange-point-and-mark" => {
                self.state.undo.skip_save();
                if self.state.line.exchange_mark() {
                    if let Some(mark) = self.state.line.mark() {
                        let pos = self.state.line.pos();
                        self.state.selection.mark_range(mark, pos);
                        self.state.selection.visual(false);
                    }
                } else {
                    // no mark yet: start one at the beginning of the line
                    let pos = self.state.line.pos();
                    self.state.line.set(0);
                    self.state.line.set_mark();
                    self.state.line.set(pos);
                }
            }
            "character-search" => self.character_search(true, count)?,
            "character-search-backward" => self.character_search(false, count)?,

            // External editor
            "edit-command-line" => {
                if self.edit_externally() && self.style == EditingStyle::Emacs {
                    self.state.mode = Mode::Insert;
                }
            }
            "edit-and-execute-command" => {
                if self.edit_externally() {
                    return Ok(Some(Flow::Accept));
                }
            }

            // History and completion
            "previous-history" => {
                self.state.undo.skip_save();
                self.history_or_line_move(-(count as isize));
            }
            "next-history" => {
                self.state.undo.skip_save();
                self.history_or_line_move(count as isize);
            }
            "insert-history-token" => self.insert_history_token(),
            "history-search" => self.enter_search(SearchKind::History),
            "completion-search" => self.enter_search(SearchKind::Completion),
            "complete" => self.complete(false),
            "menu-complete-backward" => self.complete(true),
            _ => return Ok(None),
        }
        Ok(Some(Flow::Continue))
    }

    /// Make the selection cover the region, from the mark when no selection
    /// is active. Returns false when there is neither.
    fn region(&mut self) -> bool {
        if self.state.selection.is_active() {
            return true;
        }
        match self.state.line.mark() {
            Some(mark) => {
                let pos = self.state.line.pos();
                self.state.selection.mark_range(mark, pos);
                true
            }
            None => false,
        }
    }

    pub(super) fn kill(&mut self, b: usize, e: usize) {
        let text = self.state.line.cut(b, e);
        trace!(target: "actions.command", len = text.chars().count(), "kill");
        self.state.kill_ring.write(text);
    }

    pub(super) fn copy(&mut self, b: usize, e: usize) {
        let (b, e) = (b.min(e), b.max(e));
        let text: String = self.state.line.runes()[b..e].iter().collect();
        self.state.kill_ring.write(text);
    }

    /// Delete before the cursor. A lone opening quote or bracket also takes
    /// its closing pair when that sits under the cursor.
    fn backward_delete_char(&mut self, count: usize) {
        let pos = self.state.line.pos();
        if pos == 0 {
            self.state.undo.skip_save();
            return;
        }
        if count == 1 {
            let before = self.state.line.char_at(pos - 1);
            let under = self.state.line.char_at(pos);
            let pair = before.and_then(closing_pair).is_some_and(|close| under == Some(close));
            let end = if pair { pos + 1 } else { pos };
            self.state.line.cut(pos - 1, end);
            return;
        }
        let start = pos.saturating_sub(count);
        self.state.line.cut(start, pos);
    }

    fn transpose_chars(&mut self) {
        let pos = self.state.line.pos();
        let len = self.state.line.len();
        if pos == 0 || len < 2 {
            self.state.undo.skip_save();
            return;
        }
        let at = if pos == len { pos - 1 } else { pos };
        let (Some(left), Some(right)) = (self.state.line.char_at(at - 1), self.state.line.char_at(at)) else {
            return;
        };
        self.state.line.replace(at - 1, at + 1, &[right, left]);
        self.state.line.set(at + 1);
    }

    /// Swap the token before point with the one after it, or the last two
    /// tokens when point is past the last one.
    fn transpose_tokens(&mut self, tok: Tokenizer) {
        let pos = self.state.line.pos();
        let runes = self.state.line.runes();
        let spans = tok.spans(runes);
        let right = spans
            .iter()
            .position(|span| span.start >= pos)
            .or_else(|| spans.iter().position(|span| span.contains(&pos)).map(|i| i + 1))
            .filter(|&i| i < spans.len())
            .unwrap_or(spans.len().saturating_sub(1));
        if right == 0 || spans.len() < 2 {
            self.state.undo.skip_save();
            return;
        }
        let (l, r) = (spans[right - 1].clone(), spans[right].clone());
        let mut swapped: Vec<char> = Vec::with_capacity(r.end - l.start);
        swapped.extend_from_slice(&runes[r.clone()]);
        swapped.extend_from_slice(&runes[l.end..r.start]);
        swapped.extend_from_slice(&runes[l.clone()]);
        self.state.line.replace(l.start, r.end, &swapped);
        self.state.line.set(r.end);
    }

    /// Map the word under or after the cursor, leaving the cursor in place.
    /// `first_only` limits the mapping to its first rune.
    fn map_word(&mut self, f: impl Fn(char) -> char, first_only: bool) {
        let pos = self.state.line.pos();
        let runes = self.state.line.runes();
        let Some(span) = Tokenizer::Word.spans(runes).into_iter().find(|span| span.end > pos) else {
            self.state.undo.skip_save();
            return;
        };
        let start = span.start.max(pos);
        let end = if first_only { start + 1 } else { span.end };
        self.state.selection.mark_range(start, end);
        self.state.selection.replace_with(&mut self.state.line, f);
        self.state.line.set(pos);
    }

    fn quote_line(&mut self) {
        if self.state.line.is_empty() {
            self.state.undo.skip_save();
            return;
        }
        let end = self.state.line.line_end(0);
        self.state.line.map_runes(0, end, |c| if c == '\'' { '"' } else { c });
        self.state.line.insert(0, &['\'']);
        let len = self.state.line.len();
        self.state.line.insert(len, &['\'']);
    }

    /// Prefix the line with the comment string, or with a count remove it
    /// again when already present.
    fn insert_comment(&mut self) {
        let comment: Vec<char> = self.settings.editing.comment_begin.chars().collect();
        let pos = self.state.line.pos();
        let start = self.state.line.line_start(pos);
        let present = self.state.line.runes()[start..].starts_with(&comment);
        if self.state.iterations.is_set() && present {
            self.state.line.cut(start, start + comment.len());
        } else {
            self.state.line.insert(start, &comment);
        }
    }

    fn yank(&mut self, count: usize) {
        let Some(text) = self.state.kill_ring.active().map(|s| s.chars().collect::<Vec<char>>()) else {
            self.state.undo.skip_save();
            return;
        };
        let start = self.state.line.pos();
        for _ in 0..count {
            self.state.line.insert_at_cursor(&text);
        }
        self.state.last_yank = Some((start, self.state.line.pos()));
    }

    /// Replace the text of the previous yank with the next older kill.
    fn yank_pop(&mut self) {
        let Some((b, e)) = self.state.last_yank else {
            self.state.undo.skip_save();
            return;
        };
        let Some(text) = self.state.kill_ring.rotate().map(|s| s.chars().collect::<Vec<char>>()) else {
            return;
        };
        self.state.line.replace(b, e, &text);
        self.state.last_yank = Some((b, b + text.len()));
    }

    /// Read one key and re-inject it behind an escape, so the pair resolves
    /// as a meta binding.
    fn prefix_meta(&mut self) -> Result<(), ReadlineError> {
        self.state.undo.skip_save();
        let Some((key, abort)) = self.stream.read_key()? else {
            return Ok(());
        };
        if abort {
            return Ok(());
        }
        let meta = [ESC, key];
        match self.keymaps.resolve(KeymapId::Emacs, &meta) {
            Resolution::Matched { consumed: 1, .. } | Resolution::NoMatch => self.stream.feed(true, &[key]),
            _ => self.stream.feed(true, &meta),
        }
        // the re-fed keys are recorded when they dispatch
        self.stream.flush_used();
        Ok(())
    }

    /// Re-dispatch a meta-uppercase key as its lowercase meta binding.
    fn do_lowercase_version(&mut self) {
        self.state.undo.skip_save();
        let mut keys = self.stream.caller();
        let at = usize::from(keys.len() > 1 && keys[0] == ESC);
        let Some(key) = keys.get(at).copied() else {
            return;
        };
        let lower = key.to_lowercase().next().unwrap_or(key);
        if lower == key {
            return;
        }
        keys[at] = lower;
        keys.truncate(at + 1);
        self.stream.feed(true, &keys);
        self.stream.flush_used();
    }

    /// Replace the number, boolean or operator under the cursor by its
    /// `count`th successor and leave the cursor on its last rune.
    fn keyword_switch(&mut self, increase: bool, count: usize) {
        let pos = self.state.line.pos();
        let Some(switch) = switch_keyword(self.state.line.runes(), pos, increase, count) else {
            self.state.undo.skip_save();
            return;
        };
        let text: Vec<char> = switch.text.chars().collect();
        trace!(target: "actions.command", from = switch.range.start, to = switch.range.end, increase, "keyword_switch");
        self.state.line.replace(switch.range.start, switch.range.end, &text);
        self.state.line.set(switch.range.start + text.len().saturating_sub(1));
    }

    fn active_keymap(&self) -> KeymapId {
        self.keymap_id().unwrap_or(match self.style {
            EditingStyle::Emacs => KeymapId::Emacs,
            EditingStyle::Vi => KeymapId::ViInsert,
        })
    }

    /// List the bindings of the active keymap, as inputrc lines with a count.
    fn dump_functions(&mut self) {
        self.state.undo.skip_save();
        let inputrc = self.state.iterations.is_set();
        let bindings = self.keymaps.get(self.active_keymap()).bindings();
        self.renderer.clear_helpers();
        if inputrc {
            for (keys, command) in &bindings {
                self.renderer.notice(&format!("\"{}\": {command}", inputrc_notation(keys)));
            }
            return;
        }
        for group in bindings.chunk_by(|a, b| a.1 == b.1) {
            let keys: Vec<String> = group
                .iter()
                .map(|(keys, _)| format!("\"{}\"", inputrc_notation(keys)))
                .collect();
            self.renderer.notice(&format!("{} can be found on {}.", group[0].1, keys.join(", ")));
        }
    }

    /// List every setting and its value, as TOML lines with a count.
    fn dump_variables(&mut self) {
        self.state.undo.skip_save();
        let inputrc = self.state.iterations.is_set();
        self.renderer.clear_helpers();
        for (name, value) in self.settings.variables() {
            let line = match (inputrc, value.as_str()) {
                (true, _) => format!("{name} = {value}"),
                (false, Some(text)) => format!("{name} is set to `{text}'"),
                (false, None) => format!("{name} is set to `{value}'"),
            };
            self.renderer.notice(&line);
        }
    }

    /// Show the last macro under every key sequence that replays it.
    fn dump_macros(&mut self) {
        self.state.undo.skip_save();
        self.renderer.clear_helpers();
        if self.macros.last_macro().is_empty() {
            return;
        }
        let inputrc = self.state.iterations.is_set();
        let described = self.macros.describe_last();
        let bindings = self.keymaps.get(self.active_keymap()).bindings();
        for (keys, _) in bindings.iter().filter(|(_, command)| *command == "call-last-kbd-macro") {
            let keys = inputrc_notation(keys);
            let line = if inputrc {
                format!("\"{keys}\": \"{described}\"")
            } else {
                format!("{keys} outputs {described}")
            };
            self.renderer.notice(&line);
        }
    }

    /// Move to the `count`th occurrence of a key read from the stream.
    fn character_search(&mut self, forward: bool, count: usize) -> Result<(), ReadlineError> {
        self.state.undo.skip_save();
        let Some((target, abort)) = self.stream.read_key()? else {
            return Ok(());
        };
        if abort {
            return Ok(());
        }
        if let Some(found) = find_char(self.state.line.runes(), self.state.line.pos(), target, forward, count) {
            self.state.line.set(found);
        }
        Ok(())
    }

    /// Hand the line to the external editor. Failures keep the line, set a
    /// hint and skip the undo save.
    fn edit_externally(&mut self) -> bool {
        let text = self.state.line.text();
        let result = match self.editor.as_mut() {
            Some(editor) => editor.edit(&text),
            None => Err(EditorError::Failed("no external editor configured".to_string())),
        };
        let edited = match result {
            Ok(edited) if edited.is_empty() && !text.is_empty() => Err(EditorError::EmptyResult),
            other => other,
        };
        match edited {
            Ok(edited) => {
                let edited = edited.strip_suffix('\n').unwrap_or(&edited);
                self.state.line.set_line(edited, edited.chars().count());
                true
            }
            Err(e) => {
                debug!(target: "actions.command", error = %e, "editor_failed");
                self.state.undo.skip_save();
                self.state.hint = Some(format!("Editor error: {}", e.to_string().replace('\n', "")));
                false
            }
        }
    }
}

/// Offset of the `count`th `target` strictly after (or before) `pos`.
pub(super) fn find_char(runes: &[char], pos: usize, target: char, forward: bool, count: usize) -> Option<usize> {
    let n = count.max(1) - 1;
    if forward {
        (pos + 1..runes.len()).filter(|&i| runes[i] == target).nth(n)
    } else {
        (0..pos.min(runes.len())).rev().filter(|&i| runes[i] == target).nth(n)
    }
}
