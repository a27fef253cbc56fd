//! Search and tab-completion sub-modes.
//!
//! While a sub-mode is active its keys are handled here before any keymap
//! lookup. Keys the sub-mode does not claim close it and fall through to the
//! normal dispatch path.

use super::LineEditor;
use crate::ReadlineError;
use core_events::keys::{BACKSPACE, DELETE, ESC, TAB, is_line_break};
use core_state::{Menu, SearchKind, SubMode};
use tracing::{debug, trace};

/// Sub-mode key classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuKey {
    Leave,
    Apply,
    Erase,
    Next,
    Prev,
    Char(char),
    Other,
}

/// Classify the keys at the head of the stream and report how many of them
/// the class spans.
fn classify(keys: &[char]) -> (MenuKey, usize) {
    match keys {
        [ESC, '[', 'A', ..] => (MenuKey::Prev, 3),
        [ESC, '[', 'B', ..] => (MenuKey::Next, 3),
        [ESC, '[', 'Z', ..] => (MenuKey::Prev, 3),
        [ESC, '[', ..] => (MenuKey::Other, 0),
        [ESC, ..] => (MenuKey::Leave, 1),
        [c, ..] if is_line_break(*c) => (MenuKey::Apply, 1),
        [DELETE | BACKSPACE, ..] => (MenuKey::Erase, 1),
        [TAB, ..] => (MenuKey::Next, 1),
        [c, ..] if !c.is_control() => (MenuKey::Char(*c), 1),
        _ => (MenuKey::Other, 0),
    }
}

impl LineEditor {
    /// Open a search menu over history lines or completion candidates.
    pub(super) fn enter_search(&mut self, kind: SearchKind) {
        self.state.undo.skip_save();
        let candidates = self.search_candidates(kind, "");
        debug!(target: "actions.command", kind = ?kind, candidates = candidates.len(), "search_start");
        self.state.sub_mode = SubMode::Search {
            kind,
            filter: String::new(),
            menu: Menu::new(candidates),
        };
    }

    /// Complete the blank token before the cursor. One candidate is applied
    /// directly; several open the completion menu.
    pub(super) fn complete(&mut self, backward: bool) {
        self.state.undo.skip_save();
        let start = self.token_start();
        let prefix: String = self.state.line.runes()[start..self.state.line.pos()].iter().collect();
        let mut candidates = self.completions(&prefix);
        debug!(target: "actions.command", candidates = candidates.len(), "complete");
        match candidates.len() {
            0 => {}
            1 => {
                let candidate = candidates.remove(0);
                self.apply_candidate(&candidate, start);
            }
            n => {
                let mut menu = Menu::new(candidates);
                if backward {
                    menu.selected = n - 1;
                }
                self.state.sub_mode = SubMode::Completion { menu, start };
            }
        }
    }

    /// Handle one key of the active sub-mode. Returns false when the key was
    /// left for normal dispatch.
    pub(super) fn sub_mode_input(&mut self) -> Result<bool, ReadlineError> {
        let (key, len) = classify(&self.stream.peek_all());
        trace!(target: "actions.dispatch", key = ?key, "sub_mode_key");
        let sub_mode = std::mem::take(&mut self.state.sub_mode);
        let handled = match sub_mode {
            SubMode::Search {
                kind,
                mut filter,
                mut menu,
            } => match key {
                MenuKey::Leave => {
                    self.close_sub_mode();
                    true
                }
                MenuKey::Apply => {
                    if let Some(candidate) = menu.current().map(str::to_string) {
                        match kind {
                            SearchKind::History => {
                                self.state.line.set_line(&candidate, candidate.chars().count());
                            }
                            SearchKind::Completion => {
                                let start = self.token_start();
                                self.apply_candidate(&candidate, start);
                            }
                        }
                    }
                    self.close_sub_mode();
                    true
                }
                MenuKey::Erase | MenuKey::Char(_) => {
                    match key {
                        MenuKey::Char(c) => filter.push(c),
                        _ => {
                            filter.pop();
                        }
                    }
                    let candidates = self.search_candidates(kind, &filter);
                    self.state.sub_mode = SubMode::Search {
                        kind,
                        filter,
                        menu: Menu::new(candidates),
                    };
                    self.state.undo.skip_save();
                    true
                }
                MenuKey::Next | MenuKey::Prev => {
                    if key == MenuKey::Next {
                        menu.select_next();
                    } else {
                        menu.select_prev();
                    }
                    self.state.sub_mode = SubMode::Search { kind, filter, menu };
                    self.state.undo.skip_save();
                    true
                }
                MenuKey::Other => {
                    self.close_sub_mode();
                    false
                }
            },
            SubMode::Completion { mut menu, start } => match key {
                MenuKey::Leave => {
                    self.close_sub_mode();
                    true
                }
                MenuKey::Apply => {
                    if let Some(candidate) = menu.current().map(str::to_string) {
                        self.apply_candidate(&candidate, start);
                    }
                    self.close_sub_mode();
                    true
                }
                MenuKey::Next | MenuKey::Prev => {
                    if key == MenuKey::Next {
                        menu.select_next();
                    } else {
                        menu.select_prev();
                    }
                    self.state.sub_mode = SubMode::Completion { menu, start };
                    self.state.undo.skip_save();
                    true
                }
                MenuKey::Erase | MenuKey::Char(_) | MenuKey::Other => {
                    self.close_sub_mode();
                    false
                }
            },
            SubMode::None => false,
        };
        if handled {
            self.consume(len);
        }
        Ok(handled)
    }

    fn close_sub_mode(&mut self) {
        self.state.sub_mode = SubMode::None;
        self.renderer.clear_helpers();
    }

    /// Start of the blank token ending at the cursor.
    fn token_start(&self) -> usize {
        let pos = self.state.line.pos();
        self.state.line.runes()[..pos]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn completions(&mut self, prefix: &str) -> Vec<String> {
        let line = self.state.line.text();
        let pos = self.state.line.pos();
        match self.completer.as_mut() {
            Some(completer) => completer.candidates(&line, pos, prefix),
            None => Vec::new(),
        }
    }

    /// Candidates containing `filter`: history lines newest first without
    /// repeats, or completions of the token before the cursor.
    fn search_candidates(&mut self, kind: SearchKind, filter: &str) -> Vec<String> {
        match kind {
            SearchKind::History => {
                let mut lines: Vec<String> = Vec::new();
                for i in (0..self.history.len()).rev() {
                    if let Some(line) = self.history.get(i)
                        && line.contains(filter)
                        && !lines.contains(&line)
                    {
                        lines.push(line);
                    }
                }
                lines
            }
            SearchKind::Completion => {
                let start = self.token_start();
                let prefix: String = self.state.line.runes()[start..self.state.line.pos()].iter().collect();
                self.completions(&prefix)
                    .into_iter()
                    .filter(|c| c.contains(filter))
                    .collect()
            }
        }
    }

    /// Replace `[start, cursor)` with `candidate` and tell the completer.
    fn apply_candidate(&mut self, candidate: &str, start: usize) {
        let runes: Vec<char> = candidate.chars().collect();
        let pos = self.state.line.pos();
        self.state.line.replace(start, pos, &runes);
        if let Some(completer) = self.completer.as_mut() {
            completer.commit(candidate);
        }
        trace!(target: "actions.command", len = runes.len(), "candidate_applied");
    }
}
