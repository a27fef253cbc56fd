//! Editing session state: line, selection, undo history, kill ring and mode.
//!
//! One `EditorState` is owned per session and passed explicitly to every
//! command; nothing here is process-wide.

pub mod collab;
pub mod kill_ring;
pub mod selection;
pub mod undo;

pub use collab::{
    Completer, EditorError, ExternalEditor, History, HistoryError, MemoryHistory, Renderer, View,
};
pub use core_text::{EditBuffer, KeywordSwitch, Tokenizer, switch_keyword};
pub use kill_ring::{KILL_RING_MAX, KillRing};
pub use selection::Selection;
pub use undo::{UndoHistory, UndoItem};

/// Operator waiting for its motion in vi-delete-pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Delete,
    Change,
    Yank,
}

impl PendingOp {
    /// Key that both starts the operator and, doubled, applies it to the line.
    pub fn key(self) -> char {
        match self {
            PendingOp::Delete => 'd',
            PendingOp::Change => 'c',
            PendingOp::Yank => 'y',
        }
    }
}

/// Current editing mode. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Text entry (also the only mode of the emacs keymap).
    #[default]
    Insert,
    /// Vi normal mode.
    ViCommand,
    /// Vi operator waiting for a motion.
    ViDeletePending(PendingOp),
    /// Replace the rune under the cursor with the next key (vi `r`).
    ReplaceOnce,
    /// Overwrite runes until Escape (vi `R`, emacs overwrite-mode).
    ReplaceMany,
}

impl Mode {
    pub fn is_vi_command(self) -> bool {
        matches!(self, Mode::ViCommand)
    }
}

/// Highlighted candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub candidates: Vec<String>,
    pub selected: usize,
}

impl Menu {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            selected: 0,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = (self.selected + 1) % self.candidates.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = (self.selected + self.candidates.len() - 1) % self.candidates.len();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    History,
    Completion,
}

/// UI sub-modes orthogonal to `Mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubMode {
    #[default]
    None,
    /// Incremental filter over history lines or completion candidates.
    Search {
        kind: SearchKind,
        filter: String,
        menu: Menu,
    },
    /// Tab-completion menu; `start` is where the completed token begins.
    Completion { menu: Menu, start: usize },
}

impl SubMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, SubMode::None)
    }
}

/// Numeric argument accumulated from digit keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Iterations {
    digits: String,
}

impl Iterations {
    pub fn add(&mut self, digit: char) {
        if digit.is_ascii_digit() && !(digit == '0' && self.digits.is_empty()) {
            self.digits.push(digit);
        }
    }

    pub fn is_set(&self) -> bool {
        !self.digits.is_empty()
    }

    /// Count to apply, 1 when unset.
    pub fn get(&self) -> usize {
        self.digits.parse().unwrap_or(1).max(1)
    }

    /// Read and clear.
    pub fn take(&mut self) -> usize {
        let n = self.get();
        self.digits.clear();
        n
    }

    pub fn reset(&mut self) {
        self.digits.clear();
    }
}

/// Session object owning every mutable editing field.
#[derive(Debug, Default)]
pub struct EditorState {
    pub line: EditBuffer,
    pub selection: Selection,
    pub undo: UndoHistory,
    pub kill_ring: KillRing,
    pub mode: Mode,
    pub sub_mode: SubMode,
    pub iterations: Iterations,
    pub hint: Option<String>,
    /// Span inserted by the last yank or yank-pop, for yank-pop replacement.
    pub last_yank: Option<(usize, usize)>,
}

impl EditorState {
    pub fn new(kill_ring_max: usize) -> Self {
        Self {
            kill_ring: KillRing::new(kill_ring_max),
            ..Self::default()
        }
    }

    /// Clear per-line state while keeping the kill ring.
    pub fn reset_line(&mut self, mode: Mode) {
        self.line.clear();
        self.selection.reset();
        self.undo.reset();
        self.mode = mode;
        self.sub_mode = SubMode::None;
        self.iterations.reset();
        self.hint = None;
        self.last_yank = None;
    }

    pub fn view(&self) -> View<'_> {
        View {
            line: self.line.runes(),
            cursor: self.line.pos(),
            hint: self.hint.as_deref(),
            mode: self.mode,
            selection: self.selection.pos(&self.line),
            sub_mode: &self.sub_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_accumulate_digits() {
        let mut it = Iterations::default();
        assert_eq!(it.get(), 1);
        it.add('0');
        assert!(!it.is_set());
        it.add('1');
        it.add('2');
        assert_eq!(it.take(), 12);
        assert_eq!(it.get(), 1);
    }

    #[test]
    fn menu_wraps_both_ways() {
        let mut menu = Menu::new(vec!["a".into(), "b".into()]);
        menu.select_prev();
        assert_eq!(menu.current(), Some("b"));
        menu.select_next();
        assert_eq!(menu.current(), Some("a"));
        assert_eq!(Menu::default().current(), None);
    }

    #[test]
    fn reset_line_keeps_kill_ring() {
        let mut state = EditorState::new(4);
        state.line = EditBuffer::from_str("text");
        state.kill_ring.write("kept");
        state.mode = Mode::ViCommand;
        state.reset_line(Mode::Insert);
        assert!(state.line.is_empty());
        assert_eq!(state.kill_ring.active(), Some("kept"));
        assert_eq!(state.mode, Mode::Insert);
    }
}
