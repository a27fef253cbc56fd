use core_text::EditBuffer;
use tracing::trace;

/// Maximum number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// Immutable `{text, cursor}` snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoItem {
    pub text: String,
    pub cursor: usize,
}

impl UndoItem {
    fn capture(buf: &EditBuffer) -> Self {
        Self {
            text: buf.text(),
            cursor: buf.pos(),
        }
    }
}

/// Linear snapshot stack with a pointer. A save after an undo discards the
/// redo tail.
#[derive(Debug, Default)]
pub struct UndoHistory {
    entries: Vec<UndoItem>,
    pointer: usize,
    skip: bool,
    saves_skipped: u64,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of a dispatch step: clears any skip request from the previous one.
    pub fn begin_step(&mut self) {
        self.skip = false;
    }

    /// Suppress the save of the current step.
    pub fn skip_save(&mut self) {
        self.skip = true;
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn saves_skipped(&self) -> u64 {
        self.saves_skipped
    }

    /// Push the buffer state unless skipped or textually identical to the
    /// snapshot under the pointer.
    pub fn save(&mut self, buf: &EditBuffer) {
        if self.skip {
            trace!(target: "state.undo", "save_skipped_by_command");
            return;
        }
        let text = buf.text();
        if self.entries.get(self.pointer).is_some_and(|top| top.text == text) {
            self.saves_skipped += 1;
            trace!(target: "state.undo", pointer = self.pointer, "snapshot_dedupe_skip");
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.pointer + 1);
        }
        self.entries.push(UndoItem {
            text,
            cursor: buf.pos(),
        });
        if self.entries.len() > UNDO_HISTORY_MAX {
            self.entries.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.pointer = self.entries.len() - 1;
        trace!(target: "state.undo", depth = self.entries.len(), pointer = self.pointer, "push_snapshot");
    }

    /// Step back to the previous distinct snapshot. Unsaved changes at the top
    /// of the stack are captured first so they can be redone.
    pub fn undo(&mut self, buf: &mut EditBuffer) -> bool {
        self.skip = true;
        if self.entries.is_empty() {
            return false;
        }
        let current = buf.text();
        if self.pointer + 1 == self.entries.len() && self.entries[self.pointer].text != current {
            self.entries.push(UndoItem::capture(buf));
            self.pointer += 1;
        }
        if self.pointer == 0 {
            return false;
        }
        while self.pointer > 0 {
            self.pointer -= 1;
            if self.entries[self.pointer].text != current {
                break;
            }
        }
        self.restore(buf);
        trace!(target: "state.undo", pointer = self.pointer, depth = self.entries.len(), "undo");
        true
    }

    pub fn redo(&mut self, buf: &mut EditBuffer) -> bool {
        self.skip = true;
        if self.pointer + 1 >= self.entries.len() {
            return false;
        }
        self.pointer += 1;
        self.restore(buf);
        trace!(target: "state.undo", pointer = self.pointer, depth = self.entries.len(), "redo");
        true
    }

    /// Jump to the oldest snapshot.
    pub fn revert(&mut self, buf: &mut EditBuffer) -> bool {
        self.skip = true;
        if self.entries.is_empty() {
            return false;
        }
        if self.pointer + 1 == self.entries.len() && self.entries[self.pointer].text != buf.text() {
            self.entries.push(UndoItem::capture(buf));
        }
        self.pointer = 0;
        self.restore(buf);
        trace!(target: "state.undo", depth = self.entries.len(), "revert");
        true
    }

    /// Forget all snapshots (new line).
    pub fn reset(&mut self) {
        self.entries.clear();
        self.pointer = 0;
        self.skip = false;
    }

    fn restore(&self, buf: &mut EditBuffer) {
        let item = &self.entries[self.pointer];
        buf.set_line(&item.text, item.cursor);
    }
}
