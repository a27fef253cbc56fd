use std::collections::VecDeque;
use tracing::trace;

/// Default ring capacity.
pub const KILL_RING_MAX: usize = 60;

/// Rotating clipboard. Newest slot at index 0; a write resets rotation to it.
#[derive(Debug, Clone)]
pub struct KillRing {
    slots: VecDeque<String>,
    max: usize,
    index: usize,
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new(KILL_RING_MAX)
    }
}

impl KillRing {
    pub fn new(max: usize) -> Self {
        Self {
            slots: VecDeque::new(),
            max: max.max(1),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record killed or copied text. Empty text is ignored.
    pub fn write(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        let rotated = self.slots.len() == self.max;
        if rotated {
            self.slots.pop_back();
        }
        self.slots.push_front(text);
        self.index = 0;
        trace!(target: "state.kill_ring", slots = self.slots.len(), rotated, "write");
    }

    /// Slot under the rotation cursor.
    pub fn active(&self) -> Option<&str> {
        self.slots.get(self.index).map(String::as_str)
    }

    /// Advance to the next-older slot, wrapping to the newest.
    pub fn rotate(&mut self) -> Option<&str> {
        if self.slots.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.slots.len();
        trace!(target: "state.kill_ring", index = self.index, "rotate");
        self.active()
    }

    /// Slots newest first.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(String::as_str)
    }
}
