//! Keyboard macro recording and replay.

use crate::key_stream::KeyStream;
use core_events::MACRO_REPLAYS;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

/// Default cap on nested `run_last_macro` calls within one replay chain.
pub const MACRO_RECURSION_LIMIT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    #[error("macro recursion limit reached ({depth} > {limit})")]
    RecursionLimit { depth: usize, limit: usize },
}

#[derive(Debug)]
pub struct MacroEngine {
    recording: bool,
    current: Vec<char>,
    last: Vec<char>,
    depth: usize,
    limit: usize,
}

impl Default for MacroEngine {
    fn default() -> Self {
        Self::new(MACRO_RECURSION_LIMIT)
    }
}

impl MacroEngine {
    pub fn new(limit: usize) -> Self {
        Self {
            recording: false,
            current: Vec::new(),
            last: Vec::new(),
            depth: 0,
            limit,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn start_record(&mut self) {
        self.recording = true;
        self.current.clear();
        debug!(target: "input.macro", "record_start");
    }

    /// Commit the recorded keys as the last macro.
    pub fn stop_record(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;
        self.last = std::mem::take(&mut self.current);
        debug!(target: "input.macro", keys = self.last.len(), "record_stop");
    }

    /// Append keys of a command that ran while recording.
    pub fn record(&mut self, keys: &[char]) {
        if self.recording {
            self.current.extend_from_slice(keys);
        }
    }

    pub fn last_macro(&self) -> &[char] {
        &self.last
    }

    /// Replay the last macro ahead of any queued keys.
    pub fn run_last_macro(&mut self, keys: &KeyStream) -> Result<(), MacroError> {
        self.depth += 1;
        if self.depth > self.limit {
            warn!(target: "input.macro", depth = self.depth, limit = self.limit, "recursion_limit");
            return Err(MacroError::RecursionLimit {
                depth: self.depth,
                limit: self.limit,
            });
        }
        if self.last.is_empty() {
            return Ok(());
        }
        keys.feed(true, &self.last);
        MACRO_REPLAYS.fetch_add(1, Ordering::Relaxed);
        debug!(target: "input.macro", keys = self.last.len(), depth = self.depth, "replay");
        Ok(())
    }

    /// Called when the replayed keys are exhausted.
    pub fn reset_depth(&mut self) {
        self.depth = 0;
    }

    /// Last macro in inputrc notation.
    pub fn describe_last(&self) -> String {
        inputrc_notation(&self.last)
    }
}

/// Keys in inputrc notation (`\C-x`, `\e`, `\C-?`).
pub fn inputrc_notation(keys: &[char]) -> String {
    let mut out = String::with_capacity(keys.len());
    for &c in keys {
        match c {
            '\x1b' => out.push_str("\\e"),
            '\x7f' => out.push_str("\\C-?"),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => {
                out.push_str("\\C-");
                out.push(char::from(b'`' + c as u8));
            }
            c => out.push(c),
        }
    }
    out
}
