//! Pasted multi-line input: accumulation across saturated reads, the
//! accept/reject/preview prompt and the split into per-line replays.

use super::LineEditor;
use crate::ReadlineError;
use core_events::MULTILINE_PASTES;
use core_events::keys::is_line_break;
use std::sync::atomic::Ordering;
use tracing::debug;

const PROMPT: &str = "Do you wish to proceed (yes|no|preview)? [y/n/p] ";
const INVALID: &str = "Invalid response. Please answer `y` (yes), `n` (no) or `p` (preview)";

/// Outcome of one multiline step of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PasteStep {
    /// No paste in progress; dispatch keys normally.
    None,
    /// The paste continues in the next read.
    More,
    /// The user declined; the paste was dropped.
    Rejected,
    /// The user accepted; the first line to replay.
    Accepted(String),
}

/// Whether `keys` hold a line break before their last key.
fn is_multiline(keys: &[char]) -> bool {
    keys.split_last()
        .is_some_and(|(_, head)| head.iter().any(|&c| is_line_break(c)))
}

/// Split on runs of CR/LF, dropping empty segments.
fn split_lines(text: &str) -> Vec<String> {
    text.split(is_line_break)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Preview,
    Invalid,
}

fn answer(key: char) -> Answer {
    match key {
        'y' | 'Y' => Answer::Yes,
        'n' | 'N' => Answer::No,
        'p' | 'P' => Answer::Preview,
        _ => Answer::Invalid,
    }
}

impl LineEditor {
    /// Detect, accumulate and confirm a multi-line paste from device keys.
    pub(super) fn paste_step(&mut self) -> Result<PasteStep, ReadlineError> {
        if self.paste.is_empty() && !is_multiline(&self.stream.peek_pending()) {
            return Ok(PasteStep::None);
        }
        if self.paste.is_empty() {
            MULTILINE_PASTES.fetch_add(1, Ordering::Relaxed);
        }
        self.paste.extend(self.stream.drain_pending());
        if self.stream.last_read_saturated() {
            debug!(target: "actions.multiline", len = self.paste.len(), "paste_continues");
            return Ok(PasteStep::More);
        }

        let text: String = std::mem::take(&mut self.paste).into_iter().collect();
        debug!(target: "actions.multiline", bytes = text.len(), "paste_complete");
        if self.settings.input.confirm_multiline && !self.confirm_paste(&text)? {
            debug!(target: "actions.multiline", "paste_rejected");
            return Ok(PasteStep::Rejected);
        }

        let mut lines = split_lines(&text).into_iter();
        let Some(first) = lines.next() else {
            return Ok(PasteStep::Rejected);
        };
        self.multisplit.extend(lines);
        debug!(target: "actions.multiline", queued = self.multisplit.len(), "paste_accepted");
        Ok(PasteStep::Accepted(first))
    }

    /// Ask until the user answers yes or no. End of input counts as no.
    fn confirm_paste(&mut self, text: &str) -> Result<bool, ReadlineError> {
        self.renderer.clear_helpers();
        self.renderer.notice(&format!(
            "WARNING: {} bytes of multiline data was dumped into the shell!",
            text.len()
        ));
        loop {
            self.renderer.notice(PROMPT);
            let Some((key, _)) = self.stream.read_key()? else {
                self.stream.flush_used();
                return Ok(false);
            };
            self.stream.flush_used();
            match answer(key) {
                Answer::Yes => return Ok(true),
                Answer::No => return Ok(false),
                Answer::Preview => self.renderer.notice(&text.replace('\r', "\r\n")),
                Answer::Invalid => self.renderer.notice(INVALID),
            }
        }
    }
}
