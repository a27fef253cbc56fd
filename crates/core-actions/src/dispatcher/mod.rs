//! Dispatcher: the session control loop and mode router.
//!
//! Decomposition:
//! * `mod.rs`    - `LineEditor`, the per-key loop, binding resolution and
//!   `editor_input`, the only place that routes by `Mode`
//! * `emacs`     - commands shared by the emacs and vi-insert keymaps
//! * `vi`        - vi-command commands, motions and the pending operator
//! * `history`   - history walking and history token insertion
//! * `search`    - search and tab-completion sub-modes
//! * `multiline` - pasted multi-line input accumulation and confirmation
//!
//! One loop iteration handles one run of keys: custom overrides, multiline
//! detection, interrupt keys, sub-mode keys, then one resolved command.
//! The undo snapshot for the step is taken after the command unless the
//! command asked to skip it.

use crate::{OverrideHandler, OverrideResult, ReadlineError};
use core_config::{Config, ConfigFile, EditingStyle};
use core_events::COMMANDS_DISPATCHED;
use core_events::keys::{BACKSPACE, CTRL_C, CTRL_D, DELETE, ESC, is_line_break};
use core_input::{KeyStream, MacroEngine};
use core_keymap::{KeymapId, Keymaps, Resolution};
use core_state::{
    Completer, EditorState, ExternalEditor, History, Mode, Renderer, SubMode,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, trace, warn};

mod emacs;
mod history;
mod multiline;
mod search;
mod vi;

/// What the loop does once a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// Accept the current line and return it.
    Accept,
}

/// One interactive line editing session.
pub struct LineEditor {
    stream: Arc<KeyStream>,
    keymaps: Keymaps,
    state: EditorState,
    macros: MacroEngine,
    settings: ConfigFile,
    style: EditingStyle,
    renderer: Box<dyn Renderer>,
    history: Box<dyn History>,
    completer: Option<Box<dyn Completer>>,
    editor: Option<Box<dyn ExternalEditor>>,
    overrides: HashMap<String, OverrideHandler>,
    /// Keys of a multi-line paste still being read.
    paste: Vec<char>,
    /// Accepted paste lines returned by the next `read_line` calls.
    multisplit: VecDeque<String>,
    cursor_query: bool,
    history_pos: usize,
    history_draft: Option<String>,
    /// Runes overwritten in replace-many mode, for backspace.
    replace_cache: Vec<char>,
    /// Line length when replace-many started.
    replace_origin: usize,
    /// Set by count-building commands so the step keeps `iterations`.
    keep_iterations: bool,
}

impl LineEditor {
    pub fn new(
        stream: Arc<KeyStream>,
        config: &Config,
        renderer: Box<dyn Renderer>,
        history: Box<dyn History>,
    ) -> Self {
        let settings = config.file.clone();
        Self {
            stream,
            keymaps: Keymaps::default(),
            state: EditorState::new(settings.editing.kill_ring_max),
            macros: MacroEngine::new(settings.macros.recursion_limit),
            style: settings.editing.mode,
            cursor_query: settings.input.cursor_query,
            settings,
            renderer,
            history,
            completer: None,
            editor: None,
            overrides: HashMap::new(),
            paste: Vec::new(),
            multisplit: VecDeque::new(),
            history_pos: 0,
            history_draft: None,
            replace_cache: Vec::new(),
            replace_origin: 0,
            keep_iterations: false,
        }
    }

    pub fn with_completer(mut self, completer: Box<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn with_editor(mut self, editor: Box<dyn ExternalEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    /// Register a handler run when a read yields exactly `keys`.
    pub fn bind_override(
        &mut self,
        keys: &str,
        handler: impl FnMut(&str, &str, usize) -> OverrideResult + 'static,
    ) {
        self.overrides.insert(keys.to_string(), Box::new(handler));
    }

    /// Bind a key sequence to a command name in one keymap.
    pub fn bind_key(&mut self, id: KeymapId, keys: &str, command: &str) {
        self.keymaps.bind(id, keys, command);
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn stream(&self) -> &Arc<KeyStream> {
        &self.stream
    }

    pub fn macros(&self) -> &MacroEngine {
        &self.macros
    }

    pub fn style(&self) -> EditingStyle {
        self.style
    }

    pub fn set_style(&mut self, style: EditingStyle) {
        self.style = style;
    }

    /// Whether the next line start will query the cursor position.
    pub fn cursor_query_enabled(&self) -> bool {
        self.cursor_query
    }

    /// Read one line. Returns `Eof` at end of input and `Interrupted` on Ctrl-C.
    pub fn read_line(&mut self) -> Result<String, ReadlineError> {
        self.begin_line();
        if let Some(next) = self.multisplit.pop_front() {
            return self.replay_line(&next);
        }
        self.query_cursor();
        self.render();

        loop {
            self.state.undo.begin_step();
            if !self.stream.has_macro_keys() {
                self.macros.reset_depth();
            }
            if !self.stream.wait_available_keys()? {
                self.renderer.clear_helpers();
                return Err(ReadlineError::Eof);
            }

            let raw: String = self.stream.peek_all().into_iter().collect();
            if self.paste.is_empty()
                && let Some(result) = self.run_override(&raw)
            {
                if result.close {
                    self.renderer.clear_helpers();
                    return Ok(self.state.line.text());
                }
                if !result.forward_key {
                    self.render();
                    continue;
                }
            }

            match self.paste_step()? {
                multiline::PasteStep::None => {}
                multiline::PasteStep::More => continue,
                multiline::PasteStep::Rejected => {
                    self.render();
                    continue;
                }
                multiline::PasteStep::Accepted(first) => return self.replay_line(&first),
            }

            match self.stream.peek() {
                Some(CTRL_C) => {
                    self.consume(1);
                    if self.state.sub_mode.is_active() {
                        self.state.sub_mode = SubMode::None;
                        self.renderer.clear_helpers();
                        self.render();
                        continue;
                    }
                    self.renderer.clear_helpers();
                    debug!(target: "actions.dispatch", "interrupted");
                    return Err(ReadlineError::Interrupted {
                        line: self.state.line.text(),
                    });
                }
                Some(CTRL_D) => {
                    self.consume(1);
                    self.renderer.clear_helpers();
                    return Err(ReadlineError::Eof);
                }
                Some(_) => {}
                None => continue,
            }

            if self.state.sub_mode.is_active() && self.sub_mode_input()? {
                self.state.undo.save(&self.state.line);
                self.render();
                continue;
            }

            self.keep_iterations = false;
            let flow = self.dispatch_keys()?;
            if self.state.mode.is_vi_command() {
                self.state.line.check_command();
            }
            if !self.keep_iterations {
                self.state.iterations.reset();
            }
            if flow == Flow::Accept {
                return Ok(self.accept_line());
            }
            self.state.undo.save(&self.state.line);
            self.render();
        }
    }

    fn begin_line(&mut self) {
        self.state.reset_line(Mode::Insert);
        self.state.undo.save(&self.state.line);
        self.history_pos = self.history.len();
        self.history_draft = None;
        self.replace_cache.clear();
        self.paste.clear();
    }

    /// Ask the renderer for a fresh row when the prompt would not start at
    /// column 1. A terminal that does not answer disables further queries.
    fn query_cursor(&mut self) {
        if !self.cursor_query {
            return;
        }
        match self.stream.get_cursor_pos() {
            Some(pos) if pos.x != 1 => self.renderer.fresh_line(),
            Some(_) => {}
            None => self.cursor_query = false,
        }
    }

    fn render(&mut self) {
        self.renderer.render(&self.state.view());
    }

    fn consume(&self, n: usize) {
        for _ in 0..n {
            if self.stream.pop().is_none() {
                break;
            }
        }
        self.stream.flush_used();
    }

    fn run_override(&mut self, raw: &str) -> Option<OverrideResult> {
        let handler = self.overrides.get_mut(raw)?;
        let line = self.state.line.text();
        let result = handler(raw, &line, self.state.line.pos());
        debug!(target: "actions.dispatch", keys = raw.chars().count(), forward = result.forward_key, close = result.close, "override");
        self.state.line.set_line(&result.new_line, result.new_pos);
        if result.clear_helpers {
            self.renderer.clear_helpers();
        }
        if let Some(hint) = &result.hint {
            self.state.hint = Some(hint.clone());
        }
        if result.close || !result.forward_key {
            self.consume(raw.chars().count());
        }
        Some(result)
    }

    /// Finish the line: notify the renderer and write history.
    fn accept_line(&mut self) -> String {
        let line = self.state.line.text();
        self.state.sub_mode = SubMode::None;
        self.renderer.clear_helpers();
        self.renderer.accept(&line);
        if self.settings.history.autowrite {
            match self.history.write(&line) {
                Ok(pos) => self.history_pos = pos + 1,
                Err(e) => self.renderer.notice(&e.to_string()),
            }
        }
        debug!(target: "actions.dispatch", len = line.chars().count(), "line_accepted");
        line
    }

    /// Type `text` into the line in insert mode and accept it.
    fn replay_line(&mut self, text: &str) -> Result<String, ReadlineError> {
        self.state.mode = Mode::Insert;
        let runes: Vec<char> = text.chars().collect();
        self.editor_input(&runes)?;
        Ok(self.accept_line())
    }

    fn keymap_id(&self) -> Option<KeymapId> {
        match (self.state.mode, self.style) {
            (Mode::Insert, EditingStyle::Emacs) => Some(KeymapId::Emacs),
            (Mode::Insert, EditingStyle::Vi) => Some(KeymapId::ViInsert),
            (Mode::ViCommand, _) => Some(KeymapId::ViCommand),
            _ => None,
        }
    }

    /// Resolve the next binding and run it.
    fn dispatch_keys(&mut self) -> Result<Flow, ReadlineError> {
        let Some(id) = self.keymap_id() else {
            return self.bypass_input();
        };
        let mut keys = Vec::new();
        let resolved = loop {
            let Some(key) = self.stream.pop() else {
                break None;
            };
            keys.push(key);
            let more = self.stream.peek().is_some();
            match self.keymaps.resolve(id, &keys) {
                Resolution::Matched { ambiguous: true, .. } if more => continue,
                Resolution::Matched { consumed, command, .. } => break Some((consumed, command.to_string())),
                Resolution::NeedMore { .. } if more => continue,
                Resolution::NeedMore { .. } => {
                    trace!(target: "actions.dispatch", keys = keys.len(), "prefix_wait");
                    self.stream.matched_prefix(&keys);
                    self.state.undo.skip_save();
                    self.keep_iterations = true;
                    return Ok(Flow::Continue);
                }
                Resolution::NoMatch => break None,
            }
        };
        if keys.is_empty() {
            return Ok(Flow::Continue);
        }
        match resolved {
            Some((1, _)) if keys[0] == ESC && keys.get(1) == Some(&'[') => {
                self.swallow_escape_sequence(&keys);
                Ok(Flow::Continue)
            }
            Some((consumed, command)) if command == "prefix-meta" && consumed < keys.len() => {
                // unbound meta key: drop the escape, keep the key
                self.stream.matched_keys(&[], &keys[consumed..]);
                self.state.undo.skip_save();
                Ok(Flow::Continue)
            }
            Some((consumed, command)) => {
                self.stream.matched_keys(&keys[..consumed], &keys[consumed..]);
                self.execute(Some(&command))
            }
            None => {
                self.stream.matched_keys(&keys[..1], &keys[1..]);
                match self.state.mode {
                    Mode::Insert => self.execute(Some("self-insert")),
                    _ => self.execute(None),
                }
            }
        }
    }

    /// Drop an unbound `ESC [ params final` sequence.
    fn swallow_escape_sequence(&mut self, keys: &[char]) {
        let is_final = |c: char| ('\x40'..='\x7e').contains(&c);
        match keys[2..].iter().position(|&c| is_final(c)) {
            Some(i) => self.stream.matched_keys(&[], &keys[2 + i + 1..]),
            None => {
                while let Some(k) = self.stream.pop() {
                    if is_final(k) {
                        break;
                    }
                }
            }
        }
        self.stream.flush_used();
        self.state.undo.skip_save();
        debug!(target: "actions.dispatch", "unbound_escape_sequence");
    }

    /// Modes without a keymap read one key at a time.
    fn bypass_input(&mut self) -> Result<Flow, ReadlineError> {
        let Some(key) = self.stream.pop() else {
            return Ok(Flow::Continue);
        };
        self.stream.matched_keys(&[key], &[]);
        if key == ESC {
            if self.stream.peek() == Some('[') {
                self.swallow_escape_sequence(&[ESC]);
                return Ok(Flow::Continue);
            }
            if let Mode::ViDeletePending(_) = self.state.mode
                && let Some(d) = self.stream.peek().filter(|c| ('1'..='9').contains(c))
            {
                // alt-digit passes a count to the operator
                self.consume(1);
                self.state.iterations.add(d);
                self.keep_iterations = true;
                self.state.undo.skip_save();
                return Ok(Flow::Continue);
            }
            self.leave_bypass_mode();
            self.stream.flush_used();
            return Ok(Flow::Continue);
        }
        if self.state.mode == Mode::ReplaceMany && is_line_break(key) {
            self.stream.flush_used();
            return Ok(Flow::Accept);
        }
        self.execute(None)
    }

    fn leave_bypass_mode(&mut self) {
        self.state.undo.skip_save();
        self.state.mode = match (self.state.mode, self.style) {
            (Mode::ReplaceMany, EditingStyle::Emacs) => Mode::Insert,
            (Mode::ReplaceMany, EditingStyle::Vi) => {
                self.state.line.dec();
                Mode::ViCommand
            }
            _ => Mode::ViCommand,
        };
        self.replace_cache.clear();
        trace!(target: "actions.dispatch", mode = ?self.state.mode, "leave_mode");
    }

    /// Run a command (or the mode's default input path for `None`) on the
    /// keys recorded as matched, then record them into a macro in progress.
    fn execute(&mut self, command: Option<&str>) -> Result<Flow, ReadlineError> {
        let recording = self.macros.is_recording();
        self.state.hint = None;
        let flow = match command {
            Some(name) => self.run_command(name)?,
            None => {
                let keys = self.stream.caller();
                self.editor_input(&keys)?;
                Flow::Continue
            }
        };
        if recording && self.macros.is_recording() {
            let keys = self.stream.caller();
            self.macros.record(&keys);
        }
        self.stream.flush_used();
        if !matches!(command, Some("yank" | "yank-pop")) {
            self.state.last_yank = None;
        }
        Ok(flow)
    }

    fn run_command(&mut self, name: &str) -> Result<Flow, ReadlineError> {
        COMMANDS_DISPATCHED.fetch_add(1, Ordering::Relaxed);
        trace!(target: "actions.command", command = name, mode = ?self.state.mode, "run");
        if let Some(flow) = self.emacs_command(name)? {
            return Ok(flow);
        }
        if let Some(flow) = self.vi_command(name)? {
            return Ok(flow);
        }
        warn!(target: "actions.command", command = name, "unknown_command");
        self.state.undo.skip_save();
        Ok(Flow::Continue)
    }

    /// Route runes that no binding claimed by the current mode.
    fn editor_input(&mut self, keys: &[char]) -> Result<(), ReadlineError> {
        match self.state.mode {
            Mode::ViCommand => {
                trace!(target: "actions.dispatch", keys = keys.len(), "vi_unbound_ignored");
                self.state.undo.skip_save();
            }
            Mode::ViDeletePending(op) => {
                if let Some(&key) = keys.first() {
                    self.pending_operator(op, key)?;
                }
            }
            Mode::ReplaceOnce => {
                self.state.mode = Mode::ViCommand;
                if let Some(&key) = keys.first() {
                    let pos = self.state.line.pos();
                    if pos < self.state.line.len() {
                        self.state.line.cut_rune(pos);
                    }
                    let width = self.state.line.insert_quoted(key);
                    self.state.line.set(self.state.line.pos() - width);
                }
            }
            Mode::ReplaceMany => {
                for &key in keys {
                    self.overwrite(key);
                }
            }
            Mode::Insert => {
                for &key in keys {
                    self.state.line.insert_quoted(key);
                }
            }
        }
        Ok(())
    }

    /// One key of replace-many mode.
    fn overwrite(&mut self, key: char) {
        let line = &mut self.state.line;
        if key == DELETE || key == BACKSPACE {
            if line.pos() > self.replace_origin {
                line.dec();
                line.cut_rune(line.pos());
            } else if line.pos() > 0 {
                line.dec();
            }
            if line.pos() < self.replace_origin
                && let Some(restored) = self.replace_cache.pop()
            {
                let pos = line.pos();
                line.replace(pos, pos + 1, &[restored]);
                line.set(pos);
            }
            return;
        }
        let pos = line.pos();
        if let Some(old) = line.char_at(pos) {
            self.replace_cache.push(old);
            line.cut_rune(pos);
        }
        line.insert_quoted(key);
    }

    /// Enter replace-many, remembering the line length for backspace.
    fn start_overwrite(&mut self) {
        self.replace_cache.clear();
        self.replace_origin = self.state.line.len();
        self.state.mode = Mode::ReplaceMany;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_input::MemoryDevice;
    use core_state::{MemoryHistory, View};

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&mut self, _view: &View<'_>) {}
        fn notice(&mut self, _text: &str) {}
        fn clear_helpers(&mut self) {}
        fn accept(&mut self, _line: &str) {}
        fn fresh_line(&mut self) {}
    }

    fn editor(chunks: &[&str]) -> LineEditor {
        let mut config = Config::default();
        config.file.input.cursor_query = false;
        let stream = Arc::new(KeyStream::new(MemoryDevice::new(chunks.iter().copied())));
        LineEditor::new(stream, &config, Box::new(NullRenderer), Box::new(MemoryHistory::new()))
    }

    #[test]
    fn lone_escape_in_vi_insert_enters_command_mode() {
        let mut ed = editor(&["ab", "\x1b", "x\r"]);
        ed.set_style(EditingStyle::Vi);
        assert_eq!(ed.read_line().unwrap(), "a");
    }

    #[test]
    fn unbound_csi_sequence_is_dropped_whole() {
        let mut ed = editor(&["a\x1b[15~b\r"]);
        assert_eq!(ed.read_line().unwrap(), "ab");
    }

    #[test]
    fn prefix_split_across_reads_resolves() {
        let mut ed = editor(&["abc", "\x1b[", "D", "X\r"]);
        assert_eq!(ed.read_line().unwrap(), "abXc");
    }

    #[test]
    fn eof_ends_the_session() {
        let mut ed = editor(&["abc"]);
        assert!(ed.read_line().unwrap_err().is_eof());
    }
}
