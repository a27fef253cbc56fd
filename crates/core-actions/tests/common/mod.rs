#![allow(dead_code)] // Shared across integration test binaries; each binary uses a subset of helpers.

use core_actions::LineEditor;
use core_config::{Config, EditingStyle};
use core_input::{KeyStream, MemoryDevice};
use core_state::{Completer, EditorError, ExternalEditor, History, HistoryError, Renderer, View};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Renderer call, as observed by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Render {
        line: String,
        cursor: usize,
        hint: Option<String>,
    },
    Notice(String),
    ClearHelpers,
    Accept(String),
    FreshLine,
    ClearScreen,
}

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Notice(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every hint shown by a render, in order.
    pub fn hints(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Render { hint: Some(h), .. } => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    /// Line text of every render, in order.
    pub fn rendered_lines(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Render { line, .. } => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.0.borrow().iter().filter(|e| *e == wanted).count()
    }
}

pub struct RecordingRenderer(pub Log);

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &View<'_>) {
        self.0.0.borrow_mut().push(Event::Render {
            line: view.line.iter().collect(),
            cursor: view.cursor,
            hint: view.hint.map(str::to_string),
        });
    }

    fn notice(&mut self, text: &str) {
        self.0.0.borrow_mut().push(Event::Notice(text.to_string()));
    }

    fn clear_helpers(&mut self) {
        self.0.0.borrow_mut().push(Event::ClearHelpers);
    }

    fn accept(&mut self, line: &str) {
        self.0.0.borrow_mut().push(Event::Accept(line.to_string()));
    }

    fn fresh_line(&mut self) {
        self.0.0.borrow_mut().push(Event::FreshLine);
    }

    fn clear_screen(&mut self) {
        self.0.0.borrow_mut().push(Event::ClearScreen);
    }
}

/// History whose lines stay visible to the test after the editor takes it.
#[derive(Clone, Default)]
pub struct SharedHistory(Rc<RefCell<Vec<String>>>);

impl SharedHistory {
    pub fn with(lines: &[&str]) -> Self {
        Self(Rc::new(RefCell::new(lines.iter().map(|l| l.to_string()).collect())))
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl History for SharedHistory {
    fn write(&mut self, line: &str) -> Result<usize, HistoryError> {
        let mut lines = self.0.borrow_mut();
        lines.push(line.to_string());
        Ok(lines.len() - 1)
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }

    fn get(&self, index: usize) -> Option<String> {
        self.0.borrow().get(index).cloned()
    }
}

/// Completer over a fixed word list, recording commits.
pub struct WordCompleter {
    pub words: Vec<String>,
    pub committed: Rc<RefCell<Vec<String>>>,
}

impl WordCompleter {
    pub fn new(words: &[&str]) -> (Self, Rc<RefCell<Vec<String>>>) {
        let committed = Rc::new(RefCell::new(Vec::new()));
        let completer = Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            committed: committed.clone(),
        };
        (completer, committed)
    }
}

impl Completer for WordCompleter {
    fn candidates(&mut self, _line: &str, _cursor: usize, prefix: &str) -> Vec<String> {
        self.words.iter().filter(|w| w.starts_with(prefix)).cloned().collect()
    }

    fn commit(&mut self, candidate: &str) {
        self.committed.borrow_mut().push(candidate.to_string());
    }
}

/// External editor backed by a closure.
pub struct FnEditor<F>(pub F);

impl<F> ExternalEditor for FnEditor<F>
where
    F: FnMut(&str) -> Result<String, EditorError>,
{
    fn edit(&mut self, text: &str) -> Result<String, EditorError> {
        (self.0)(text)
    }
}

pub struct Session {
    pub editor: LineEditor,
    pub log: Log,
    pub history: SharedHistory,
}

impl Session {
    pub fn read(&mut self) -> String {
        self.editor.read_line().expect("line accepted")
    }
}

/// Emacs session over scripted device chunks, cursor queries off.
pub fn session(chunks: &[&str]) -> Session {
    session_with(chunks, SharedHistory::default(), |_| {})
}

pub fn vi_session(chunks: &[&str]) -> Session {
    session_with(chunks, SharedHistory::default(), |cfg| {
        cfg.file.editing.mode = EditingStyle::Vi;
    })
}

pub fn session_with(chunks: &[&str], history: SharedHistory, tweak: impl FnOnce(&mut Config)) -> Session {
    let mut config = Config::default();
    config.file.input.cursor_query = false;
    tweak(&mut config);
    let log = Log::default();
    let stream = Arc::new(KeyStream::new(MemoryDevice::new(chunks.iter().copied())));
    let editor = LineEditor::new(
        stream,
        &config,
        Box::new(RecordingRenderer(log.clone())),
        Box::new(history.clone()),
    );
    Session { editor, log, history }
}
