//! Interfaces to the collaborators the line editor drives but does not own.

use crate::{Mode, SubMode};

/// Snapshot handed to the renderer after each command.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub line: &'a [char],
    pub cursor: usize,
    pub hint: Option<&'a str>,
    pub mode: Mode,
    pub selection: Option<(usize, usize)>,
    pub sub_mode: &'a SubMode,
}

/// Screen output. Purely observational.
pub trait Renderer {
    fn render(&mut self, view: &View<'_>);
    /// One-off message outside the line (prompts, diagnostics).
    fn notice(&mut self, text: &str);
    fn clear_helpers(&mut self);
    /// The line was accepted; finish the display of it.
    fn accept(&mut self, line: &str);
    /// Move to column 1 of a new row before drawing the prompt.
    fn fresh_line(&mut self);
    fn clear_screen(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history write failed: {0}")]
    Write(String),
}

/// Persistent line history, newest at the highest index.
pub trait History {
    fn write(&mut self, line: &str) -> Result<usize, HistoryError>;
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<String>;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Completion candidate source.
pub trait Completer {
    /// Candidates for `prefix`, the blank token ending at the cursor.
    fn candidates(&mut self, line: &str, cursor: usize, prefix: &str) -> Vec<String>;
    /// A candidate was inserted.
    fn commit(&mut self, _candidate: &str) {}
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("editor failed: {0}")]
    Failed(String),
    #[error("editor returned an empty buffer")]
    EmptyResult,
}

/// External text editor invocation.
pub trait ExternalEditor {
    fn edit(&mut self, text: &str) -> Result<String, EditorError>;
}

/// In-memory history.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    lines: Vec<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl History for MemoryHistory {
    fn write(&mut self, line: &str) -> Result<usize, HistoryError> {
        self.lines.push(line.to_string());
        Ok(self.lines.len() - 1)
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn get(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }
}
