use std::io;

/// Why `read_line` returned without an accepted line.
#[derive(Debug, thiserror::Error)]
pub enum ReadlineError {
    /// The input device reached end of input, or Ctrl-D was typed.
    #[error("end of input")]
    Eof,
    /// Ctrl-C; `line` holds the buffer as it was.
    #[error("interrupted")]
    Interrupted { line: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReadlineError {
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadlineError::Eof)
    }
}
