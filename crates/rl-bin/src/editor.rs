//! `$VISUAL` / `$EDITOR` as the external editor collaborator.

use core_state::{EditorError, ExternalEditor};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::Write;
use std::process::Command;
use tracing::debug;

pub struct SystemEditor {
    command: String,
    /// Raw mode is on around `edit` calls and must be dropped for the child.
    raw: bool,
}

impl SystemEditor {
    pub fn from_env(raw: bool) -> Self {
        let command = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string());
        Self { command, raw }
    }

    fn run(&self, path: &std::path::Path) -> Result<(), EditorError> {
        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| EditorError::Failed("no editor configured".into()))?;
        let status = Command::new(program)
            .args(words)
            .arg(path)
            .status()
            .map_err(|e| EditorError::Failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(EditorError::Failed(format!("{program} exited with {status}")))
        }
    }
}

impl ExternalEditor for SystemEditor {
    fn edit(&mut self, text: &str) -> Result<String, EditorError> {
        let mut file = tempfile::Builder::new()
            .prefix("rline-")
            .suffix(".sh")
            .tempfile()
            .map_err(|e| EditorError::Failed(e.to_string()))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| EditorError::Failed(e.to_string()))?;
        debug!(target: "runtime", editor = %self.command, path = %file.path().display(), "external_edit");

        if self.raw {
            let _ = disable_raw_mode();
        }
        let outcome = self.run(file.path());
        if self.raw {
            let _ = enable_raw_mode();
        }
        outcome?;

        std::fs::read_to_string(file.path()).map_err(|e| EditorError::Failed(e.to_string()))
    }
}
