//! Terminal capability probing, run once at startup.
//!
//! A session is interactive only when both stdin and stdout are terminals;
//! otherwise the binary skips raw mode and the cursor position query.

use std::io::IsTerminal;

pub const DEFAULT_COLUMNS: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub interactive: bool,
    pub columns: u16,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
        let columns = crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .ok()
            .filter(|cols| *cols > 0)
            .unwrap_or(DEFAULT_COLUMNS);
        Self {
            interactive,
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_reports_positive_width() {
        let caps = TerminalCapabilities::detect();
        assert!(caps.columns > 0);
    }
}
