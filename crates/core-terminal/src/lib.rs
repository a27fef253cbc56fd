//! Raw terminal mode and the stdin/stdout input device.
//!
//! The line editor draws inline (no alternate screen), so entering the
//! terminal only switches raw mode on; `TerminalGuard` switches it back off
//! when dropped.

use anyhow::Result;
use core_input::InputDevice;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Read, Write};
use tracing::debug;

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

pub struct RawModeBackend {
    entered: bool,
}

/// RAII guard restoring cooked mode even if the caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut RawModeBackend,
}

impl Default for RawModeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RawModeBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn is_raw(&self) -> bool {
        self.entered
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }
}

impl TerminalBackend for RawModeBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
            debug!(target: "runtime", "raw_mode_on");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "runtime", "raw_mode_off");
        }
        Ok(())
    }
}

impl Drop for RawModeBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}

/// Process stdin/stdout as the key stream's device.
///
/// Reads block until the terminal delivers bytes; in raw mode that is one
/// keypress (or one pasted burst) at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioDevice;

impl InputDevice for StdioDevice {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        io::stdin().lock().read(buf)
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(bytes)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_backend_is_not_raw() {
        let backend = RawModeBackend::new();
        assert!(!backend.is_raw());
    }

    #[test]
    fn leave_without_enter_is_a_no_op() {
        let mut backend = RawModeBackend::default();
        backend.leave().unwrap();
        assert!(!backend.is_raw());
    }
}
