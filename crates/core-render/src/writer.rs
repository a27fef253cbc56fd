//! Batched terminal output.
//!
//! Commands are collected for one redraw and queued to the output in order,
//! followed by a single flush. All movement is relative to the current cursor
//! row since the line is drawn inline, not on an alternate screen.

use anyhow::Result;
use crossterm::{
    cursor::{MoveDown, MoveTo, MoveToColumn, MoveUp, RestorePosition, SavePosition},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Up(u16),
    Down(u16),
    Column(u16),
    Home,
    ClearBelow,
    ClearAll,
    Save,
    Restore,
    /// Raw-mode line break.
    NewLine,
    Print(String),
    Reversed(String),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn up(&mut self, rows: u16) {
        if rows > 0 {
            self.cmds.push(Command::Up(rows));
        }
    }

    pub fn down(&mut self, rows: u16) {
        if rows > 0 {
            self.cmds.push(Command::Down(rows));
        }
    }

    pub fn column(&mut self, col: u16) {
        self.cmds.push(Command::Column(col));
    }

    pub fn push(&mut self, cmd: Command) {
        self.cmds.push(cmd);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn reversed<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Reversed(s));
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn flush<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::Up(n) => queue!(out, MoveUp(n))?,
                Command::Down(n) => queue!(out, MoveDown(n))?,
                Command::Column(col) => queue!(out, MoveToColumn(col))?,
                Command::Home => queue!(out, MoveTo(0, 0))?,
                Command::ClearBelow => queue!(out, Clear(ClearType::FromCursorDown))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
                Command::Save => queue!(out, SavePosition)?,
                Command::Restore => queue!(out, RestorePosition)?,
                Command::NewLine => queue!(out, Print("\r\n"))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::Reversed(s) => queue!(
                    out,
                    SetAttribute(Attribute::Reverse),
                    Print(s),
                    SetAttribute(Attribute::NoReverse)
                )?,
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prints_and_zero_moves_are_dropped() {
        let mut w = Writer::new();
        w.print("");
        w.up(0);
        w.down(0);
        w.print("x");
        assert_eq!(w.commands(), &[Command::Print("x".into())]);
    }

    #[test]
    fn flush_writes_text_in_order() {
        let mut w = Writer::new();
        w.print("ab");
        w.push(Command::NewLine);
        w.print("c");
        let mut out = Vec::new();
        w.flush(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ab\r\nc");
    }
}
