//! Inline line renderer over crossterm.
//!
//! Draws the prompt and the edited line in place, helper rows (hint, vi mode,
//! search and completion menus) underneath, then parks the terminal cursor on
//! the line cursor. Each redraw moves back to the prompt row, clears to the end
//! of the screen and repaints the whole block.

use core_state::{Renderer, View};
use std::io::Write;
use tracing::{trace, warn};

pub mod helpers;
pub mod layout;
pub mod writer;

use helpers::{compose_helpers, format_helpers};
use layout::{TAB_WIDTH, position_after, rune_width, str_width};
use writer::{Command, Writer};

pub const DEFAULT_COLUMNS: u16 = 80;

pub struct LineRenderer<W: Write> {
    out: W,
    prompt: String,
    columns: u16,
    /// Something of the current block is on screen.
    drawn: bool,
    /// Block-relative row the terminal cursor sits on.
    cursor_row: usize,
    /// Block-relative row the line ends on.
    line_end_row: usize,
    helper_rows: usize,
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Prefix of `text` that fits in `cols - 1` cells, so helper rows never wrap.
fn fit(text: &str, cols: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|&c| {
            used += rune_width(c);
            used < cols
        })
        .collect()
}

impl<W: Write> LineRenderer<W> {
    pub fn new(out: W, prompt: impl Into<String>) -> Self {
        Self {
            out,
            prompt: prompt.into(),
            columns: DEFAULT_COLUMNS,
            drawn: false,
            cursor_row: 0,
            line_end_row: 0,
            helper_rows: 0,
        }
    }

    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_columns(&mut self, columns: u16) {
        self.columns = columns.max(1);
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn reset(&mut self) {
        self.drawn = false;
        self.cursor_row = 0;
        self.line_end_row = 0;
        self.helper_rows = 0;
    }

    fn flush(&mut self, w: Writer) {
        if let Err(e) = w.flush(&mut self.out) {
            warn!(target: "render", error = %e, "flush_failed");
        }
    }

    /// Rows from the terminal cursor down to the last row of the block.
    fn rows_below(&self) -> usize {
        (self.line_end_row + self.helper_rows).saturating_sub(self.cursor_row)
    }

    fn draw_line(w: &mut Writer, line: &[char], selection: Option<(usize, usize)>) {
        let (sel_b, sel_e) = selection
            .map(|(b, e)| (b.min(line.len()), e.min(line.len())))
            .unwrap_or((0, 0));
        let mut run = String::new();
        let mut run_selected = false;
        fn emit(w: &mut Writer, run: &mut String, selected: bool) {
            let text = std::mem::take(run);
            if selected {
                w.reversed(text);
            } else {
                w.print(text);
            }
        }
        for (i, &c) in line.iter().enumerate() {
            let selected = i >= sel_b && i < sel_e;
            if selected != run_selected {
                emit(w, &mut run, run_selected);
                run_selected = selected;
            }
            match c {
                '\n' => {
                    emit(w, &mut run, run_selected);
                    w.push(Command::NewLine);
                }
                '\t' => run.extend(std::iter::repeat_n(' ', TAB_WIDTH)),
                _ => run.push(c),
            }
        }
        emit(w, &mut run, run_selected);
    }

    fn draw(&mut self, view: &View<'_>) -> Writer {
        let cols = usize::from(self.columns);
        let prompt_width = str_width(&self.prompt);
        let mut w = Writer::new();

        if self.drawn {
            w.up(to_u16(self.cursor_row));
        }
        w.column(0);
        w.push(Command::ClearBelow);
        w.print(self.prompt.clone());
        Self::draw_line(&mut w, view.line, view.selection);

        let (end_row, end_col) = position_after(prompt_width, view.line, cols);
        // a full last row leaves the terminal in pending wrap; force the break
        if end_col == 0 && end_row > 0 && view.line.last() != Some(&'\n') {
            w.push(Command::NewLine);
        }

        let rows = format_helpers(&compose_helpers(view));
        for row in &rows {
            w.push(Command::NewLine);
            let text = fit(&row.text, cols);
            if row.highlighted {
                w.reversed(text);
            } else {
                w.print(text);
            }
        }

        let cursor = view.cursor.min(view.line.len());
        let (cur_row, cur_col) = position_after(prompt_width, &view.line[..cursor], cols);
        w.up(to_u16(end_row + rows.len() - cur_row));
        w.column(to_u16(cur_col));

        self.drawn = true;
        self.cursor_row = cur_row;
        self.line_end_row = end_row;
        self.helper_rows = rows.len();
        w
    }
}

impl<W: Write> Renderer for LineRenderer<W> {
    fn render(&mut self, view: &View<'_>) {
        trace!(target: "render", len = view.line.len(), cursor = view.cursor, "render");
        let w = self.draw(view);
        self.flush(w);
    }

    fn notice(&mut self, text: &str) {
        let mut w = Writer::new();
        if self.drawn {
            w.down(to_u16(self.rows_below()));
            w.push(Command::NewLine);
        }
        w.push(Command::ClearBelow);
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                w.push(Command::NewLine);
            }
            w.print(part.trim_end_matches('\r'));
        }
        w.push(Command::NewLine);
        self.reset();
        self.flush(w);
    }

    fn clear_helpers(&mut self) {
        if self.helper_rows == 0 {
            return;
        }
        let mut w = Writer::new();
        w.push(Command::Save);
        w.down(to_u16(self.line_end_row + 1 - self.cursor_row));
        w.column(0);
        w.push(Command::ClearBelow);
        w.push(Command::Restore);
        self.helper_rows = 0;
        self.flush(w);
    }

    fn accept(&mut self, line: &str) {
        trace!(target: "render", len = line.len(), "accept");
        let mut w = Writer::new();
        if self.drawn {
            w.down(to_u16(self.line_end_row.saturating_sub(self.cursor_row)));
        }
        w.push(Command::NewLine);
        w.push(Command::ClearBelow);
        self.reset();
        self.flush(w);
    }

    fn fresh_line(&mut self) {
        let mut w = Writer::new();
        w.push(Command::NewLine);
        self.reset();
        self.flush(w);
    }

    fn clear_screen(&mut self) {
        let mut w = Writer::new();
        w.push(Command::ClearAll);
        w.push(Command::Home);
        self.reset();
        self.flush(w);
    }
}
