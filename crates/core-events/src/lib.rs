//! Key constants, terminal escape sequences and telemetry counters shared by
//! the line editor crates.

use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters. Inspected by tests and logged by the binary on exit.
// -------------------------------------------------------------------------------------------------
pub static DEVICE_READS: AtomicU64 = AtomicU64::new(0); // successful non-empty device reads
pub static KEYS_READ: AtomicU64 = AtomicU64::new(0); // keys decoded from device bytes
pub static CURSOR_QUERIES: AtomicU64 = AtomicU64::new(0);
pub static CURSOR_QUERY_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static MACRO_REPLAYS: AtomicU64 = AtomicU64::new(0);
pub static COMMANDS_DISPATCHED: AtomicU64 = AtomicU64::new(0);
pub static MULTILINE_PASTES: AtomicU64 = AtomicU64::new(0);

/// Size of one device read.
pub const READ_CHUNK: usize = 1024;

/// Control characters and other fixed keys.
pub mod keys {
    pub const CTRL_A: char = '\x01';
    pub const CTRL_B: char = '\x02';
    pub const CTRL_C: char = '\x03';
    pub const CTRL_D: char = '\x04';
    pub const CTRL_E: char = '\x05';
    pub const CTRL_F: char = '\x06';
    pub const CTRL_G: char = '\x07';
    pub const BACKSPACE: char = '\x08';
    pub const TAB: char = '\t';
    pub const LINE_FEED: char = '\n';
    pub const CTRL_K: char = '\x0b';
    pub const CTRL_L: char = '\x0c';
    pub const CARRIAGE_RETURN: char = '\r';
    pub const CTRL_N: char = '\x0e';
    pub const CTRL_P: char = '\x10';
    pub const CTRL_Q: char = '\x11';
    pub const CTRL_R: char = '\x12';
    pub const CTRL_T: char = '\x14';
    pub const CTRL_U: char = '\x15';
    pub const CTRL_V: char = '\x16';
    pub const CTRL_W: char = '\x17';
    pub const CTRL_X: char = '\x18';
    pub const CTRL_Y: char = '\x19';
    pub const ESC: char = '\x1b';
    pub const CTRL_RIGHT_BRACKET: char = '\x1d';
    pub const CTRL_UNDERSCORE: char = '\x1f';
    pub const DELETE: char = '\x7f';

    /// Control character for an ASCII letter (`ctrl('a') == '\x01'`).
    pub const fn ctrl(c: char) -> char {
        ((c as u8) & 0x1f) as char
    }

    pub fn is_line_break(c: char) -> bool {
        c == CARRIAGE_RETURN || c == LINE_FEED
    }
}

/// Escape sequences emitted by terminals for special keys, plus the cursor
/// position query.
pub mod seq {
    pub const ARROW_UP: &str = "\x1b[A";
    pub const ARROW_DOWN: &str = "\x1b[B";
    pub const ARROW_RIGHT: &str = "\x1b[C";
    pub const ARROW_LEFT: &str = "\x1b[D";
    pub const HOME: &str = "\x1b[H";
    pub const END: &str = "\x1b[F";
    pub const HOME_ALT: &str = "\x1b[1~";
    pub const END_ALT: &str = "\x1b[4~";
    pub const INSERT: &str = "\x1b[2~";
    pub const DELETE: &str = "\x1b[3~";
    pub const SHIFT_TAB: &str = "\x1b[Z";
    pub const CURSOR_QUERY: &str = "\x1b[6n";
}
