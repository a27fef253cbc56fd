//! UTF-8 decoding of device reads and incremental recognition of cursor
//! position reports (`ESC [ row ; col R`).

use core_events::keys::ESC;

/// Cursor position reported by the terminal (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub x: u32,
    pub y: u32,
}

/// Decodes device bytes into keys, carrying an incomplete trailing sequence
/// to the next read. Invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<char> {
        let mut data = std::mem::take(&mut self.carry);
        data.extend_from_slice(bytes);
        let mut out = Vec::with_capacity(data.len());
        let mut rest = data.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.extend(s.chars());
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    // from_utf8 already validated this prefix
                    out.extend(String::from_utf8_lossy(valid).chars());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                        None => {
                            self.carry = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Esc,
    Bracket,
    Row(u32),
    Semi(u32),
    Col(u32, u32),
}

/// Incremental cursor report scanner. Keys that are not part of a report
/// pass through in order; a partial report is held until it completes or
/// fails to match.
#[derive(Debug, Default)]
pub struct CursorScan {
    state: State,
    held: Vec<char>,
}

impl CursorScan {
    pub fn is_holding(&self) -> bool {
        !self.held.is_empty()
    }

    /// Feed `keys`, appending ordinary input to `out` and returning completed
    /// reports. With `hold_partial == false` a trailing partial report is
    /// released as input.
    pub fn scan(&mut self, keys: &[char], hold_partial: bool, out: &mut Vec<char>) -> Vec<CursorPos> {
        let mut reports = Vec::new();
        for &c in keys {
            if let Some(pos) = self.push(c, out) {
                reports.push(pos);
            }
        }
        if !hold_partial {
            self.release(out);
        }
        reports
    }

    /// Give up on the held partial report, passing it through as input.
    pub fn release(&mut self, out: &mut Vec<char>) {
        out.append(&mut self.held);
        self.state = State::Idle;
    }

    fn push(&mut self, c: char, out: &mut Vec<char>) -> Option<CursorPos> {
        let digit = c.to_digit(10);
        let next = match (self.state, c, digit) {
            (State::Idle, ESC, _) => Some(State::Esc),
            (State::Idle, _, _) => {
                out.push(c);
                return None;
            }
            (State::Esc, '[', _) => Some(State::Bracket),
            (State::Bracket, _, Some(d)) => Some(State::Row(d)),
            (State::Row(r), _, Some(d)) => Some(State::Row(accumulate(r, d))),
            (State::Row(r), ';', _) => Some(State::Semi(r)),
            (State::Semi(r), _, Some(d)) => Some(State::Col(r, d)),
            (State::Col(r, x), _, Some(d)) => Some(State::Col(r, accumulate(x, d))),
            (State::Col(r, x), 'R', _) => {
                self.held.clear();
                self.state = State::Idle;
                return Some(CursorPos { x, y: r });
            }
            _ => None,
        };
        match next {
            Some(state) => {
                self.held.push(c);
                self.state = state;
                None
            }
            None => {
                self.release(out);
                self.push(c, out)
            }
        }
    }
}

fn accumulate(n: u32, d: u32) -> u32 {
    n.saturating_mul(10).saturating_add(d)
}
