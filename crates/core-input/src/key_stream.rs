//! Key acquisition shared by the dispatcher, argument reads, macro replay and
//! cursor position queries.
//!
//! Two producers feed the stream: the device (decoded into `pending`) and
//! programmatic feeds (`macro_queue`). Consumers prefer `pending`.
//!
//! All fields live behind one mutex that is never held across a device read
//! or a channel receive. At most one device read is outstanding: the party
//! performing it is recorded in `reader`, and a synchronous reader that finds
//! another direct read in progress parks on `read_done` until it ends. A
//! synchronous read that overlaps a background `wait_available_keys` installs
//! a freshly allocated one-shot channel and lets the waiter deliver to it.

use crate::device::InputDevice;
use crate::scan::{CursorPos, CursorScan, Utf8Decoder};
use core_events::keys::ESC;
use core_events::{
    CURSOR_QUERIES, CURSOR_QUERY_FAILURES, DEVICE_READS, KEYS_READ, READ_CHUNK, seq,
};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::Ordering;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reader {
    /// `wait_available_keys` is blocked in the device.
    Wait,
    /// A synchronous `read_key` or `get_cursor_pos` is blocked in the device.
    Direct,
}

#[derive(Default)]
struct Shared {
    pending: VecDeque<char>,
    macro_queue: VecDeque<char>,
    matched: Vec<char>,
    must_wait: bool,
    reader: Option<Reader>,
    /// One-shot hand-off for a `read_key` overlapping a background wait.
    reading: Option<Sender<Vec<char>>>,
    /// One-shot hand-off for an outstanding cursor query.
    cursor: Option<Sender<CursorPos>>,
    query_pending: bool,
    saturated: bool,
    decoder: Utf8Decoder,
    scan: CursorScan,
}

impl Shared {
    /// Decode one device read, route cursor reports and return ordinary keys.
    fn ingest(&mut self, bytes: &[u8]) -> Vec<char> {
        DEVICE_READS.fetch_add(1, Ordering::Relaxed);
        self.saturated = bytes.len() == READ_CHUNK;
        let decoded = self.decoder.decode(bytes);
        let mut keys = Vec::with_capacity(decoded.len());
        let reports = self.scan.scan(&decoded, self.query_pending, &mut keys);
        for pos in reports {
            match self.cursor.take() {
                Some(tx) => {
                    let _ = tx.send(pos);
                }
                None => debug!(target: "input.cursor", x = pos.x, y = pos.y, "unsolicited_report_dropped"),
            }
        }
        KEYS_READ.fetch_add(keys.len() as u64, Ordering::Relaxed);
        trace!(target: "input.keys", bytes = bytes.len(), keys = keys.len(), saturated = self.saturated, "device_read");
        keys
    }

    /// Wake every party blocked on a hand-off channel.
    fn hang_up(&mut self) {
        self.reading = None;
        self.cursor = None;
    }
}

fn is_empty_read(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
}

/// Key acquisition engine over one input device.
pub struct KeyStream {
    device: Box<dyn InputDevice>,
    shared: Mutex<Shared>,
    read_done: Condvar,
}

impl KeyStream {
    pub fn new(device: impl InputDevice + 'static) -> Self {
        Self {
            device: Box::new(device),
            shared: Mutex::new(Shared::default()),
            read_done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until keys are available. Returns `Ok(false)` at end of input.
    ///
    /// Returns at once when `pending` holds keys that are not flagged
    /// must-wait, or when the macro queue is non-empty.
    pub fn wait_available_keys(&self) -> io::Result<bool> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let mut shared = self.lock();
            if (!shared.pending.is_empty() && !shared.must_wait) || !shared.macro_queue.is_empty() {
                return Ok(true);
            }
            if shared.reader.is_some() {
                drop(self.read_done.wait(shared).unwrap_or_else(PoisonError::into_inner));
                continue;
            }
            shared.reader = Some(Reader::Wait);
            drop(shared);

            let result = self.device.read(&mut buf);

            let mut shared = self.lock();
            shared.reader = None;
            self.read_done.notify_all();
            match result {
                Ok(0) => {
                    shared.hang_up();
                    debug!(target: "input.keys", "end_of_input");
                    return Ok(false);
                }
                Ok(n) => {
                    let keys = shared.ingest(&buf[..n]);
                    if keys.is_empty() {
                        continue;
                    }
                    if let Some(tx) = shared.reading.take() {
                        let _ = tx.send(keys);
                        continue;
                    }
                    shared.pending.extend(keys);
                    shared.must_wait = false;
                }
                Err(e) if is_empty_read(&e) => continue,
                Err(e) => {
                    shared.hang_up();
                    warn!(target: "input.keys", error = %e, "device_read_failed");
                    return Err(e);
                }
            }
        }
    }

    /// Whether a background `wait_available_keys` is blocked in the device.
    pub fn is_waiting(&self) -> bool {
        self.lock().reader == Some(Reader::Wait)
    }

    /// Consume one key, preferring device keys over macro keys.
    pub fn pop(&self) -> Option<char> {
        let mut shared = self.lock();
        match shared.pending.pop_front() {
            Some(k) => Some(k),
            None => shared.macro_queue.pop_front(),
        }
    }

    /// Inspect the key `pop` would return.
    pub fn peek(&self) -> Option<char> {
        let shared = self.lock();
        shared
            .pending
            .front()
            .or_else(|| shared.macro_queue.front())
            .copied()
    }

    /// Every key of the source `pop` currently draws from.
    pub fn peek_all(&self) -> Vec<char> {
        let shared = self.lock();
        if shared.pending.is_empty() {
            shared.macro_queue.iter().copied().collect()
        } else {
            shared.pending.iter().copied().collect()
        }
    }

    /// Device keys not yet consumed, without the macro queue.
    pub fn peek_pending(&self) -> Vec<char> {
        self.lock().pending.iter().copied().collect()
    }

    /// Consume every device key, leaving macro keys queued.
    pub fn drain_pending(&self) -> Vec<char> {
        self.lock().pending.drain(..).collect()
    }

    pub fn has_macro_keys(&self) -> bool {
        !self.lock().macro_queue.is_empty()
    }

    /// Whether the last device read filled the whole read buffer.
    pub fn last_read_saturated(&self) -> bool {
        self.lock().saturated
    }

    /// Record keys that matched a command, pushing `requeue` back to the
    /// front of `pending`.
    pub fn matched_keys(&self, matched: &[char], requeue: &[char]) {
        let mut shared = self.lock();
        shared.matched.extend_from_slice(matched);
        for &k in requeue.iter().rev() {
            shared.pending.push_front(k);
        }
    }

    /// Put back keys that only matched a binding prefix. The next wait blocks
    /// for new input when nothing else was pending.
    pub fn matched_prefix(&self, prefix: &[char]) {
        if prefix.is_empty() {
            return;
        }
        let mut shared = self.lock();
        shared.must_wait = shared.pending.is_empty();
        for &k in prefix.iter().rev() {
            shared.pending.push_front(k);
        }
        shared.matched = prefix.to_vec();
        trace!(target: "input.keys", prefix = prefix.len(), must_wait = shared.must_wait, "matched_prefix");
    }

    /// Drop the keys of the command that just ran.
    pub fn flush_used(&self) {
        self.lock().matched.clear();
    }

    /// Keys that matched the command currently running.
    pub fn caller(&self) -> Vec<char> {
        self.lock().matched.clone()
    }

    /// Queue keys for consumption after any pending device keys. `at_front`
    /// places them ahead of previously fed keys.
    pub fn feed(&self, at_front: bool, keys: &[char]) {
        if keys.is_empty() {
            return;
        }
        let mut shared = self.lock();
        if at_front {
            for &k in keys.iter().rev() {
                shared.macro_queue.push_front(k);
            }
        } else {
            shared.macro_queue.extend(keys.iter().copied());
        }
    }

    /// Read one key for a command argument. Returns the key and whether it is
    /// the abort key (Escape), or `None` at end of input.
    ///
    /// Sources in order: macro queue, keys already pending, an in-flight
    /// background wait, a direct device read. Extra keys from a read are
    /// appended to `pending`.
    pub fn read_key(&self) -> io::Result<Option<(char, bool)>> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let mut shared = self.lock();
            let queued = match shared.macro_queue.pop_front() {
                Some(k) => Some(k),
                None => shared.pending.pop_front(),
            };
            if let Some(key) = queued {
                shared.matched.push(key);
                return Ok(Some((key, key == ESC)));
            }
            match shared.reader {
                Some(Reader::Wait) => {
                    let (tx, rx): (Sender<Vec<char>>, Receiver<Vec<char>>) = bounded(1);
                    shared.reading = Some(tx);
                    drop(shared);
                    let Ok(keys) = rx.recv() else {
                        continue;
                    };
                    let mut shared = self.lock();
                    let mut keys = keys.into_iter();
                    let Some(key) = keys.next() else { continue };
                    shared.pending.extend(keys);
                    shared.matched.push(key);
                    return Ok(Some((key, key == ESC)));
                }
                Some(Reader::Direct) => {
                    drop(self.read_done.wait(shared).unwrap_or_else(PoisonError::into_inner));
                    continue;
                }
                None => {}
            }
            shared.reader = Some(Reader::Direct);
            drop(shared);

            let result = self.device.read(&mut buf);

            let mut shared = self.lock();
            shared.reader = None;
            self.read_done.notify_all();
            match result {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    let mut keys = shared.ingest(&buf[..n]).into_iter();
                    let Some(key) = keys.next() else { continue };
                    shared.pending.extend(keys);
                    shared.matched.push(key);
                    return Ok(Some((key, key == ESC)));
                }
                Err(e) if is_empty_read(&e) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Query the terminal cursor position. Keys received before the report are
    /// kept in `pending`, in order. `None` means the terminal did not answer
    /// (error or end of input); callers should stop querying.
    pub fn get_cursor_pos(&self) -> Option<CursorPos> {
        CURSOR_QUERIES.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = bounded(1);
        {
            let mut shared = self.lock();
            shared.cursor = Some(tx);
            shared.query_pending = true;
        }
        let pos = match self.device.write_all(seq::CURSOR_QUERY.as_bytes()) {
            Ok(()) => self.await_cursor_report(&rx),
            Err(e) => {
                debug!(target: "input.cursor", error = %e, "query_write_failed");
                None
            }
        };
        let mut shared = self.lock();
        shared.query_pending = false;
        shared.cursor = None;
        let mut released = Vec::new();
        shared.scan.release(&mut released);
        shared.pending.extend(released);
        drop(shared);
        match pos {
            Some(pos) => trace!(target: "input.cursor", x = pos.x, y = pos.y, "cursor_report"),
            None => {
                CURSOR_QUERY_FAILURES.fetch_add(1, Ordering::Relaxed);
                warn!(target: "input.cursor", "cursor query unsupported by terminal");
            }
        }
        pos
    }

    fn await_cursor_report(&self, rx: &Receiver<CursorPos>) -> Option<CursorPos> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            if let Ok(pos) = rx.try_recv() {
                return Some(pos);
            }
            let mut shared = self.lock();
            match shared.reader {
                Some(Reader::Wait) => {
                    drop(shared);
                    return rx.recv().ok();
                }
                Some(Reader::Direct) => {
                    drop(self.read_done.wait(shared).unwrap_or_else(PoisonError::into_inner));
                    continue;
                }
                None => {}
            }
            shared.reader = Some(Reader::Direct);
            drop(shared);

            let result = self.device.read(&mut buf);

            let mut shared = self.lock();
            shared.reader = None;
            self.read_done.notify_all();
            match result {
                Ok(0) => return None,
                Ok(n) => {
                    let keys = shared.ingest(&buf[..n]);
                    shared.pending.extend(keys);
                }
                Err(e) if is_empty_read(&e) => continue,
                Err(e) => {
                    debug!(target: "input.cursor", error = %e, "query_read_failed");
                    return None;
                }
            }
        }
    }
}
