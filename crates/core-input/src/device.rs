//! Byte sources the key stream reads from.

use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, PoisonError};

/// A raw terminal byte stream, already in raw mode.
///
/// `read` follows the `std::io::Read` contract: `Ok(0)` is end of input and
/// `Interrupted`/`WouldBlock` errors are empty reads that callers retry.
pub trait InputDevice: Send + Sync {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;
    fn write_all(&self, bytes: &[u8]) -> io::Result<()>;
}

#[derive(Debug)]
enum Step {
    Bytes(Vec<u8>),
    Error(io::ErrorKind),
}

/// Scripted device: every read returns the next queued chunk (truncated to
/// the read buffer, remainder kept for the next read), then end of input.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    steps: Mutex<VecDeque<Step>>,
    written: Mutex<Vec<u8>>,
}

impl MemoryDevice {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let dev = Self::default();
        for chunk in chunks {
            dev.push(chunk);
        }
        dev
    }

    pub fn push(&self, chunk: impl Into<Vec<u8>>) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Step::Bytes(chunk.into()));
    }

    /// Queue a read failure of the given kind.
    pub fn push_error(&self, kind: io::ErrorKind) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Step::Error(kind));
    }

    /// Everything written to the device so far.
    pub fn written(&self) -> Vec<u8> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl InputDevice for MemoryDevice {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut steps = self.steps.lock().unwrap_or_else(PoisonError::into_inner);
        match steps.pop_front() {
            None => Ok(0),
            Some(Step::Error(kind)) => Err(io::Error::from(kind)),
            Some(Step::Bytes(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    steps.push_front(Step::Bytes(bytes.split_off(n)));
                }
                Ok(n)
            }
        }
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        Ok(())
    }
}

/// Device fed from another thread. Reads block until a chunk arrives; a
/// disconnected sender is end of input.
pub struct ChannelDevice {
    rx: Receiver<Vec<u8>>,
    written: Mutex<Vec<u8>>,
}

impl ChannelDevice {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl InputDevice for ChannelDevice {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self.rx.recv() {
            Ok(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Err(_) => Ok(0),
        }
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_device_splits_oversized_chunks() {
        let dev = MemoryDevice::new(["abcdef"]);
        let mut buf = [0u8; 4];
        assert_eq!(dev.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(dev.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(dev.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn memory_device_scripted_errors() {
        let dev = MemoryDevice::default();
        dev.push_error(io::ErrorKind::Interrupted);
        let mut buf = [0u8; 4];
        let err = dev.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        dev.write_all(b"\x1b[6n").unwrap();
        assert_eq!(dev.written(), b"\x1b[6n");
    }
}
