use tracing::trace;

use crate::error::{TwircError, TwircResult};

/// Largest single message we expect from the server, CRLF included.
///
/// The chat text itself is capped at 512 bytes but tags are not, so real
/// lines routinely go past the 1024 bytes IRCv3 suggests.
pub const MESSAGE_SIZE: usize = 2048;

/// Size of one receive call.
pub const RECV_CHUNK_SIZE: usize = MESSAGE_SIZE;

const TERMINATOR: &[u8] = b"\r\n";

/// Reassembles CRLF-terminated lines out of an arbitrarily chunked byte stream.
pub struct LineBuffer {
    pending: Vec<u8>,
    capacity: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Room for one incomplete message plus one complete one.
    pub fn new() -> Self {
        Self::with_capacity(2 * MESSAGE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `bytes` and returns every line completed by them, in order.
    ///
    /// The input is read as a sequence of NUL-terminated runs; only the run
    /// contents are kept. Whatever follows the last CRLF stays buffered for
    /// the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> TwircResult<Vec<String>> {
        let mut lines = Vec::new();
        for run in Runs::new(bytes) {
            self.pending.extend_from_slice(run);
            self.drain_lines(&mut lines);
            if self.pending.len() > self.capacity {
                let pending = self.pending.len();
                self.pending.clear();
                return Err(TwircError::BufferOverflow {
                    pending,
                    capacity: self.capacity,
                });
            }
        }
        Ok(lines)
    }

    fn drain_lines(&mut self, lines: &mut Vec<String>) {
        let mut start = 0;
        while let Some(offset) = find_terminator(&self.pending[start..]) {
            let line = &self.pending[start..start + offset];
            start += offset + TERMINATOR.len();
            if line.is_empty() {
                continue;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
        }
        if start > 0 {
            self.pending.drain(..start);
            trace!("{} bytes of partial line buffered", self.pending.len());
        }
    }

    /// Bytes received but not yet part of a complete line.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR)
}

/// Iterates over the NUL-terminated runs of a receive buffer.
///
/// `b"ab\0\0cd"` yields `b"ab"`, `b""` and `b"cd"`; the last run needs no NUL.
struct Runs<'a> {
    rest: Option<&'a [u8]>,
}

impl<'a> Runs<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: Some(bytes) }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = self.rest.take()?;
        match rest.iter().position(|b| *b == 0) {
            Some(nul) => {
                self.rest = Some(&rest[nul + 1..]).filter(|r| !r.is_empty());
                Some(&rest[..nul])
            }
            None => Some(rest),
        }
    }
}
