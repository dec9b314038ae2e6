/// Reassembles `\n`-terminated lines from arbitrarily chunked bytes.
///
/// A line that grows past `max_len` bytes without a terminator is dropped in
/// full: its bytes are discarded up to and including the next `\n`.
#[derive(Debug)]
pub struct LineSplitter {
    pending: Vec<u8>,
    max_len: usize,
    overflowed: bool,
}

impl LineSplitter {
    pub fn new(max_len: usize) -> Self {
        Self {
            pending: Vec::with_capacity(max_len),
            max_len,
            overflowed: false,
        }
    }

    /// Feeds `bytes`, calling `on_line` for each completed line (terminator
    /// excluded). Returns the number of over-long lines dropped.
    pub fn push(&mut self, bytes: &[u8], mut on_line: impl FnMut(&[u8])) -> usize {
        let mut dropped = 0;
        for &byte in bytes {
            if byte == b'\n' {
                if self.overflowed {
                    self.overflowed = false;
                    dropped += 1;
                } else {
                    on_line(&self.pending);
                }
                self.pending.clear();
            } else if self.overflowed {
                continue;
            } else if self.pending.len() >= self.max_len {
                self.pending.clear();
                self.overflowed = true;
            } else {
                self.pending.push(byte);
            }
        }
        dropped
    }

    /// Bytes of the current, unterminated line.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}
