//! Append-only text buffer shared by every string-building path.

use std::fmt;

const INITIAL_CAPACITY: usize = 32;

/// Growable character buffer with doubling growth and dump-and-clear.
#[derive(Debug, Default)]
pub struct TextBuffer {
    buf: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Grow capacity geometrically until `additional` more bytes fit.
    fn ensure(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        let mut cap = self.buf.capacity().max(INITIAL_CAPACITY);
        if needed <= self.buf.capacity() {
            return;
        }
        while cap < needed {
            cap <<= 1;
        }
        self.buf.reserve_exact(cap - self.buf.len());
    }

    pub fn push_str(&mut self, s: &str) {
        self.ensure(s.len());
        self.buf.push_str(s);
    }

    pub fn push(&mut self, c: char) {
        self.ensure(c.len_utf8());
        self.buf.push(c);
    }

    /// Cut the buffer back to `len` bytes. Out-of-range or non-boundary
    /// lengths leave the buffer unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len <= self.buf.len() && self.buf.is_char_boundary(len) {
            self.buf.truncate(len);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Return the accumulated text and leave the buffer empty.
    pub fn dump(&mut self) -> String {
        let out = self.buf.clone();
        self.buf.clear();
        out
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}
