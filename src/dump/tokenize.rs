//! Splits a dump into the contents of its parenthesized tuples.
//!
//! This is a delimiter scan, not a SQL parser. A token runs from the nearest
//! `(` before the next `)` up to that `)`. Nested or quoted parentheses are not
//! understood: `(a,(b),c)` yields `b` and then `,c`.
//!
//! The buffer never holds more than `max_token_size` bytes. A token that would
//! be longer is cut to that size and the rest of it is dropped.

use std::io::{self, Read};

use crate::error::{Error, Result};

const READ_SIZE: usize = 64 * 1024;
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 1024 * 1024;

/// Bytes of one candidate tuple, valid until the next call to
/// [`Tokenizer::next_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a>(pub &'a [u8]);

pub struct Tokenizer<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    skipping: bool,
    consumed: u64,
    max_token_size: usize,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_token_size(reader, DEFAULT_MAX_TOKEN_SIZE)
    }

    pub fn with_max_token_size(reader: R, max_token_size: usize) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(READ_SIZE),
            pos: 0,
            eof: false,
            skipping: false,
            consumed: 0,
            max_token_size: max_token_size.max(1),
        }
    }

    /// Number of input bytes handed out so far, delimiters included.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn next_token(&mut self) -> Result<Option<RawToken<'_>>> {
        loop {
            if self.skipping {
                self.skip_oversized()?;
                continue;
            }

            let window = &self.buf[self.pos..];
            if let Some(close) = window.iter().position(|&b| b == b')') {
                let open = window[..close]
                    .iter()
                    .rposition(|&b| b == b'(')
                    .map_or(0, |i| i + 1);
                let (start, end) = (self.pos + open, self.pos + close);
                self.advance(close + 1);
                return Ok(Some(RawToken(&self.buf[start..end])));
            }

            if window.len() >= self.max_token_size {
                // a later `)` would start its token at the last `(` anyway
                if let Some(open) = window.iter().rposition(|&b| b == b'(').filter(|&i| i > 0) {
                    self.advance(open);
                    continue;
                }
                let start = self.pos + usize::from(window[0] == b'(');
                let end = self.pos + self.max_token_size;
                self.advance(self.max_token_size);
                self.skipping = true;
                tracing::debug!(limit = self.max_token_size, "truncated oversized token");
                return Ok(Some(RawToken(&self.buf[start..end])));
            }

            if self.eof {
                if window.is_empty() {
                    return Ok(None);
                }
                // whatever trails the last `)` is handed out as is
                let (start, rest) = (self.pos, window.len());
                self.advance(rest);
                return Ok(Some(RawToken(&self.buf[start..])));
            }

            self.fill()?;
        }
    }

    /// Drops the rest of a truncated token: through the next `)`, or up to the
    /// next `(`, or to the end of input.
    fn skip_oversized(&mut self) -> Result<()> {
        let window = &self.buf[self.pos..];
        match window.iter().position(|&b| b == b')' || b == b'(') {
            Some(i) => {
                let through_close = window[i] == b')';
                self.advance(i + usize::from(through_close));
                self.skipping = false;
            }
            None => {
                let rest = window.len();
                self.advance(rest);
                if self.eof {
                    self.skipping = false;
                } else {
                    self.fill()?;
                }
            }
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.consumed += n as u64;
    }

    fn fill(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }

        let len = self.buf.len();
        let want = READ_SIZE.min(self.max_token_size - len);
        self.buf.resize(len + want, 0);
        let read = loop {
            match self.reader.read(&mut self.buf[len..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(len);
                    return Err(Error::Read(e));
                }
            }
        };
        self.buf.truncate(len + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }
}
