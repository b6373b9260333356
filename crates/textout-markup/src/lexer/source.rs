//! Character sources for the tokenizer.
//!
//! A source hands out characters in sequential reads of bounded size and
//! never seeks. Reading zero characters signals the end of the stream.

use std::io::{self, Read};
use std::str::Chars;

/// Sequential character source.
pub trait CharSource {
    /// Append up to `max` characters to `buf`.
    ///
    /// Returns the number of characters appended. Zero means the source is
    /// exhausted; implementations must not return zero before that.
    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> io::Result<usize>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> io::Result<usize> {
        (**self).read_chars(buf, max)
    }
}

/// In-memory string source.
#[derive(Clone, Debug)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Read characters from `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> io::Result<usize> {
        let before = buf.len();
        buf.extend(self.chars.by_ref().take(max));
        Ok(buf.len() - before)
    }
}

/// UTF-8 byte stream source.
///
/// Decodes incrementally: a sequence split across two reads is joined, and
/// invalid bytes are replaced by U+FFFD instead of failing the read.
pub struct ReadSource<R> {
    reader: R,
    pending: Vec<u8>,
    eof: bool,
}

const READ_CHUNK: usize = 4096;

impl<R: Read> ReadSource<R> {
    /// Decode characters from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Read another chunk of bytes; returns false at end of stream.
    fn read_bytes(&mut self, max: usize) -> io::Result<bool> {
        let mut chunk = vec![0u8; max.clamp(4, READ_CHUNK)];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Move up to `max` decoded characters from `pending` into `buf`.
    fn decode(&mut self, buf: &mut Vec<char>, max: usize) -> usize {
        let mut count = 0;
        let mut consumed = 0;

        while count < max && consumed < self.pending.len() {
            let rest = &self.pending[consumed..];
            let (valid_len, invalid) = match std::str::from_utf8(rest) {
                Ok(_) => (rest.len(), None),
                Err(e) => (e.valid_up_to(), Some(e.error_len())),
            };

            if valid_len > 0 {
                let valid = String::from_utf8_lossy(&rest[..valid_len]);
                for c in valid.chars().take(max - count) {
                    buf.push(c);
                    count += 1;
                    consumed += c.len_utf8();
                }
                continue;
            }

            match invalid {
                Some(Some(len)) => {
                    buf.push(char::REPLACEMENT_CHARACTER);
                    count += 1;
                    consumed += len;
                }
                // Truncated sequence at the end of what we have so far.
                Some(None) if self.eof => {
                    buf.push(char::REPLACEMENT_CHARACTER);
                    count += 1;
                    consumed = self.pending.len();
                }
                _ => break,
            }
        }

        self.pending.drain(..consumed);
        count
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn read_chars(&mut self, buf: &mut Vec<char>, max: usize) -> io::Result<usize> {
        if max == 0 {
            return Ok(0);
        }
        loop {
            let count = self.decode(buf, max);
            if count > 0 {
                return Ok(count);
            }
            if self.eof {
                return Ok(0);
            }
            self.read_bytes(max)?;
        }
    }
}
