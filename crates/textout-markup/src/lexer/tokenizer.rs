//! Streaming tokenizer.

use std::io;

use super::scan::{TagMatch, match_tag};
use super::{CharSource, StrSource, Unit};

/// Default number of characters buffered for lookahead.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Smallest accepted buffer capacity.
pub const MIN_BUFFER_CAPACITY: usize = 8;

/// Pull-based tokenizer over a [`CharSource`].
///
/// Characters are read into a bounded lookahead buffer only when the current
/// one is exhausted. Tag candidates are decided on buffered characters; a
/// candidate cut by the end of the buffer is retried after a refill, and a
/// candidate as long as the whole buffer is read as text. Text runs and
/// newline runs are accumulated across refills, so the unit sequence does not
/// depend on the capacity as long as every tag fits in the buffer.
///
/// One-character specials are read as [`Unit::Special`]; the set defaults
/// to the backtick and is usually taken from a registry with
/// [`Tokenizer::with_specials`].
///
/// The sequence is finite and cannot be restarted. Only the source can fail.
///
/// # Example
///
/// ```
/// use textout_markup::{StrSource, Tokenizer, Unit};
///
/// let mut tokenizer = Tokenizer::new(StrSource::new("[b]hi"));
/// assert!(matches!(tokenizer.next_unit().unwrap(), Some(Unit::Begin { .. })));
/// assert_eq!(tokenizer.next_unit().unwrap(), Some(Unit::Text { text: "hi".into() }));
/// assert_eq!(tokenizer.next_unit().unwrap(), None);
/// ```
pub struct Tokenizer<S> {
    source: S,
    buffer: Vec<char>,
    pos: usize,
    capacity: usize,
    eof: bool,
    specials: Vec<char>,
}

impl<S: CharSource> Tokenizer<S> {
    /// Create a tokenizer with [`DEFAULT_BUFFER_CAPACITY`].
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a tokenizer buffering at most `capacity` characters.
    ///
    /// Capacities below [`MIN_BUFFER_CAPACITY`] are raised to it.
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        let capacity = capacity.max(MIN_BUFFER_CAPACITY);
        Self {
            source,
            buffer: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
            eof: false,
            specials: vec!['`'],
        }
    }

    /// Replace the characters read as specials.
    ///
    /// Brackets and line breaks keep their own meaning.
    #[must_use]
    pub fn with_specials(mut self, specials: impl IntoIterator<Item = char>) -> Self {
        self.specials = specials.into_iter().collect();
        self
    }

    /// Produce the next unit, or `None` at the end of the source.
    pub fn next_unit(&mut self) -> io::Result<Option<Unit>> {
        let mut text = String::new();

        loop {
            let Some(&c) = self.buffer.get(self.pos) else {
                if self.eof {
                    break;
                }
                self.fill()?;
                continue;
            };

            match c {
                '\n' if !text.is_empty() => break,
                '\n' => return self.newlines().map(Some),
                '\r' if self.crlf_at()? => {
                    if !text.is_empty() {
                        break;
                    }
                    return self.newlines().map(Some);
                }
                '[' => match match_tag(&self.buffer[self.pos..], self.eof) {
                    // Leave the tag in the buffer for the next call.
                    TagMatch::Complete(..) if !text.is_empty() => break,
                    TagMatch::Complete(unit, len) => {
                        self.pos += len;
                        return Ok(Some(unit));
                    }
                    TagMatch::Incomplete if self.buffer.len() - self.pos < self.capacity => {
                        self.fill()?;
                    }
                    TagMatch::Incomplete | TagMatch::Mismatch => {
                        text.push(c);
                        self.pos += 1;
                    }
                },
                c if self.specials.contains(&c) => {
                    if !text.is_empty() {
                        break;
                    }
                    self.pos += 1;
                    return Ok(Some(Unit::Special {
                        symbol: c.to_string(),
                    }));
                }
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        Ok((!text.is_empty()).then(|| Unit::text(text)))
    }

    /// Consume a run of newlines; `\r\n` counts as one.
    fn newlines(&mut self) -> io::Result<Unit> {
        let mut count = 0usize;
        loop {
            match self.buffer.get(self.pos).copied() {
                Some('\n') => {
                    count += 1;
                    self.pos += 1;
                }
                Some('\r') if self.crlf_at()? => {
                    count += 1;
                    self.pos += 2;
                }
                None if !self.eof => self.fill()?,
                _ => break,
            }
        }

        Ok(if count == 1 {
            Unit::Newline
        } else {
            Unit::ParagraphBreak {
                literal: "\n".repeat(count),
            }
        })
    }

    /// Whether the character at the cursor starts a `\r\n` pair.
    fn crlf_at(&mut self) -> io::Result<bool> {
        if self.pos + 1 >= self.buffer.len() && !self.eof {
            self.fill()?;
        }
        Ok(self.buffer.get(self.pos) == Some(&'\r')
            && self.buffer.get(self.pos + 1) == Some(&'\n'))
    }

    /// Drop consumed characters and read more, up to the capacity.
    fn fill(&mut self) -> io::Result<()> {
        self.buffer.drain(..self.pos);
        self.pos = 0;

        let want = self.capacity.saturating_sub(self.buffer.len());
        if want > 0 && !self.eof && self.source.read_chars(&mut self.buffer, want)? == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<S: CharSource> Iterator for Tokenizer<S> {
    type Item = io::Result<Unit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_unit().transpose()
    }
}

/// Tokenize an in-memory string.
///
/// String sources cannot fail, so this collects every unit.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Unit> {
    Tokenizer::new(StrSource::new(text))
        .map_while(Result::ok)
        .collect()
}
