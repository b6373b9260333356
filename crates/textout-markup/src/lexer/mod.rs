//! Markup lexer.
//!
//! Turns a character stream into [`Unit`]s: text runs, opening and closing
//! bracket tags, backtick toggles, newlines and paragraph breaks.

mod scan;
mod source;
mod tokenizer;
mod unit;

pub use source::{CharSource, ReadSource, StrSource};
pub use tokenizer::{DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY, Tokenizer, tokenize};
pub use unit::Unit;
