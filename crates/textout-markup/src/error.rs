//! Caller-visible translation errors.
//!
//! Malformed markup never produces an error: unknown tags, rejected values and
//! invalid content all degrade to literal text inside the translator. Only the
//! collaborators at the edges (source, sink, output format selection) can fail.

use std::io;

/// Error returned by [`Translator`](crate::Translator) operations.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// Reading the source or writing the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The requested output dialect is not supported.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    /// The sink produced bytes that are not valid UTF-8.
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
