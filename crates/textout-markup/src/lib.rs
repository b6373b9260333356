//! Streaming translator for BBCode-like markup.
//!
//! Input such as `[b]bold[/b] and [url=https://example.org]a link[/url]` is
//! translated into HTML or into Lightscript, a plain-text rendering without
//! markup. The crate is built from three layers:
//!
//! - [`Tokenizer`]: reads characters from a [`CharSource`] through a bounded
//!   window and produces [`Unit`]s.
//! - [`TagRegistry`]: maps aliases such as `[quote]` to [`TagCapability`]
//!   descriptors and holds the smiley and media resolvers.
//! - [`Translator`]: runs one session per document, maintaining the stack of
//!   open tags and writing to any [`std::io::Write`] sink.
//!
//! Malformed input is never an error. Unknown tags, unbalanced closers and
//! tags whose value or content is rejected are written back as text, and tags
//! still open at the end of the input are closed automatically.
//!
//! # Example
//!
//! ```
//! use textout_markup::Translator;
//!
//! let html = Translator::default()
//!     .translate_str("[quote=Ann]Hello [b]there[/quote]\n\nBye")
//!     .unwrap();
//! assert_eq!(
//!     html,
//!     "<blockquote><cite>Ann</cite><p>Hello <b>there</b></p></blockquote><p>Bye</p>"
//! );
//! ```
//!
//! Custom tags implement [`Tag`] and are registered through a
//! [`TagCapability`], which declares the hooks the translator may call.

mod builtin;
mod error;
mod format;
mod lexer;
mod registry;
mod resources;
mod tag;
mod text;
mod translator;
mod tweaks;

pub use error::TranslateError;
pub use format::OutputFormat;
pub use lexer::{
    CharSource, DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY, ReadSource, StrSource, Tokenizer,
    Unit, tokenize,
};
pub use registry::TagRegistry;
pub use resources::{
    Media, MediaError, MediaResolver, NoMedia, SmileyResolver, SmileyTable, WebMediaResolver,
};
pub use tag::{Tag, TagCall, TagCapability, TagError, TagFactory, TagKind};
pub use text::{escape_html, render_text};
pub use translator::Translator;
pub use tweaks::Tweaks;
