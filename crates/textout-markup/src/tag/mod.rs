//! Pluggable tag API.
//!
//! A tag is described once by a [`TagCapability`]: its aliases, whether it is
//! a block or inline element, its behavioral flags and a factory. Every time
//! the tag is opened in a document, the factory builds a fresh [`Tag`] object
//! from the [`TagCall`] (alias, value, output format, tweaks, resolvers). The
//! translator then drives that object through its hooks.
//!
//! # Hooks
//!
//! | Hook | Declared by | Used for |
//! |------|-------------|----------|
//! | [`Tag::begin`] / [`Tag::end`] | always available | opening and closing markup |
//! | [`Tag::preprocess`] | [`TagCapability::preprocessing`] | validate the whole content first |
//! | [`Tag::content`] | [`TagCapability::replacing_content`] | replace the content |
//! | [`Tag::default_content`] | [`TagCapability::with_default`] | fallback for empty content |
//!
//! Hook presence is declared on the capability, not discovered: a hook
//! that is implemented but not declared is never called.
//!
//! # Example
//!
//! ```
//! use textout_markup::{Tag, TagCapability, TagRegistry, Translator};
//!
//! struct Kbd;
//!
//! impl Tag for Kbd {
//!     fn begin(&mut self) -> String { "<kbd>".to_owned() }
//!     fn end(&mut self) -> String { "</kbd>".to_owned() }
//! }
//!
//! let registry = TagRegistry::default()
//!     .with_tag(TagCapability::inline(|_| Ok(Box::new(Kbd))).with_alias("[kbd]"));
//!
//! let html = Translator::new(registry).translate_str("Press [kbd]Ctrl[/kbd]").unwrap();
//! assert_eq!(html, "<p>Press <kbd>Ctrl</kbd></p>");
//! ```

mod capability;

use std::sync::Arc;

pub use capability::{TagCapability, TagFactory};

use crate::{MediaError, MediaResolver, OutputFormat, SmileyResolver, Tweaks};

/// Layout class of a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Block element; closing it ends the inline elements inside.
    Block,
    /// Inline element.
    Inline,
}

/// Arguments given to a tag factory when the tag is opened.
#[derive(Clone, Copy)]
pub struct TagCall<'a> {
    /// Alias the tag was opened with (`[b]`, `` ` ``); empty for implicit
    /// paragraphs.
    pub name: &'a str,
    /// `=value` argument, text-filtered when the capability asks for it.
    pub value: Option<&'a str>,
    /// Output dialect.
    pub format: OutputFormat,
    /// Host tweaks.
    pub tweaks: &'a Tweaks,
    /// Media resolver of the registry; tags may keep a clone.
    pub media: &'a Arc<dyn MediaResolver>,
    /// Smiley resolver of the registry.
    pub smileys: &'a Arc<dyn SmileyResolver>,
}

impl TagCall<'_> {
    /// Whether markup should be produced (HTML output).
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.format.is_html()
    }

    /// The value, or an error naming this tag when it is absent or blank.
    pub fn require_value(&self) -> Result<&str, TagError> {
        match self.value.map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TagError::MissingValue(self.name.to_owned())),
        }
    }

    /// Error rejecting `value` for this tag.
    #[must_use]
    pub fn invalid_value(&self, value: &str) -> TagError {
        TagError::InvalidValue {
            tag: self.name.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// Error raised by tag factories and hooks.
///
/// The translator never reports these to its caller: a failing tag is
/// written back as literal text.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Invalid value for {tag}: {value:?}")]
    InvalidValue { tag: String, value: String },
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid content: {0}")]
    InvalidContent(String),
    #[error("Tag requires content")]
    EmptyContent,
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Per-instance tag behavior.
///
/// One object is built per opened tag and rebuilt whenever the translator
/// resets the instance, so implementations may keep state between hooks.
///
/// Handlers implement `Send` only: each translation session owns its tag
/// objects.
pub trait Tag: Send {
    /// Opening markup.
    fn begin(&mut self) -> String {
        String::new()
    }

    /// Closing markup.
    fn end(&mut self) -> String {
        String::new()
    }

    /// Replacement content, for content-replacing tags.
    fn content(&mut self) -> String {
        String::new()
    }

    /// Inspect the full buffered content.
    ///
    /// Returns `Ok(Some(..))` to substitute the content, `Ok(None)` to keep
    /// it, or an error to reject the tag.
    fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
        let _ = content;
        Ok(None)
    }

    /// Content to use when nothing was written inside the tag.
    fn default_content(&mut self) -> Result<String, TagError> {
        Err(TagError::EmptyContent)
    }
}
