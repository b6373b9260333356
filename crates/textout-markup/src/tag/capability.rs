//! Tag capability descriptors.

use std::fmt;
use std::sync::Arc;

use super::{Tag, TagCall, TagError, TagKind};

/// Factory building a tag object for one opening.
pub type TagFactory = Arc<dyn Fn(&TagCall<'_>) -> Result<Box<dyn Tag>, TagError> + Send + Sync>;

/// Registered description of a tag.
///
/// Flags left unset follow the presence of the `preprocess` hook: a
/// preprocessing tag is raw and a superblock unless told otherwise.
#[derive(Clone)]
pub struct TagCapability {
    aliases: Vec<String>,
    kind: TagKind,
    raw: Option<bool>,
    generic: Option<bool>,
    superblock: bool,
    inlined: bool,
    notempty: bool,
    preprocess: bool,
    replaces_content: bool,
    has_default: bool,
    process_value: bool,
    factory: TagFactory,
}

impl TagCapability {
    /// Create a capability of the given kind, without aliases.
    pub fn new<F>(kind: TagKind, factory: F) -> Self
    where
        F: Fn(&TagCall<'_>) -> Result<Box<dyn Tag>, TagError> + Send + Sync + 'static,
    {
        Self {
            aliases: Vec::new(),
            kind,
            raw: None,
            generic: None,
            superblock: false,
            inlined: false,
            notempty: false,
            preprocess: false,
            replaces_content: false,
            has_default: false,
            process_value: false,
            factory: Arc::new(factory),
        }
    }

    /// Create an inline capability.
    pub fn inline<F>(factory: F) -> Self
    where
        F: Fn(&TagCall<'_>) -> Result<Box<dyn Tag>, TagError> + Send + Sync + 'static,
    {
        Self::new(TagKind::Inline, factory)
    }

    /// Create a block capability.
    pub fn block<F>(factory: F) -> Self
    where
        F: Fn(&TagCall<'_>) -> Result<Box<dyn Tag>, TagError> + Send + Sync + 'static,
    {
        Self::new(TagKind::Block, factory)
    }

    /// Add an alias: `[name]` for bracket tags, or a one-character symbol.
    ///
    /// Bracket aliases are matched case-insensitively.
    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_lowercase());
        self
    }

    /// Add several aliases.
    #[must_use]
    pub fn with_aliases<'a>(mut self, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        self.aliases
            .extend(aliases.into_iter().map(str::to_lowercase));
        self
    }

    /// Set whether the content is read verbatim.
    #[must_use]
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Set whether `[/]` may close this tag.
    #[must_use]
    pub fn with_generic(mut self, generic: bool) -> Self {
        self.generic = Some(generic);
        self
    }

    /// Wrap children in implicit paragraphs.
    #[must_use]
    pub fn superblock(mut self) -> Self {
        self.superblock = true;
        self
    }

    /// Promote the next block at the same level to a superblock.
    #[must_use]
    pub fn inlined(mut self) -> Self {
        self.inlined = true;
        self
    }

    /// Only emit markup once content arrives.
    #[must_use]
    pub fn notempty(mut self) -> Self {
        self.notempty = true;
        self
    }

    /// Declare the [`Tag::preprocess`] hook.
    #[must_use]
    pub fn preprocessing(mut self) -> Self {
        self.preprocess = true;
        self
    }

    /// Declare the [`Tag::content`] hook.
    #[must_use]
    pub fn replacing_content(mut self) -> Self {
        self.replaces_content = true;
        self
    }

    /// Declare the [`Tag::default_content`] hook.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Text-filter the `=value` argument before the factory sees it.
    #[must_use]
    pub fn processing_value(mut self) -> Self {
        self.process_value = true;
        self
    }

    /// Registered aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Block or inline.
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn is_block(&self) -> bool {
        self.kind == TagKind::Block
    }

    /// Content is read verbatim; defaults to [`Self::has_preprocess`].
    pub fn is_raw(&self) -> bool {
        self.raw.unwrap_or(self.preprocess)
    }

    /// Closable by `[/]`; defaults to true.
    pub fn is_generic(&self) -> bool {
        self.generic.unwrap_or(true)
    }

    /// Always true for preprocessing tags.
    pub fn is_superblock(&self) -> bool {
        self.superblock || self.preprocess
    }

    /// Only set on superblocks.
    pub fn is_inlined(&self) -> bool {
        self.is_superblock() && self.inlined
    }

    pub fn is_notempty(&self) -> bool {
        self.notempty
    }

    pub fn has_preprocess(&self) -> bool {
        self.preprocess
    }

    pub fn replaces_content(&self) -> bool {
        self.replaces_content
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn processes_value(&self) -> bool {
        self.process_value
    }

    /// Content is dropped while the tag is open.
    pub(crate) fn ignores_content(&self) -> bool {
        self.replaces_content && !self.preprocess
    }

    /// Build the tag object for one opening.
    pub fn prepare(&self, call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
        (self.factory)(call)
    }
}

impl fmt::Debug for TagCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagCapability")
            .field("aliases", &self.aliases)
            .field("kind", &self.kind)
            .field("raw", &self.is_raw())
            .field("generic", &self.is_generic())
            .field("superblock", &self.is_superblock())
            .field("inlined", &self.is_inlined())
            .field("notempty", &self.notempty)
            .field("preprocess", &self.preprocess)
            .field("replaces_content", &self.replaces_content)
            .field("has_default", &self.has_default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl Tag for Nothing {}

    fn nothing(_: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
        Ok(Box::new(Nothing))
    }

    #[test]
    fn test_defaults() {
        let cap = TagCapability::inline(nothing).with_alias("[B]");
        assert_eq!(cap.aliases(), ["[b]"]);
        assert_eq!(cap.kind(), TagKind::Inline);
        assert!(!cap.is_raw());
        assert!(cap.is_generic());
        assert!(!cap.is_superblock());
        assert!(!cap.ignores_content());
    }

    #[test]
    fn test_preprocess_implies_raw_and_superblock() {
        let cap = TagCapability::inline(nothing).preprocessing();
        assert!(cap.is_raw());
        assert!(cap.is_superblock());

        let cooked = TagCapability::inline(nothing).preprocessing().with_raw(false);
        assert!(!cooked.is_raw());
    }

    #[test]
    fn test_inlined_requires_superblock() {
        let plain = TagCapability::block(nothing).inlined();
        assert!(!plain.is_inlined());

        let sb = TagCapability::block(nothing).superblock().inlined();
        assert!(sb.is_inlined());
    }

    #[test]
    fn test_content_replacement() {
        let replacing = TagCapability::block(nothing).replacing_content();
        assert!(replacing.ignores_content());

        let validated = replacing.preprocessing();
        assert!(!validated.ignores_content());
    }

    #[test]
    fn test_debug_lists_flags() {
        let cap = TagCapability::block(nothing).with_alias("[quote]").superblock();
        let debug = format!("{cap:?}");
        assert!(debug.contains("[quote]"));
        assert!(debug.contains("superblock: true"));
    }
}
