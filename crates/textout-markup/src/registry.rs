//! Tag registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builtin;
use crate::{MediaResolver, SmileyResolver, SmileyTable, TagCapability, WebMediaResolver};

/// Catalog of tag capabilities and rendering resolvers.
///
/// Bracket aliases (`[b]`) and one-character specials (`` ` ``) live in
/// separate tables; longer aliases without a bracket are ignored. Registering an alias that is already known replaces the
/// earlier capability for that alias only. Lookups that find nothing are not
/// errors: the translator writes unknown tags back as text.
///
/// The registry is built once, then shared read-only by every translation
/// session; cloning it only bumps reference counts of its entries.
#[derive(Clone)]
pub struct TagRegistry {
    tags: HashMap<String, Arc<TagCapability>>,
    specials: HashMap<String, Arc<TagCapability>>,
    paragraph: Arc<TagCapability>,
    smileys: Arc<dyn SmileyResolver>,
    media: Arc<dyn MediaResolver>,
}

impl TagRegistry {
    /// Create a registry without tags.
    ///
    /// Implicit paragraphs still use the base paragraph tag.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
            specials: HashMap::new(),
            paragraph: Arc::new(builtin::paragraph()),
            smileys: Arc::new(SmileyTable::new()),
            media: Arc::new(WebMediaResolver),
        }
    }

    /// Create a registry with the base tag set.
    #[must_use]
    pub fn with_builtin_tags() -> Self {
        let mut registry = Self::empty();
        for capability in builtin::tags() {
            registry.register(capability);
        }
        registry
    }

    /// Register a capability under each of its aliases.
    pub fn register(&mut self, capability: TagCapability) -> &mut Self {
        let capability = Arc::new(capability);
        for alias in capability.aliases() {
            let table = if alias.starts_with('[') {
                &mut self.tags
            } else if alias.chars().count() == 1 {
                &mut self.specials
            } else {
                tracing::warn!(
                    alias = %alias,
                    "Special tag alias must be one character, ignored"
                );
                continue;
            };
            if table.insert(alias.clone(), Arc::clone(&capability)).is_some() {
                tracing::debug!(alias = %alias, "Replaced tag registration");
            }
        }
        self
    }

    /// Register a capability (builder form).
    #[must_use]
    pub fn with_tag(mut self, capability: TagCapability) -> Self {
        self.register(capability);
        self
    }

    /// Replace the capability used for implicit paragraphs.
    #[must_use]
    pub fn with_paragraph(mut self, capability: TagCapability) -> Self {
        self.paragraph = Arc::new(capability);
        self
    }

    /// Replace the smiley resolver.
    #[must_use]
    pub fn with_smileys(mut self, smileys: impl SmileyResolver + 'static) -> Self {
        self.smileys = Arc::new(smileys);
        self
    }

    /// Replace the media resolver.
    #[must_use]
    pub fn with_media(mut self, media: impl MediaResolver + 'static) -> Self {
        self.media = Arc::new(media);
        self
    }

    /// Capability for a bracket alias such as `[b]`.
    pub fn resolve(&self, name: &str) -> Option<&Arc<TagCapability>> {
        self.tags.get(name)
    }

    /// Capability for a special symbol such as `` ` ``.
    pub fn resolve_special(&self, symbol: &str) -> Option<&Arc<TagCapability>> {
        self.specials.get(symbol)
    }

    /// Characters the tokenizer must read as specials, sorted.
    pub fn special_symbols(&self) -> Vec<char> {
        let mut symbols: Vec<char> = self
            .specials
            .keys()
            .filter_map(|symbol| symbol.chars().next())
            .collect();
        symbols.sort_unstable();
        symbols
    }

    /// Capability used for implicit paragraphs.
    pub fn paragraph(&self) -> &Arc<TagCapability> {
        &self.paragraph
    }

    pub fn smileys(&self) -> &Arc<dyn SmileyResolver> {
        &self.smileys
    }

    pub fn media(&self) -> &Arc<dyn MediaResolver> {
        &self.media
    }

    /// Registered bracket aliases, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self
            .tags
            .keys()
            .chain(self.specials.keys())
            .map(String::as_str)
            .collect();
        aliases.sort_unstable();
        aliases
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_builtin_tags()
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("aliases", &self.aliases())
            .finish_non_exhaustive()
    }
}
