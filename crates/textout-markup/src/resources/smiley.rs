//! Smiley lookup.

use std::collections::HashMap;

/// Resolves smiley tokens to icon URLs.
pub trait SmileyResolver: Send + Sync {
    /// Icon URL for `token`, if it is a smiley.
    fn lookup(&self, token: &str) -> Option<String>;
}

/// Table-driven smiley resolver.
///
/// # Example
///
/// ```
/// use textout_markup::{SmileyResolver, SmileyTable};
///
/// let smileys = SmileyTable::new().with(":)", "/smileys/smile.gif");
/// assert_eq!(smileys.lookup(":)").as_deref(), Some("/smileys/smile.gif"));
/// assert_eq!(smileys.lookup(":("), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmileyTable {
    entries: HashMap<String, String>,
}

impl SmileyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a smiley, replacing any previous icon for `token`.
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, url: impl Into<String>) -> Self {
        self.entries.insert(token.into(), url.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SmileyTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(token, url)| (token.into(), url.into()))
                .collect(),
        }
    }
}

impl SmileyResolver for SmileyTable {
    fn lookup(&self, token: &str) -> Option<String> {
        self.entries.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_pairs() {
        let table: SmileyTable = [(":)", "a.gif"), (":D", "b.gif")].into_iter().collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(":D").as_deref(), Some("b.gif"));
    }

    #[test]
    fn test_tokens_are_exact() {
        let table = SmileyTable::new().with(":)", "a.gif");
        assert_eq!(table.lookup(":) "), None);
        assert_eq!(table.lookup(":"), None);
    }

    #[test]
    fn test_later_entry_wins() {
        let table = SmileyTable::new().with(":)", "a.gif").with(":)", "b.gif");
        assert_eq!(table.lookup(":)").as_deref(), Some("b.gif"));
    }
}
