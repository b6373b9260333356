//! Read-only tweak dictionary.
//!
//! Tweaks are flat host settings consulted by the translator and by tag
//! hooks. Keys are matched loosely: only ASCII letters count, and case is
//! ignored, so `label_prefix`, `LABELPREFIX` and `__La_bel_Pre_fix__` all
//! name the same tweak.

use std::collections::HashMap;

/// Normalized, read-only tweak dictionary.
///
/// # Example
///
/// ```
/// use textout_markup::Tweaks;
///
/// let tweaks = Tweaks::new().with("Label_Prefix", "doc-").with("inline", "yes");
/// assert_eq!(tweaks.get("labelprefix"), Some("doc-"));
/// assert!(tweaks.flag("INLINE"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tweaks {
    entries: HashMap<String, String>,
}

impl Tweaks {
    /// Create an empty tweak dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tweak, replacing any value stored under an equivalent key.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(normalize_key(key), value.into());
        self
    }

    /// Canonical spelling of a tweak key: lowercase ASCII letters only.
    #[must_use]
    pub fn normalize_key(key: &str) -> String {
        normalize_key(key)
    }

    /// Look up a tweak by any equivalent spelling of its key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Interpret a tweak as a boolean.
    ///
    /// `1`, `true`, `yes` and `on` (any case) are true; anything else,
    /// including a missing tweak, is false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    /// Number of tweaks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tweak is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Tweaks {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), value.into()))
            .collect();
        Self { entries }
    }
}

/// Keep ASCII letters only, lower-cased.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
