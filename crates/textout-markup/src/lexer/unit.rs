//! Lexical units produced by the tokenizer.

/// One token of markup source.
///
/// Tag names are case-normalized aliases: `[B]` opens `[b]`, `[/Quote]`
/// closes `[quote]`, and a generic closer `[/]` carries an empty name.
/// Every unit keeps the exact source text it was read from, so that any
/// unit can be written back verbatim when the translator decides to treat
/// it as plain text. Line breaks are the exception: `\r\n` is read as `\n`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum Unit {
    /// Plain text between syntax elements.
    Text { text: String },
    /// Opening tag: `[name]` or `[name=value]`.
    Begin {
        name: String,
        value: Option<String>,
        literal: String,
    },
    /// Closing tag: `[/name]` or `[/]`.
    End { name: String, literal: String },
    /// One-character toggle such as a backtick.
    Special { symbol: String },
    /// A single line break.
    Newline,
    /// Two or more consecutive line breaks.
    ParagraphBreak { literal: String },
}

impl Unit {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Snake-case variant name, as used by the serialized form.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Begin { .. } => "begin",
            Self::End { .. } => "end",
            Self::Special { .. } => "special",
            Self::Newline => "newline",
            Self::ParagraphBreak { .. } => "paragraph_break",
        }
    }

    /// Source text this unit was read from.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Begin { literal, .. }
            | Self::End { literal, .. }
            | Self::ParagraphBreak { literal } => literal,
            Self::Special { symbol } => symbol,
            Self::Newline => "\n",
        }
    }

    /// Normalized tag name for `Begin`, `End` and `Special` units.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Begin { name, .. } | Self::End { name, .. } => Some(name),
            Self::Special { symbol } => Some(symbol),
            _ => None,
        }
    }

    /// Whether this is a generic closer (`[/]`).
    #[must_use]
    pub fn is_generic_close(&self) -> bool {
        matches!(self, Self::End { name, .. } if name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        let unit = Unit::Begin {
            name: "[b]".to_owned(),
            value: None,
            literal: "[B]".to_owned(),
        };
        assert_eq!(unit.literal(), "[B]");
        assert_eq!(unit.name(), Some("[b]"));
        assert_eq!(Unit::Newline.literal(), "\n");
        assert_eq!(Unit::text("hey").name(), None);
    }

    #[test]
    fn test_generic_close() {
        let generic = Unit::End {
            name: String::new(),
            literal: "[/]".to_owned(),
        };
        let named = Unit::End {
            name: "[b]".to_owned(),
            literal: "[/b]".to_owned(),
        };
        assert!(generic.is_generic_close());
        assert!(!named.is_generic_close());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_tagged() {
        let value = serde_json::to_value(Unit::Special {
            symbol: "`".to_owned(),
        })
        .unwrap();
        assert_eq!(value["kind"], "special");
        assert_eq!(value["symbol"], "`");
    }
}
