//! Output dialect selection.

use std::fmt;
use std::str::FromStr;

use crate::TranslateError;

/// Output dialect produced by the translator.
///
/// The dialect decides how text is escaped, how newlines are written and
/// which markup tags emit. Parsing is case-insensitive:
///
/// ```
/// use textout_markup::OutputFormat;
///
/// assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
/// assert!("markdown".parse::<OutputFormat>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Escaped HTML with links and smileys.
    #[default]
    Html,
    /// Lightscript: text passes through unescaped.
    Lightscript,
}

impl OutputFormat {
    /// Dialect name as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Lightscript => "lightscript",
        }
    }

    /// Whether this dialect is HTML.
    #[must_use]
    pub fn is_html(self) -> bool {
        matches!(self, Self::Html)
    }
}

impl FromStr for OutputFormat {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "lightscript" => Ok(Self::Lightscript),
            _ => Err(TranslateError::UnsupportedFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!(
            " LightScript ".parse::<OutputFormat>().unwrap(),
            OutputFormat::Lightscript
        );
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "xhtml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedFormat(ref s) if s == "xhtml"));
        assert!(err.to_string().contains("xhtml"));
    }

    #[test]
    fn test_display_roundtrip() {
        for format in [OutputFormat::Html, OutputFormat::Lightscript] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_default_is_html() {
        assert!(OutputFormat::default().is_html());
    }
}
