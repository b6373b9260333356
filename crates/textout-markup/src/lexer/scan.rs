//! Bracket tag matching.
//!
//! Recognizes `[name]`, `[name=value]`, `[/name]` and `[/]` at the head of a
//! character window. Names and values may contain balanced brackets up to
//! [`MAX_NESTING`] levels deep; a tag never spans a line break and names
//! never contain whitespace.

use super::Unit;

/// Deepest bracket nesting accepted inside a tag.
pub(crate) const MAX_NESTING: usize = 8;

/// Outcome of matching a tag at the start of a window.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TagMatch {
    /// A full tag, and the number of characters it spans.
    Complete(Unit, usize),
    /// The window does not start with a tag.
    Mismatch,
    /// The window ends before the tag could be decided.
    Incomplete,
}

/// Match a tag at the start of `chars`, which must begin with `[`.
///
/// `eof` tells whether more characters can follow the window; when they
/// cannot, an undecided tag is a mismatch.
pub(crate) fn match_tag(chars: &[char], eof: bool) -> TagMatch {
    let undecided = if eof {
        TagMatch::Mismatch
    } else {
        TagMatch::Incomplete
    };

    if chars.len() < 2 {
        return undecided;
    }

    let closing = chars[1] == '/';
    let mut depth = 0usize;
    let mut equals = None;
    let mut i = if closing { 2 } else { 1 };

    let end = loop {
        let Some(&c) = chars.get(i) else {
            return undecided;
        };
        match c {
            '\n' => return TagMatch::Mismatch,
            '[' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return TagMatch::Mismatch;
                }
            }
            ']' if depth == 0 => break i,
            ']' => depth -= 1,
            '=' if depth == 0 && !closing && equals.is_none() => equals = Some(i),
            c if equals.is_none() && c.is_whitespace() => return TagMatch::Mismatch,
            _ => {}
        }
        i += 1;
    };

    let literal: String = chars[..=end].iter().collect();

    let unit = if closing {
        let name = normalize_name(&chars[2..end]);
        Unit::End { name, literal }
    } else {
        let (name, value) = match equals {
            Some(eq) => (&chars[1..eq], Some(chars[eq + 1..end].iter().collect())),
            None => (&chars[1..end], None),
        };
        if name.is_empty() {
            return TagMatch::Mismatch;
        }
        Unit::Begin {
            name: normalize_name(name),
            value,
            literal,
        }
    };

    TagMatch::Complete(unit, end + 1)
}

/// Lower-case a raw name and wrap it as `[name]`; empty stays empty.
fn normalize_name(raw: &[char]) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let mut name = String::with_capacity(raw.len() + 2);
    name.push('[');
    name.extend(raw.iter().flat_map(|c| c.to_lowercase()));
    name.push(']');
    name
}
