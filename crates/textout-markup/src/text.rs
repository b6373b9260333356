//! Text filtering for HTML output.

use std::sync::LazyLock;

use regex::Regex;

use crate::SmileyResolver;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    escape_html_into(&mut result, s);
    result
}

fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

/// Escape `text` and decorate it: bare URLs become links and smiley tokens
/// become icons.
///
/// Smileys are only looked up between URLs, on whitespace-delimited tokens.
#[must_use]
pub fn render_text(text: &str, smileys: &dyn SmileyResolver) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for found in URL_RE.find_iter(text) {
        let url = trim_url(found.as_str());
        if url.ends_with("://") {
            continue;
        }

        push_smileys(&mut out, &text[last..found.start()], smileys);
        out.push_str("<a href=\"");
        escape_html_into(&mut out, url);
        out.push_str("\">");
        escape_html_into(&mut out, url);
        out.push_str("</a>");
        last = found.start() + url.len();
    }

    push_smileys(&mut out, &text[last..], smileys);
    out
}

/// Drop trailing punctuation that more likely ends the sentence than the URL.
fn trim_url(url: &str) -> &str {
    let mut url = url;
    while let Some(c) = url.chars().next_back() {
        let unbalanced = |open: char, close: char| {
            c == close && url.matches(open).count() < url.matches(close).count()
        };
        if matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'')
            || unbalanced('(', ')')
            || unbalanced('[', ']')
        {
            url = &url[..url.len() - c.len_utf8()];
        } else {
            break;
        }
    }
    url
}

fn push_smileys(out: &mut String, segment: &str, smileys: &dyn SmileyResolver) {
    let mut rest = segment;
    while !rest.is_empty() {
        let token_start = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..token_start]);
        rest = &rest[token_start..];

        let token_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..token_len];
        match smileys.lookup(token) {
            Some(icon) if !token.is_empty() => {
                out.push_str("<img src=\"");
                escape_html_into(out, &icon);
                out.push_str("\" alt=\"");
                escape_html_into(out, token);
                out.push_str("\" class=\"smiley\" />");
            }
            _ => escape_html_into(out, token),
        }
        rest = &rest[token_len..];
    }
}
