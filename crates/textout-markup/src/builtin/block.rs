//! Block base tags.

use std::sync::LazyLock;

use regex::Regex;

use super::Markup;
use crate::text::escape_html;
use crate::{Tag, TagCall, TagCapability, TagError};

const ALIGNMENTS: &[&str] = &["center", "left", "right", "justify"];

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+#-]{1,32}$").unwrap());

pub(super) fn tags() -> Vec<TagCapability> {
    vec![
        TagCapability::block(align)
            .with_aliases(["[align]", "[center]", "[left]", "[right]", "[justify]"]),
        TagCapability::block(code)
            .with_alias("[code]")
            .with_raw(true),
        TagCapability::block(quote)
            .with_alias("[quote]")
            .superblock()
            .processing_value(),
        TagCapability::block(spoiler)
            .with_alias("[spoiler]")
            .superblock()
            .processing_value(),
        TagCapability::block(|_| Ok(Box::new(Rule)))
            .with_alias("[hr]")
            .replacing_content(),
    ]
}

fn align(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let alignment = match call.name {
        "[align]" => call.require_value()?.to_ascii_lowercase(),
        name => name.trim_start_matches('[').trim_end_matches(']').to_owned(),
    };
    if !ALIGNMENTS.contains(&alignment.as_str()) {
        return Err(call.invalid_value(&alignment));
    }
    Ok(Markup::boxed(
        call,
        format!(r#"<div style="text-align: {alignment}">"#),
        "</div>",
    ))
}

fn code(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let begin = match call.value.map(str::trim) {
        None | Some("") => "<pre><code>".to_owned(),
        Some(language) if LANGUAGE_RE.is_match(language) => format!(
            r#"<pre><code class="language-{}">"#,
            escape_html(&language.to_ascii_lowercase())
        ),
        Some(language) => return Err(call.invalid_value(language)),
    };
    Ok(Markup::boxed(call, begin, "</code></pre>"))
}

// Values of quote and spoiler arrive already filtered as text.

fn quote(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let begin = match call.value.map(str::trim) {
        Some(author) if !author.is_empty() => {
            format!("<blockquote><cite>{author}</cite>")
        }
        _ => "<blockquote>".to_owned(),
    };
    Ok(Markup::boxed(call, begin, "</blockquote>"))
}

fn spoiler(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let title = call
        .value
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("Spoiler");
    Ok(Markup::boxed(
        call,
        format!(r#"<details class="spoiler"><summary>{title}</summary>"#),
        "</details>",
    ))
}

/// Horizontal rule; anything written inside is dropped.
struct Rule;

impl Tag for Rule {
    fn content(&mut self) -> String {
        "<hr />".to_owned()
    }
}
