//! Inline base tags.

use std::sync::LazyLock;

use regex::Regex;

use super::Markup;
use crate::text::escape_html;
use crate::{Tag, TagCall, TagCapability, TagError};

const COLORS: &[&str] = &[
    "black", "blue", "brown", "gray", "green", "grey", "maroon", "orange", "pink", "purple", "red",
    "white", "yellow",
];

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-f]{3}){1,2}$").unwrap());

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub(super) fn tags() -> Vec<TagCapability> {
    let mut color_aliases = vec!["[color]".to_owned()];
    color_aliases.extend(COLORS.iter().map(|c| format!("[{c}]")));

    vec![
        simple(&["[b]"], "<b>", "</b>"),
        simple(&["[i]"], "<i>", "</i>"),
        simple(&["[u]"], "<u>", "</u>"),
        simple(&["[s]", "[strike]"], "<s>", "</s>"),
        TagCapability::inline(color).with_aliases(color_aliases.iter().map(String::as_str)),
        TagCapability::inline(size).with_aliases(["[size]", "[big]", "[small]"]),
        TagCapability::inline(label).with_alias("[label]"),
        TagCapability::inline(target).with_alias("[target]"),
        TagCapability::inline(|_| Ok(Box::new(Rot13)))
            .with_alias("[rot13]")
            .preprocessing(),
        TagCapability::inline(|call| Ok(Markup::boxed(call, "<code>", "</code>")))
            .with_aliases(["`", "[inlinecode]"])
            .with_raw(true),
        TagCapability::inline(|_| Ok(Box::new(Markup::default())))
            .with_alias("[noeval]")
            .with_raw(true),
    ]
}

fn simple(aliases: &[&str], begin: &'static str, end: &'static str) -> TagCapability {
    TagCapability::inline(move |call| Ok(Markup::boxed(call, begin, end)))
        .with_aliases(aliases.iter().copied())
}

/// Bare alias name: `[red]` gives `red`.
fn alias_name<'a>(call: &TagCall<'a>) -> &'a str {
    call.name.trim_start_matches('[').trim_end_matches(']')
}

fn color(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let color = if call.name == "[color]" {
        call.require_value()?
    } else {
        alias_name(call)
    };

    let normalized = color.to_ascii_lowercase();
    if !COLORS.contains(&normalized.as_str()) && !HEX_COLOR_RE.is_match(&normalized) {
        return Err(call.invalid_value(color));
    }

    Ok(Markup::boxed(
        call,
        format!(r#"<span style="color: {normalized}">"#),
        "</span>",
    ))
}

fn size(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let requested = match call.name {
        "[size]" => call.require_value()?.to_ascii_lowercase(),
        _ => alias_name(call).to_owned(),
    };

    let size = match requested.as_str() {
        "big" => "1.2em".to_owned(),
        "small" => "0.8em".to_owned(),
        points => match points.parse::<u8>() {
            Ok(points @ 1..=72) => format!("{points}pt"),
            _ => return Err(call.invalid_value(&requested)),
        },
    };

    Ok(Markup::boxed(
        call,
        format!(r#"<span style="font-size: {size}">"#),
        "</span>",
    ))
}

/// Anchor identifier for `[label]` and `[target]`, with the host prefix.
fn anchor_id(call: &TagCall<'_>) -> Result<String, TagError> {
    let name = call.require_value()?;
    if !LABEL_RE.is_match(name) {
        return Err(call.invalid_value(name));
    }
    let prefix = call.tweaks.get("label_prefix").unwrap_or_default();
    Ok(escape_html(&format!("{prefix}{name}")))
}

fn label(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let id = anchor_id(call)?;
    Ok(Markup::boxed(call, format!(r#"<span id="{id}">"#), "</span>"))
}

fn target(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let id = anchor_id(call)?;
    Ok(Markup::boxed(call, format!(r##"<a href="#{id}">"##), "</a>"))
}

/// Letter substitution cipher; everything but ASCII letters is kept.
struct Rot13;

impl Tag for Rot13 {
    fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
        Ok(Some(rot13(content)))
    }
}

fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => char::from(b'a' + (c as u8 - b'a' + 13) % 26),
            'A'..='Z' => char::from(b'A' + (c as u8 - b'A' + 13) % 26),
            _ => c,
        })
        .collect()
}
