//! Base tag set.
//!
//! A small vocabulary covering every engine feature: plain inline styles,
//! validated values, validate-then-render links and media, raw tags,
//! superblocks and content replacement. In Lightscript output these tags
//! produce no markup; media tags write their URL.

mod block;
mod inline;
mod link;

use crate::{Tag, TagCall, TagCapability};

/// Tag with fixed opening and closing markup.
#[derive(Debug, Default)]
struct Markup {
    begin: String,
    end: String,
}

impl Markup {
    /// Markup for HTML output, nothing otherwise.
    fn boxed(call: &TagCall<'_>, begin: impl Into<String>, end: impl Into<String>) -> Box<dyn Tag> {
        if call.is_html() {
            Box::new(Self {
                begin: begin.into(),
                end: end.into(),
            })
        } else {
            Box::new(Self::default())
        }
    }
}

impl Tag for Markup {
    fn begin(&mut self) -> String {
        self.begin.clone()
    }

    fn end(&mut self) -> String {
        self.end.clone()
    }
}

/// Capability used for implicit paragraphs.
pub(crate) fn paragraph() -> TagCapability {
    TagCapability::block(|call| Ok(Markup::boxed(call, "<p>", "</p>")))
        .with_generic(false)
        .notempty()
}

/// Every base tag capability.
pub(crate) fn tags() -> Vec<TagCapability> {
    let mut tags = Vec::new();
    tags.extend(inline::tags());
    tags.extend(link::tags());
    tags.extend(block::tags());
    tags
}

/// Translate `input` to HTML with the base tags.
#[cfg(test)]
fn render(input: &str) -> String {
    crate::Translator::default().translate_str(input).unwrap()
}

/// Same as [`render`], without implicit paragraphs.
#[cfg(test)]
fn render_inline(input: &str) -> String {
    crate::Translator::default()
        .with_tweaks(crate::Tweaks::new().with("inline", "1"))
        .translate_str(input)
        .unwrap()
}
