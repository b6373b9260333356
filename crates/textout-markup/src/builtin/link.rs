//! Links and media: tags that validate their whole content before rendering.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::text::escape_html;
use crate::{Media, MediaResolver, Tag, TagCall, TagCapability, TagError};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:(?:https?|ftp)://[^\s<>"]+|/[^\s<>"]*|#[A-Za-z0-9_-]+)$"#).unwrap()
});

pub(super) fn tags() -> Vec<TagCapability> {
    vec![
        TagCapability::inline(link)
            .with_aliases(["[url]", "[link]"])
            .preprocessing()
            .with_default(),
        TagCapability::inline(image)
            .with_alias("[img]")
            .preprocessing()
            .replacing_content(),
        TagCapability::block(video)
            .with_alias("[video]")
            .preprocessing()
            .replacing_content(),
    ]
}

/// Hyperlink; the target is the value, or the content when there is none.
struct Link {
    url: Option<String>,
    html: bool,
}

fn link(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let url = match call.value {
        Some(value) => {
            let value = value.trim();
            if !LINK_RE.is_match(value) {
                return Err(call.invalid_value(value));
            }
            Some(value.to_owned())
        }
        None => None,
    };
    Ok(Box::new(Link {
        url,
        html: call.is_html(),
    }))
}

impl Tag for Link {
    fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
        if self.url.is_none() {
            let url = content.trim();
            if !LINK_RE.is_match(url) {
                return Err(TagError::InvalidContent(url.to_owned()));
            }
            self.url = Some(url.to_owned());
        }
        Ok(None)
    }

    fn default_content(&mut self) -> Result<String, TagError> {
        self.url.clone().ok_or(TagError::EmptyContent)
    }

    fn begin(&mut self) -> String {
        match &self.url {
            Some(url) if self.html => format!(r#"<a href="{}">"#, escape_html(url)),
            _ => String::new(),
        }
    }

    fn end(&mut self) -> String {
        if self.html { "</a>".to_owned() } else { String::new() }
    }
}

/// Inline image resolved through the media resolver.
struct Image {
    media: Arc<dyn MediaResolver>,
    html: bool,
    dimensions: Option<(u16, u16)>,
    url: String,
}

fn image(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    let dimensions = match call.value {
        Some(value) => Some(parse_dimensions(value).ok_or_else(|| call.invalid_value(value))?),
        None => None,
    };
    Ok(Box::new(Image {
        media: Arc::clone(call.media),
        html: call.is_html(),
        dimensions,
        url: String::new(),
    }))
}

/// Parse `WIDTHxHEIGHT`.
fn parse_dimensions(value: &str) -> Option<(u16, u16)> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse().ok().filter(|w| *w > 0)?;
    let height = height.trim().parse().ok().filter(|h| *h > 0)?;
    Some((width, height))
}

impl Tag for Image {
    fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
        match self.media.lookup(content)? {
            Media::Image { url } => {
                self.url = url;
                Ok(None)
            }
            Media::Video { url, .. } => Err(TagError::InvalidContent(url)),
        }
    }

    fn content(&mut self) -> String {
        if !self.html {
            return self.url.clone();
        }
        let url = escape_html(&self.url);
        match self.dimensions {
            Some((width, height)) => {
                format!(r#"<img src="{url}" width="{width}" height="{height}" alt="" />"#)
            }
            None => format!(r#"<img src="{url}" alt="" />"#),
        }
    }
}

/// Embedded video player.
struct Video {
    media: Arc<dyn MediaResolver>,
    html: bool,
    url: String,
    embed_url: String,
}

fn video(call: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
    Ok(Box::new(Video {
        media: Arc::clone(call.media),
        html: call.is_html(),
        url: String::new(),
        embed_url: String::new(),
    }))
}

impl Tag for Video {
    fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
        match self.media.lookup(content)? {
            Media::Video { url, embed_url } => {
                self.url = url;
                self.embed_url = embed_url;
                Ok(None)
            }
            Media::Image { url } => Err(TagError::InvalidContent(url)),
        }
    }

    fn content(&mut self) -> String {
        if self.html {
            format!(
                r#"<div class="video"><iframe src="{}" allowfullscreen></iframe></div>"#,
                escape_html(&self.embed_url)
            )
        } else {
            self.url.clone()
        }
    }
}
