//! Media URL resolution.

use std::sync::LazyLock;

use regex::Regex;

/// Resolved media descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Media {
    /// Image displayed with `<img>`.
    Image { url: String },
    /// Embeddable video player.
    Video { url: String, embed_url: String },
}

/// Error returned when a URL cannot be used as media.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Not a valid media URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported media: {0}")]
    Unsupported(String),
}

/// Resolves URLs to media descriptors.
///
/// Resolvers are shared by every session using a registry, so they must be
/// `Send + Sync`.
pub trait MediaResolver: Send + Sync {
    /// Resolve `url`, or reject it.
    fn lookup(&self, url: &str) -> Result<Media, MediaError>;
}

/// Default resolver for web URLs.
///
/// `http(s)` URLs are images, except `YouTube` watch and short links, which
/// become embeddable videos. Anything else is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMediaResolver;

static WEB_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^https?://[^\s"'<>]+$"#).unwrap());

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:(?:www\.|m\.)?youtube\.com/watch\?(?:[^#\s]*&)?v=|youtu\.be/)([A-Za-z0-9_-]{11})(?:[&?#][^\s]*)?$",
    )
    .unwrap()
});

impl MediaResolver for WebMediaResolver {
    fn lookup(&self, url: &str) -> Result<Media, MediaError> {
        let url = url.trim();
        if !WEB_URL_RE.is_match(url) {
            return Err(MediaError::InvalidUrl(url.to_owned()));
        }

        if let Some(caps) = YOUTUBE_RE.captures(url) {
            return Ok(Media::Video {
                url: url.to_owned(),
                embed_url: format!("https://www.youtube.com/embed/{}", &caps[1]),
            });
        }

        Ok(Media::Image {
            url: url.to_owned(),
        })
    }
}

/// Resolver rejecting every URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMedia;

impl MediaResolver for NoMedia {
    fn lookup(&self, url: &str) -> Result<Media, MediaError> {
        Err(MediaError::Unsupported(url.to_owned()))
    }
}
