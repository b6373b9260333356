//! External resolvers consulted while rendering: smileys and media.

mod media;
mod smiley;

pub use media::{Media, MediaError, MediaResolver, NoMedia, WebMediaResolver};
pub use smiley::{SmileyResolver, SmileyTable};
