//! CLI command implementations.

pub(crate) mod tokens;
pub(crate) mod translate;

pub(crate) use tokens::TokensArgs;
pub(crate) use translate::TranslateArgs;
