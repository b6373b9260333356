//! `${VAR}` references in configuration strings.
//!
//! `${VAR}` takes the value of VAR and fails when it is unset;
//! `${VAR:-default}` falls back to `default`. Anything else, bare `$VAR`
//! included, is kept as written.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::ConfigError;

static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap());

/// Replace the braced variable references in `value`.
///
/// `field` names the configuration entry in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;
    for caps in VAR_RE.captures_iter(value) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        expanded.push_str(&value[last..whole.start]);
        expanded.push_str(&lookup(&caps, field)?);
        last = whole.end;
    }
    expanded.push_str(&value[last..]);
    Ok(expanded)
}

fn lookup(caps: &Captures<'_>, field: &str) -> Result<String, ConfigError> {
    let name = &caps[1];
    match (std::env::var(name), caps.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{name}}} not set"),
        }),
    }
}
