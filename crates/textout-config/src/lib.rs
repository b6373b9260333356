//! Configuration management for textout.
//!
//! Parses `textout.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [output]
//! format = "html"
//!
//! [tokenizer]
//! buffer_capacity = 1024
//!
//! [tweaks]
//! inline = false
//! label_prefix = "post-"
//!
//! [smileys]
//! ":)" = "${SMILEY_URL:-/smileys}/smile.gif"
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String tweak values and smiley URLs support `${VAR}` and
//! `${VAR:-default}` expansion.

mod expand;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use textout_markup::{
    DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY, OutputFormat, SmileyTable, TagRegistry,
    Translator, Tweaks,
};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "textout.toml";

/// Largest accepted tokenizer buffer, in characters.
const MAX_BUFFER_CAPACITY: usize = 1 << 20;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config;
/// tweaks are merged over the file's tweaks.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output format.
    pub format: Option<OutputFormat>,
    /// Override tokenizer buffer capacity.
    pub buffer_capacity: Option<usize>,
    /// Additional tweaks, as `(key, value)` pairs.
    pub tweaks: Vec<(String, String)>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (format as written in TOML).
    output: OutputConfigRaw,
    /// Tokenizer configuration.
    pub tokenizer: TokenizerConfig,
    /// Tweaks passed to the translator.
    pub tweaks: BTreeMap<String, TweakValue>,
    /// Smiley token to icon URL.
    pub smileys: BTreeMap<String, String>,

    /// Resolved output format (set after loading).
    #[serde(skip)]
    pub format: OutputFormat,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfigRaw::default(),
            tokenizer: TokenizerConfig::default(),
            tweaks: BTreeMap::new(),
            smileys: BTreeMap::new(),
            format: OutputFormat::default(),
            config_path: None,
        }
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    format: Option<String>,
}

/// Tokenizer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Characters buffered while scanning; tags longer than this are text.
    pub buffer_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Tweak value as written in TOML.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TweakValue {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl fmt::Display for TweakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`tweaks.label_prefix`").
        field: String,
        /// Error message (e.g., "${`LABEL_PREFIX`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `textout.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(format) = settings.format {
            self.format = format;
        }
        if let Some(buffer_capacity) = settings.buffer_capacity {
            self.tokenizer.buffer_capacity = buffer_capacity;
        }
        for (key, value) in &settings.tweaks {
            let normalized = Tweaks::normalize_key(key);
            self.tweaks
                .retain(|existing, _| Tweaks::normalize_key(existing) != normalized);
            self.tweaks.insert(key.clone(), TweakValue::String(value.clone()));
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.resolve()?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_tokenizer()?;
        self.validate_tweaks()?;
        self.validate_smileys()?;
        Ok(())
    }

    fn validate_tokenizer(&self) -> Result<(), ConfigError> {
        let capacity = self.tokenizer.buffer_capacity;
        if capacity < MIN_BUFFER_CAPACITY {
            return Err(ConfigError::Validation(format!(
                "tokenizer.buffer_capacity must be at least {MIN_BUFFER_CAPACITY}"
            )));
        }
        if capacity > MAX_BUFFER_CAPACITY {
            return Err(ConfigError::Validation(format!(
                "tokenizer.buffer_capacity cannot exceed {MAX_BUFFER_CAPACITY}"
            )));
        }
        Ok(())
    }

    /// Tweak keys are matched loosely, so two spellings of one key clash.
    fn validate_tweaks(&self) -> Result<(), ConfigError> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for key in self.tweaks.keys() {
            if let Some(other) = seen.insert(Tweaks::normalize_key(key), key) {
                return Err(ConfigError::Validation(format!(
                    "tweaks.{other} and tweaks.{key} name the same tweak"
                )));
            }
        }
        Ok(())
    }

    /// Smiley tokens are matched against whitespace-delimited words.
    fn validate_smileys(&self) -> Result<(), ConfigError> {
        for (token, url) in &self.smileys {
            if token.is_empty() || token.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "smiley token {token:?} must be a single word"
                )));
            }
            if url.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "smileys.{token:?} cannot be empty"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (key, value) in &mut self.tweaks {
            if let TweakValue::String(text) = value {
                *text = expand::expand_env(text, &format!("tweaks.{key}"))?;
            }
        }
        for (token, url) in &mut self.smileys {
            *url = expand::expand_env(url, &format!("smileys.{token:?}"))?;
        }
        Ok(())
    }

    /// Resolve raw sections into typed values.
    fn resolve(&mut self) -> Result<(), ConfigError> {
        if let Some(format) = &self.output.format {
            self.format = format.parse().map_err(|_| {
                ConfigError::Validation(format!("output.format {format:?} is not supported"))
            })?;
        }
        Ok(())
    }

    /// Tweak dictionary for the translator.
    #[must_use]
    pub fn translator_tweaks(&self) -> Tweaks {
        self.tweaks
            .iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect()
    }

    /// Smiley table for the tag registry.
    #[must_use]
    pub fn smiley_table(&self) -> SmileyTable {
        self.smileys
            .iter()
            .map(|(token, url)| (token.clone(), url.clone()))
            .collect()
    }

    /// Translator with the base tags, configured from this file.
    #[must_use]
    pub fn translator(&self) -> Translator {
        let registry = TagRegistry::default().with_smileys(self.smiley_table());
        Translator::new(registry)
            .with_format(self.format)
            .with_tweaks(self.translator_tweaks())
            .with_buffer_capacity(self.tokenizer.buffer_capacity)
    }
}

/// Search for a config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.tokenizer.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(config.tweaks.is_empty());
        assert!(config.smileys.is_empty());
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve().unwrap();
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.tokenizer.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[output]
format = "Lightscript"

[tokenizer]
buffer_capacity = 256

[tweaks]
inline = true
depth = 3
label_prefix = "post-"

[smileys]
":)" = "/s/smile.gif"
"<3" = "/s/heart.gif"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve().unwrap();

        assert_eq!(config.format, OutputFormat::Lightscript);
        assert_eq!(config.tokenizer.buffer_capacity, 256);
        assert_eq!(config.tweaks["inline"], TweakValue::Bool(true));
        assert_eq!(config.tweaks["depth"], TweakValue::Integer(3));
        assert_eq!(
            config.tweaks["label_prefix"],
            TweakValue::String("post-".to_owned())
        );
        assert_eq!(config.smileys.len(), 2);

        let tweaks = config.translator_tweaks();
        assert!(tweaks.flag("inline"));
        assert_eq!(tweaks.get("depth"), Some("3"));
        assert_eq!(tweaks.get("LabelPrefix"), Some("post-"));
    }

    #[test]
    fn test_unsupported_format() {
        let mut config: Config = toml::from_str("[output]\nformat = \"markdown\"").unwrap();
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("markdown"));
    }

    #[test]
    fn test_validate_buffer_capacity() {
        let mut config = Config::default();
        config.tokenizer.buffer_capacity = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.tokenizer.buffer_capacity = MAX_BUFFER_CAPACITY + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.tokenizer.buffer_capacity = MIN_BUFFER_CAPACITY;
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_smileys() {
        let mut config = Config::default();
        config.smileys.insert(": )".to_owned(), "/s.gif".to_owned());
        assert!(config.validate().unwrap_err().to_string().contains("single word"));

        config.smileys.clear();
        config.smileys.insert(":)".to_owned(), String::new());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEXTOUT_TEST_ICONS", "https://cdn.test");
        }

        let toml = r#"
[tweaks]
inline = true
label_prefix = "${TEXTOUT_TEST_PREFIX_UNSET:-doc-}"

[smileys]
":)" = "${TEXTOUT_TEST_ICONS}/smile.gif"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.tweaks["label_prefix"],
            TweakValue::String("doc-".to_owned())
        );
        assert_eq!(config.smileys[":)"], "https://cdn.test/smile.gif");

        unsafe {
            std::env::remove_var("TEXTOUT_TEST_ICONS");
        }
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config: Config = toml::from_str("[tweaks]\nlabel_prefix = \"a-\"").unwrap();
        let settings = CliSettings {
            format: Some(OutputFormat::Lightscript),
            buffer_capacity: Some(64),
            tweaks: vec![
                ("label_prefix".to_owned(), "b-".to_owned()),
                ("inline".to_owned(), "1".to_owned()),
            ],
        };

        config.apply_cli_settings(&settings);

        assert_eq!(config.format, OutputFormat::Lightscript);
        assert_eq!(config.tokenizer.buffer_capacity, 64);
        let tweaks = config.translator_tweaks();
        assert_eq!(tweaks.get("label_prefix"), Some("b-"));
        assert!(tweaks.flag("inline"));
    }

    #[test]
    fn test_cli_tweak_overrides_other_spelling() {
        let mut config: Config = toml::from_str("[tweaks]\nlabel_prefix = \"file-\"").unwrap();
        let settings = CliSettings {
            tweaks: vec![("LabelPrefix".to_owned(), "cli-".to_owned())],
            ..CliSettings::default()
        };

        config.apply_cli_settings(&settings);

        config.validate().unwrap();
        assert_eq!(config.tweaks.len(), 1);
        assert_eq!(config.translator_tweaks().get("label_prefix"), Some("cli-"));
    }

    #[test]
    fn test_validate_duplicate_tweak_spellings() {
        let config: Config =
            toml::from_str("[tweaks]\nlabel_prefix = \"a-\"\nLabelPrefix = \"b-\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("LabelPrefix"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.tokenizer.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(config.tweaks.is_empty());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[output]\nformat = \"html\"\n[smileys]\n\":)\" = \"/smile.gif\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));

        let html = config.translator().translate_str("hi :)").unwrap();
        assert_eq!(
            html,
            r#"<p>hi <img src="/smile.gif" alt=":)" class="smiley" /></p>"#
        );
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[tokenizer\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            buffer_capacity: Some(1),
            ..CliSettings::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            discover_config(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("project");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(discover_config(&nested), Some(nested.join(CONFIG_FILENAME)));
    }
}
