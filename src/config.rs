//! Configuration for a single run, loaded once at process start.
//!
//! Values come from an optional TOML file, then environment variables
//! (typically populated from a `.env` file) override them. The resulting
//! [`Config`] is immutable and handed to each component's constructor.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::publish::Visibility;
use crate::util::validate_url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A required setting has no value in either the file or the environment.
    #[error("Missing required setting `{0}`")]
    Missing(&'static str),

    #[error("Invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const DEFAULT_MAX_STATUS_CHARS: usize = 500;

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one JSON record per feed URL.
    pub cache_dir: PathBuf,

    /// Hard cap on the published status length, in characters.
    pub max_status_chars: usize,

    /// Per-request timeout for every HTTP call.
    pub request_timeout_secs: u64,

    /// Write the dedup record only once the status was published.
    pub commit_after_publish: bool,

    pub translation: TranslationConfig,

    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("tmp"),
            max_status_chars: DEFAULT_MAX_STATUS_CHARS,
            request_timeout_secs: 30,
            commit_after_publish: false,
            translation: TranslationConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: Option<String>,
    /// DeepL target language code, e.g. `EN-US` or `ZH`.
    pub target_language: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: DEFAULT_DEEPL_API_URL.to_string(),
            api_key: None,
            target_language: None,
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Full statuses endpoint, e.g. `https://mastodon.social/api/v1/statuses`.
    pub api_url: Option<String>,
    /// Sent verbatim as the `Authorization` header (`Bearer ...`).
    pub api_key: Option<String>,
    pub visibility: Visibility,
}

/// Mask API keys in Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("cache_dir", &self.cache_dir)
            .field("max_status_chars", &self.max_status_chars)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("commit_after_publish", &self.commit_after_publish)
            .field("translation", &self.translation)
            .field("publish", &self.publish)
            .finish()
    }
}

impl std::fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("enabled", &self.enabled)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("target_language", &self.target_language)
            .finish()
    }
}

impl std::fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "cache_dir",
        "max_status_chars",
        "request_timeout_secs",
        "commit_after_publish",
        "translation",
        "publish",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown top-level keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps an environment variable name
    /// to its value. Env values take precedence over file values; blank
    /// values are treated as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(flag) = get("TRANSLATION_ENABLED") {
            self.translation.enabled = parse_flag(&flag);
        }
        if let Some(url) = get("DEEPL_API_URL") {
            self.translation.api_url = url;
        }
        if let Some(key) = get("DEEPL_API_KEY") {
            self.translation.api_key = Some(key);
        }
        if let Some(lang) = get("DEEPL_TARGET_LANGUAGE") {
            self.translation.target_language = Some(lang);
        }
        if let Some(url) = get("MASTODON_API_URL") {
            self.publish.api_url = Some(url);
        }
        if let Some(key) = get("MASTODON_API_KEY") {
            self.publish.api_key = Some(key);
        }
        if let Some(dir) = get("RSSTOOT_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check that every setting needed for a run is present and well-formed.
    ///
    /// Translation settings are only required when translation is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let publish_url = self
            .publish
            .api_url
            .as_deref()
            .ok_or(ConfigError::Missing("publish.api_url"))?;
        check_url("publish.api_url", publish_url)?;
        if self.publish.api_key.is_none() {
            return Err(ConfigError::Missing("publish.api_key"));
        }

        if self.translation.enabled {
            check_url("translation.api_url", &self.translation.api_url)?;
            if self.translation.api_key.is_none() {
                return Err(ConfigError::Missing("translation.api_key"));
            }
            if self.translation.target_language.is_none() {
                return Err(ConfigError::Missing("translation.target_language"));
            }
        }

        // Room for at least one character plus the ellipsis
        if self.max_status_chars < 4 {
            return Err(ConfigError::Invalid {
                key: "max_status_chars",
                reason: format!("{} is below the minimum of 4", self.max_status_chars),
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "True" | "true" | "TRUE" | "1" | "yes")
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    validate_url(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn publishable() -> Config {
        Config::default().with_overrides(env(&[
            ("MASTODON_API_URL", "https://mastodon.example/api/v1/statuses"),
            ("MASTODON_API_KEY", "Bearer token"),
        ]))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from("tmp"));
        assert_eq!(config.max_status_chars, 500);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.commit_after_publish);
        assert!(!config.translation.enabled);
        assert_eq!(config.translation.api_url, DEFAULT_DEEPL_API_URL);
        assert_eq!(config.publish.visibility, Visibility::Public);
        assert!(config.publish.api_url.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_status_chars, 500);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsstoot.toml");
        std::fs::write(&path, "   \n  \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("tmp"));
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsstoot.toml");
        let content = r#"
cache_dir = "/var/cache/rsstoot"
max_status_chars = 280
request_timeout_secs = 10
commit_after_publish = true

[translation]
enabled = true
api_key = "deepl-key"
target_language = "EN-US"

[publish]
api_url = "https://mastodon.example/api/v1/statuses"
api_key = "Bearer abc"
visibility = "unlisted"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/rsstoot"));
        assert_eq!(config.max_status_chars, 280);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.commit_after_publish);
        assert!(config.translation.enabled);
        assert_eq!(config.translation.api_url, DEFAULT_DEEPL_API_URL);
        assert_eq!(config.translation.target_language.as_deref(), Some("EN-US"));
        assert_eq!(config.publish.visibility, Visibility::Unlisted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsstoot.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsstoot.toml");
        std::fs::write(&path, "max_status_chars = 400\nfavourite_colour = \"blue\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_status_chars, 400);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsstoot.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.publish.api_url = Some("https://old.example/api/v1/statuses".into());

        let config = config.with_overrides(env(&[
            ("TRANSLATION_ENABLED", "True"),
            ("DEEPL_API_URL", "https://api.deepl.com/v2/translate"),
            ("DEEPL_API_KEY", "k"),
            ("DEEPL_TARGET_LANGUAGE", "ZH"),
            ("MASTODON_API_URL", "https://new.example/api/v1/statuses"),
            ("RSSTOOT_CACHE_DIR", "/tmp/seen"),
        ]));

        assert!(config.translation.enabled);
        assert_eq!(config.translation.api_url, "https://api.deepl.com/v2/translate");
        assert_eq!(config.translation.target_language.as_deref(), Some("ZH"));
        assert_eq!(
            config.publish.api_url.as_deref(),
            Some("https://new.example/api/v1/statuses")
        );
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/seen"));
    }

    #[test]
    fn test_translation_flag_parsing() {
        for (raw, expected) in [("True", true), ("1", true), ("False", false), ("nope", false)] {
            let config = Config::default().with_overrides(env(&[("TRANSLATION_ENABLED", raw)]));
            assert_eq!(config.translation.enabled, expected, "flag {raw:?}");
        }
    }

    #[test]
    fn test_blank_env_value_ignored() {
        let mut config = Config::default();
        config.publish.api_key = Some("from-file".into());
        let config = config.with_overrides(env(&[("MASTODON_API_KEY", "  ")]));
        assert_eq!(config.publish.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate_requires_publish_target() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("publish.api_url")));

        let config = Config::default().with_overrides(env(&[(
            "MASTODON_API_URL",
            "https://mastodon.example/api/v1/statuses",
        )]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("publish.api_key"))
        ));

        assert!(publishable().validate().is_ok());
    }

    #[test]
    fn test_validate_translation_only_when_enabled() {
        let mut config = publishable();
        assert!(config.validate().is_ok());

        config.translation.enabled = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("translation.api_key"))
        ));

        config.translation.api_key = Some("k".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("translation.target_language"))
        ));

        config.translation.target_language = Some("EN-GB".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url_and_tiny_limit() {
        let mut config = publishable();
        config.publish.api_url = Some("mastodon.example/statuses".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "publish.api_url", .. })
        ));

        let mut config = publishable();
        config.max_status_chars = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "max_status_chars", .. })
        ));
    }

    #[test]
    fn test_debug_masks_api_keys() {
        let mut config = publishable();
        config.translation.api_key = Some("deepl-secret-123".into());

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("Bearer token"));
        assert!(!debug_output.contains("deepl-secret-123"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
