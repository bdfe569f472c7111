//! Configuration management

pub mod commands;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::reader::settings::{Orientation, ReaderSettings, ReadingMode};

const CONFIG_FILE_NAME: &str = "config.toml";
pub const APP_NAME: &str = "linguality";

pub const ENV_API_BASE: &str = "LINGUALITY_API_BASE";
pub const ENV_USER_ID: &str = "LINGUALITY_USER_ID";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reading server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account used for saved words, progress and practice results
    #[serde(default)]
    pub user_id: Option<String>,

    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: None,
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub mode: ReadingMode,

    #[serde(default)]
    pub orientation: Orientation,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_line_height")]
    pub line_height: f32,

    #[serde(default = "default_margin")]
    pub margin: u32,

    #[serde(default)]
    pub show_translation: bool,

    /// Quiet interval before a progress write, in milliseconds
    #[serde(default = "default_progress_quiet_ms")]
    pub progress_quiet_ms: u64,
}

fn default_font_size() -> u32 {
    ReaderSettings::default().font_size
}

fn default_line_height() -> f32 {
    ReaderSettings::default().line_height
}

fn default_margin() -> u32 {
    ReaderSettings::default().margin
}

fn default_progress_quiet_ms() -> u64 {
    3000
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            mode: ReadingMode::default(),
            orientation: Orientation::default(),
            font_size: default_font_size(),
            line_height: default_line_height(),
            margin: default_margin(),
            show_translation: false,
            progress_quiet_ms: default_progress_quiet_ms(),
        }
    }
}

impl ReaderConfig {
    /// Session defaults, with the font size brought into range.
    pub fn settings(&self) -> ReaderSettings {
        ReaderSettings {
            mode: self.mode,
            orientation: self.orientation,
            font_size: self.font_size,
            line_height: self.line_height,
            margin: self.margin,
            show_translation: self.show_translation,
        }
        .sanitized()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Source language; the server detects it when unset
    #[serde(default)]
    pub source_lang: Option<String>,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Language recorded on saved words
    #[serde(default = "default_save_language")]
    pub save_language: String,
}

fn default_target_lang() -> String {
    "en".to_string()
}

fn default_save_language() -> String {
    "ru".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: None,
            target_lang: default_target_lang(),
            save_language: default_save_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Custom database path
    #[serde(default)]
    pub path: Option<String>,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Load config from default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_env_overrides())
    }

    /// Load config from default location exactly as written
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config path")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to default location
    pub fn save(&self) -> Result<PathBuf> {
        let dir = Self::config_dir().context("Could not determine config directory")?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content).context("Failed to write config file")?;

        Ok(path)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_BASE).ok(),
            std::env::var(ENV_USER_ID).ok(),
        )
    }

    fn with_overrides(mut self, api_base: Option<String>, user_id: Option<String>) -> Self {
        if let Some(base) = api_base.filter(|v| !v.is_empty()) {
            self.api.base_url = base;
        }
        if let Some(user) = user_id.filter(|v| !v.is_empty()) {
            self.api.user_id = Some(user);
        }
        self
    }

    /// User id for commands that need an account
    pub fn require_user(&self) -> Result<&str> {
        self.api.user_id.as_deref().context(format!(
            "No user configured. Run `{} config set api.user_id <id>` or set {}",
            APP_NAME, ENV_USER_ID
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [api]
            user_id = "u1"

            [reader]
            font_size = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.api.user_id.as_deref(), Some("u1"));
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.reader.progress_quiet_ms, 3000);
        assert_eq!(config.reader.settings().font_size, 28);
        assert_eq!(config.translation.target_lang, "en");
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = Config::default().with_overrides(
            Some("https://reader.example".into()),
            Some("u9".into()),
        );
        assert_eq!(config.api.base_url, "https://reader.example");
        assert_eq!(config.require_user().unwrap(), "u9");
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let config = Config::default().with_overrides(Some(String::new()), None);
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert!(config.require_user().is_err());
    }

    #[test]
    fn test_reading_mode_in_toml() {
        let config = Config::parse("[reader]\nmode = \"line\"\norientation = \"vertical\"").unwrap();
        assert_eq!(config.reader.mode, ReadingMode::Line);
        assert_eq!(config.reader.orientation, Orientation::Vertical);
    }
}
