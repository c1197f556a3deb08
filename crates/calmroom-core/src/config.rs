//! TOML-based application configuration.
//!
//! Stores:
//! - Backend location and publishable key
//! - Chat function name and canned greeting/apology
//! - Breathing tick interval and custom breathing profiles
//! - Listing sizes for moods and journal entries
//!
//! Configuration is stored at `~/.config/calmroom/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::{DEFAULT_APOLOGY, DEFAULT_GREETING};
use crate::error::ConfigError;
use crate::timer::{builtin_profiles, BreathingProfile};

/// Overrides `backend.url` when set.
pub const URL_ENV: &str = "CALMROOM_URL";
/// Overrides `backend.anon_key` when set.
pub const ANON_KEY_ENV: &str = "CALMROOM_ANON_KEY";

/// Returns `~/.config/calmroom[-dev]/` based on CALMROOM_ENV.
///
/// Set CALMROOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CALMROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("calmroom-dev")
    } else {
        base_dir.join("calmroom")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Hosted backend the app talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.example.co`.
    #[serde(default)]
    pub url: String,
    /// Publishable (anon) key.
    #[serde(default)]
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Fail early when the backend has not been configured.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingKey`] for the first empty setting, or
    /// [`ConfigError::InvalidValue`] if the URL is not an http(s) URL.
    pub fn ensure_configured(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingKey("backend.url".into()));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingKey("backend.anon_key".into()));
        }
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "backend.url".into(),
            message,
        };
        let parsed = url::Url::parse(self.url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme: {}", parsed.scheme())));
        }
        Ok(())
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base())
    }

    pub fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{function}", self.base())
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base())
    }
}

/// Chat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_function")]
    pub function: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_apology")]
    pub apology: String,
}

/// Breathing exercise configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingConfig {
    /// Milliseconds per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Extra profiles in addition to the built-in ones.
    #[serde(default)]
    pub profiles: Vec<BreathingProfile>,
}

/// Mood tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// Journal configuration. No limit lists every entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub list_limit: Option<usize>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calmroom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub mood: MoodConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub breathing: BreathingConfig,
}

// Default functions
fn default_chat_function() -> String {
    "wellness-chat".into()
}
fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}
fn default_apology() -> String {
    DEFAULT_APOLOGY.into()
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_recent_limit() -> usize {
    7
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            function: default_chat_function(),
            greeting: default_greeting(),
            apology: default_apology(),
        }
    }
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            profiles: Vec::new(),
        }
    }
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Optional numbers serialize as null; a required number
                // set to null is rejected when the config is rebuilt.
                serde_json::Value::Number(_) | serde_json::Value::Null => match value {
                    "" | "none" | "null" => serde_json::Value::Null,
                    _ => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                },
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    /// Environment overrides are applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_from(&Self::path()?)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Set one dot-path key in the config file and persist it.
    ///
    /// The file is read without environment overrides, so a temporary
    /// `CALMROOM_URL` or `CALMROOM_ANON_KEY` is never written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or saved, or the key
    /// or value is invalid.
    pub fn update(key: &str, value: &str) -> Result<Self, ConfigError> {
        Self::update_file(&Self::path()?, key, value)
    }

    /// [`Config::update`] against an explicit file.
    ///
    /// # Errors
    ///
    /// Same as [`Config::update`].
    pub fn update_file(path: &Path, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::load_from(path)?;
        cfg.set(key, value)?;
        cfg.save_to(path)?;
        Ok(cfg)
    }

    /// Overwrite the config file with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be written.
    pub fn reset() -> Result<Self, ConfigError> {
        let cfg = Self::default();
        cfg.save()?;
        Ok(cfg)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Apply `CALMROOM_URL` / `CALMROOM_ANON_KEY`.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            self.backend.url = url;
        }
        if let Ok(key) = std::env::var(ANON_KEY_ENV) {
            self.backend.anon_key = key;
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing type.
    /// Does not persist; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Built-in profiles followed by the configured ones.
    pub fn profiles(&self) -> Vec<BreathingProfile> {
        let mut profiles = builtin_profiles();
        for custom in &self.breathing.profiles {
            match profiles.iter_mut().find(|p| p.id == custom.id) {
                Some(existing) => *existing = custom.clone(),
                None => profiles.push(custom.clone()),
            }
        }
        profiles
    }

    /// Look up a profile by id; configured profiles shadow built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] if no profile has that id.
    pub fn profile(&self, id: &str) -> Result<BreathingProfile, ConfigError> {
        self.profiles()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ConfigError::UnknownProfile(id.to_string()))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.breathing.tick_ms.max(1))
    }

    /// Full URL of the chat function.
    pub fn chat_endpoint(&self) -> String {
        self.backend.function_url(&self.chat.function)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            let mut cfg = Self::default();
            cfg.apply_env();
            cfg
        })
    }
}
