use crate::error::{NotifierError, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

static DEFAULT_DATABASE_PATH: &str = "data/subscriptions";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

const BOT_TOKEN_KEY: &str = "TELEGRAM_BOT_TOKEN";
const DIFF_NOTIFICATIONS_KEY: &str = "TELEGRAM_DIFF_NOTIFICATIONS";
const DATABASE_PATH_KEY: &str = "DATABASE_PATH";
const POLL_TIMEOUT_KEY: &str = "TELEGRAM_POLL_TIMEOUT";

/// Process settings, read from an optional TOML file and then the environment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub telegram_bot_token: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub telegram_diff_notifications: bool,
    pub database_path: PathBuf,
    pub poll_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            telegram_bot_token: None,
            telegram_diff_notifications: false,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }
}

/// What the bot needs once a token is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub best_diff_notifications: bool,
    pub poll_timeout_secs: u64,
}

/// A missing token is a valid configuration: the bot is simply off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMode {
    Disabled,
    Enabled(BotConfig),
}

impl Settings {
    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let settings = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Settings::default(),
        };
        Ok(settings.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path).map_err(|e| {
            NotifierError::Config(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Settings> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(BOT_TOKEN_KEY) {
            self.telegram_bot_token = Some(token);
        }
        if let Some(flag) = lookup(DIFF_NOTIFICATIONS_KEY) {
            self.telegram_diff_notifications = parse_flag(&flag);
        }
        if let Some(path) = lookup(DATABASE_PATH_KEY) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(timeout) = lookup(POLL_TIMEOUT_KEY) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.poll_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring unparseable {POLL_TIMEOUT_KEY}: {timeout}"),
            }
        }
        self
    }

    pub fn bot_mode(&self) -> BotMode {
        match self.telegram_bot_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => BotMode::Enabled(BotConfig {
                token: token.to_string(),
                best_diff_notifications: self.telegram_diff_notifications,
                poll_timeout_secs: self.poll_timeout_secs,
            }),
            _ => BotMode::Disabled,
        }
    }
}

/// Only a case-insensitive "true" turns a flag on
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

// Files may spell the flag as a bool or as a string; anything else is off
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match toml::Value::deserialize(deserializer)? {
        toml::Value::Boolean(flag) => flag,
        toml::Value::String(text) => parse_flag(&text),
        other => {
            log::warn!("Ignoring unparseable telegram_diff_notifications: {other}");
            false
        }
    })
}
