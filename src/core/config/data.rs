use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Be concise and clear in your responses. When analyzing web pages, focus on the most important information.";

/// Connection settings read at the start of every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
}

impl ServerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Persisted user settings. Every field is optional on disk.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model server address, e.g. `http://localhost:11434`
    pub base_url: Option<String>,
    /// Model used when a command does not pass `--model`
    pub selected_model: Option<String>,
    /// Sent as a leading system message; an empty string disables it
    pub system_prompt: Option<String>,
    /// Prefix chat turns with the current page title and URL
    pub include_page_context: Option<bool>,
    /// Stream responses token by token instead of waiting for the full reply
    pub stream_responses: Option<bool>,
}

/// Settings keys accepted by `set` / `unset`.
pub const SETTING_KEYS: &[&str] = &["base-url", "model", "system-prompt", "page-context", "stream"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingError {
    #[error("unknown setting '{0}' (expected one of: base-url, model, system-prompt, page-context, stream)")]
    UnknownKey(String),
    #[error("setting '{key}' expects true or false, got '{value}'")]
    InvalidBool { key: String, value: String },
    #[error("setting '{0}' needs a value")]
    MissingValue(String),
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
    }

    pub fn system_prompt(&self) -> Option<&str> {
        match self.system_prompt.as_deref() {
            Some(prompt) if prompt.trim().is_empty() => None,
            Some(prompt) => Some(prompt),
            None => Some(DEFAULT_SYSTEM_PROMPT),
        }
    }

    pub fn include_page_context(&self) -> bool {
        self.include_page_context.unwrap_or(true)
    }

    pub fn stream_responses(&self) -> bool {
        self.stream_responses.unwrap_or(true)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.base_url())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let value = value.trim();
        match key {
            "base-url" | "model" if value.is_empty() => {
                return Err(SettingError::MissingValue(key.to_string()))
            }
            "base-url" => self.base_url = Some(value.to_string()),
            "model" => self.selected_model = Some(value.to_string()),
            "system-prompt" => self.system_prompt = Some(value.to_string()),
            "page-context" => self.include_page_context = Some(parse_bool(key, value)?),
            "stream" => self.stream_responses = Some(parse_bool(key, value)?),
            _ => return Err(SettingError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), SettingError> {
        match key {
            "base-url" => self.base_url = None,
            "model" => self.selected_model = None,
            "system-prompt" => self.system_prompt = None,
            "page-context" => self.include_page_context = None,
            "stream" => self.stream_responses = None,
            _ => return Err(SettingError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
