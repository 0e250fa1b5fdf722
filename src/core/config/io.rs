use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Overrides the platform config directory (used by tests and portable installs).
pub const CONFIG_DIR_ENV: &str = "OLLAMA_ASSISTANT_CONFIG_DIR";

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config at {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config at {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize or persist the configuration file.
    #[error("Failed to write config at {}: {message}", path_display(.path))]
    Write { path: PathBuf, message: String },

    /// No platform config directory and no override.
    #[error("Could not determine a config directory; set OLLAMA_ASSISTANT_CONFIG_DIR")]
    NoConfigDir,
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::get_config_path()?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::get_config_path()?)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        let write_error = |message: String| ConfigError::Write {
            path: config_path.to_path_buf(),
            message,
        };

        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| write_error(e.to_string()))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| write_error(e.to_string()))?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|e| write_error(e.to_string()))?;
        temp_file
            .persist(config_path)
            .map_err(|e| write_error(e.to_string()))?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }
        let proj_dirs = ProjectDirs::from("org", "ollama-assistant", "ollama-assistant")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Render the effective settings, marking values that fall back to defaults.
    pub fn describe(&self) -> String {
        fn source<T>(value: &Option<T>) -> &'static str {
            if value.is_some() {
                ""
            } else {
                " (default)"
            }
        }

        let mut out = String::new();
        out.push_str(&format!(
            "base-url: {}{}\n",
            self.base_url(),
            source(&self.base_url)
        ));
        out.push_str(&format!(
            "model: {}\n",
            self.selected_model().unwrap_or("(none)")
        ));
        out.push_str(&format!(
            "system-prompt: {}{}\n",
            self.system_prompt().unwrap_or("(disabled)"),
            source(&self.system_prompt)
        ));
        out.push_str(&format!(
            "page-context: {}{}\n",
            self.include_page_context(),
            source(&self.include_page_context)
        ));
        out.push_str(&format!(
            "stream: {}{}",
            self.stream_responses(),
            source(&self.stream_responses)
        ));
        out
    }
}
