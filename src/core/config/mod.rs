pub mod data;
pub mod io;


use std::sync::{Arc, RwLock, RwLockReadGuard};

pub use data::{Config, ServerConfig, SettingError, DEFAULT_BASE_URL, DEFAULT_SYSTEM_PROMPT};
pub use io::ConfigError;

/// Source of the settings consulted at the start of every operation.
///
/// Implementations must return the *current* values; callers never cache them
/// across requests so that a changed base URL applies to the next call.
pub trait SettingsProvider: Send + Sync {
    fn base_url(&self) -> String;

    fn selected_model(&self) -> Option<String> {
        None
    }

    fn system_prompt(&self) -> Option<String> {
        None
    }

    fn include_page_context(&self) -> bool {
        true
    }

    fn stream_responses(&self) -> bool {
        true
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.base_url())
    }
}

/// In-process settings shared between the host and the core.
#[derive(Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Config>>,
}

impl SharedSettings {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// A copy of the current settings.
    pub fn snapshot(&self) -> Config {
        self.read().clone()
    }

    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        mutate(&mut guard);
    }

    fn read(&self) -> RwLockReadGuard<'_, Config> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsProvider for SharedSettings {
    fn base_url(&self) -> String {
        self.read().base_url().to_string()
    }

    fn selected_model(&self) -> Option<String> {
        self.read().selected_model().map(str::to_owned)
    }

    fn system_prompt(&self) -> Option<String> {
        self.read().system_prompt().map(str::to_owned)
    }

    fn include_page_context(&self) -> bool {
        self.read().include_page_context()
    }

    fn stream_responses(&self) -> bool {
        self.read().stream_responses()
    }
}

impl SettingsProvider for ServerConfig {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}
