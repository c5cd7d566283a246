//! Application configuration.
//!
//! One struct, loaded from an optional JSON file with environment
//! overrides layered on top, then passed explicitly to the pieces that
//! need it. Nothing here lives in a process-wide mutable global; `main`
//! builds the clients from this and hands them down.

use std::path::Path;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::nlq::ChatClientConfig;
use crate::provider::TicketClientConfig;

/// Default listen address.
fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP surface binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Ticket provider client settings.
    #[serde(default)]
    pub provider: TicketClientConfig,

    /// Interpretation service settings; absent means every
    /// natural-language path runs on the deterministic fallback rules.
    #[serde(default)]
    pub interpreter: Option<ChatClientConfig>,

    /// Segment cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            provider: TicketClientConfig::default(),
            interpreter: None,
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `TICKET_CONFIG` (falling back to `config.json` when that
    /// file exists, else built-in defaults), then apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TICKET_CONFIG").unwrap_or_else(|_| "config.json".to_string());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(Path::new(&path))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific file, no environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Layer environment overrides onto the loaded values.
    ///
    /// `OPENAI_API_KEY` alone is enough to switch the interpreter on with
    /// default transport settings, matching how the provider keys were
    /// supplied before a config file existed.
    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = get("TICKET_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = get("TICKET_PROVIDER_URL") {
            self.provider.base_url = url;
        }

        if let Some(key) = get("OPENAI_API_KEY") {
            match self.interpreter.as_mut() {
                Some(interpreter) => interpreter.api_key = key,
                None => self.interpreter = Some(ChatClientConfig::with_api_key(key)),
            }
        }
        if let Some(interpreter) = self.interpreter.as_mut() {
            if let Some(base) = get("OPENAI_API_BASE") {
                interpreter.base_url = base;
            }
            if let Some(model) = get("OPENAI_MODEL") {
                interpreter.model = model;
            }
        }
    }
}
