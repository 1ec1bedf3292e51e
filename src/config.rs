//! # Configuration Management
//!
//! Settings are layered, highest priority first:
//! 1. Deployment variables `HOST`, `PORT` and `DEEPGRAM_API_KEY`
//! 2. Environment variables with the `APP_` prefix, nested keys joined by `__`
//!    (`APP_SERVER__PORT`, `APP_AUDIT__MAX_WORDS`, `APP_PROVIDER__MODEL`)
//! 3. `config.toml` in the working directory, if present
//! 4. The defaults below

use crate::wer::InputLimits;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Speech-to-text provider used by audio audits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Deepgram API key. Audio audits are unavailable without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub language: String,
    pub timeout_secs: u64,
}

/// Limits applied before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Ceiling on reference + hypothesis words (raw whitespace count).
    pub max_words: usize,
    /// Ceiling on alignment table cells, one byte each. The table is
    /// quadratic in input length, so this bounds per-request memory.
    pub max_alignment_cells: usize,
}

impl AuditConfig {
    pub fn limits(&self) -> InputLimits {
        InputLimits {
            max_words: self.max_words,
            max_cells: self.max_alignment_cells,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepgram.com".to_string(),
            model: "nova-3".to_string(),
            language: "en-US".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            provider: ProviderConfig::default(),
            audit: AuditConfig {
                max_words: 20_000,
                max_alignment_cells: 25_000_000,
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        // Deployment platforms set these without the APP_ prefix
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }
        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }
        if let Ok(key) = env::var("DEEPGRAM_API_KEY") {
            settings = settings.set_override("provider.api_key", key)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.audit.max_words == 0 {
            return Err(anyhow::anyhow!("Audit max_words must be greater than 0"));
        }

        if self.audit.max_alignment_cells == 0 {
            return Err(anyhow::anyhow!("Audit max_alignment_cells must be greater than 0"));
        }

        if self.provider.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Provider timeout must be greater than 0"));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Provider base_url cannot be empty"));
        }

        if self.provider.model.trim().is_empty() {
            return Err(anyhow::anyhow!("Provider model cannot be empty"));
        }

        Ok(())
    }

    /// Whether a provider key is present, without exposing it.
    pub fn provider_configured(&self) -> bool {
        self.provider
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Apply a partial runtime update, e.g. `{"audit": {"max_words": 5000}}`.
    ///
    /// Only settings that are read per request can change here. The server
    /// address and provider credentials are fixed at startup.
    pub fn update_from_json(&mut self, json_str: &str) -> Result<()> {
        let partial_config: serde_json::Value = serde_json::from_str(json_str)?;

        if let Some(audit) = partial_config.get("audit") {
            if let Some(max_words) = audit.get("max_words").and_then(|v| v.as_u64()) {
                self.audit.max_words = max_words as usize;
            }
            if let Some(cells) = audit.get("max_alignment_cells").and_then(|v| v.as_u64()) {
                self.audit.max_alignment_cells = cells as usize;
            }
        }

        if let Some(provider) = partial_config.get("provider") {
            if let Some(model) = provider.get("model").and_then(|v| v.as_str()) {
                self.provider.model = model.to_string();
            }
            if let Some(language) = provider.get("language").and_then(|v| v.as_str()) {
                self.provider.language = language.to_string();
            }
        }

        self.validate()?;
        Ok(())
    }
}
