//! Backend configuration
//!
//! Configuration is read once at startup, in priority order:
//! 1. Environment variables (LLM_RELAY_*)
//! 2. Config file (TOML)
//! 3. Legacy environment variables (OPENAI_API_KEY, OPENAI_API_BASE, OLLAMA_HOST)
//!
//! Sampling parameters are resolved per request with a separate precedence,
//! see [`ChatDefaults`].

use crate::{ChatInput, ChatParams, Error, Message, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Built-in fallback for `max_tokens`
pub const DEFAULT_MAX_TOKENS: u32 = 512;
/// Built-in fallback for `temperature`
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Built-in fallback for `top_p`
pub const DEFAULT_TOP_P: f64 = 1.0;

const ENV_PREFIX: &str = "LLM_RELAY";

/// Provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ProviderType {
    /// Self-hosted Ollama server
    Ollama,
    /// OpenAI-compatible API
    OpenAICompatible,
}

impl ProviderType {
    /// Get the config section key for this provider
    pub fn config_key(&self) -> &str {
        match self {
            ProviderType::Ollama => "ollama",
            ProviderType::OpenAICompatible => "openai_compatible",
        }
    }

    /// Environment variable infix for this provider's section
    fn env_key(&self) -> &str {
        match self {
            ProviderType::Ollama => "OLLAMA",
            ProviderType::OpenAICompatible => "OPENAI",
        }
    }
}

impl FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderType::Ollama),
            "openai_compatible" | "openai-compatible" | "openaicompatible" | "openai" => {
                Ok(ProviderType::OpenAICompatible)
            }
            _ => Err(Error::Config(format!(
                "Invalid provider type: {}. Must be 'ollama' or 'openai_compatible'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ProviderType {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Ollama => write!(f, "Ollama"),
            ProviderType::OpenAICompatible => write!(f, "OpenAICompatible"),
        }
    }
}

/// Connection settings for the selected backend
#[derive(Debug, Clone, Serialize)]
pub struct ProviderConfig {
    /// Provider type
    #[serde(rename = "type", serialize_with = "serialize_display")]
    pub provider_type: ProviderType,

    /// Backend base URL
    pub base_url: String,

    /// Bearer token (OpenAI-compatible only)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

fn serialize_display<S: serde::Serializer>(
    value: &ProviderType,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl ProviderConfig {
    /// Settings for an Ollama backend
    pub fn ollama(base_url: impl Into<String>) -> Self {
        ProviderConfig {
            provider_type: ProviderType::Ollama,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Settings for an OpenAI-compatible backend
    pub fn openai_compatible(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        ProviderConfig {
            provider_type: ProviderType::OpenAICompatible,
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API key, if set
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Global `[defaults]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationDefaults {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// Per-backend table (`[ollama]` or `[openai_compatible]`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// Gateway backend configuration
///
/// ```toml
/// provider = "ollama"            # or "openai_compatible"
/// model = "llama3.1"             # global fallback model
///
/// [defaults]
/// max_tokens = 512
/// temperature = 0.7
/// top_p = 1.0
///
/// [ollama]
/// base_url = "http://localhost:11434"
/// model = "llama3.1"
///
/// [openai_compatible]
/// base_url = "https://api.openai.com"
/// api_key = "sk-..."
/// model = "gpt-4o-mini"
/// ```
///
/// Environment variables (override config file):
/// - `LLM_RELAY_PROVIDER`, `LLM_RELAY_MODEL`
/// - `LLM_RELAY_DEFAULTS_MAX_TOKENS`, `LLM_RELAY_DEFAULTS_TEMPERATURE`, `LLM_RELAY_DEFAULTS_TOP_P`
/// - `LLM_RELAY_OLLAMA_BASE_URL`, `LLM_RELAY_OLLAMA_MODEL`
/// - `LLM_RELAY_OPENAI_BASE_URL`, `LLM_RELAY_OPENAI_API_KEY`, `LLM_RELAY_OPENAI_MODEL`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LlmConfig {
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
    #[serde(default)]
    pub defaults: GenerationDefaults,
    #[serde(default)]
    pub ollama: ProviderSection,
    #[serde(default)]
    pub openai_compatible: ProviderSection,
}

impl LlmConfig {
    /// Load configuration from an optional TOML file plus the process environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}_{}", ENV_PREFIX, suffix)).filter(|v| !v.trim().is_empty())
        };

        if let Some(provider) = var("PROVIDER") {
            self.provider = Some(provider.parse()?);
        }
        if let Some(model) = var("MODEL") {
            self.model = Some(model);
        }
        if let Some(v) = var("DEFAULTS_MAX_TOKENS") {
            self.defaults.max_tokens = Some(parse_env("DEFAULTS_MAX_TOKENS", &v)?);
        }
        if let Some(v) = var("DEFAULTS_TEMPERATURE") {
            self.defaults.temperature = Some(parse_env("DEFAULTS_TEMPERATURE", &v)?);
        }
        if let Some(v) = var("DEFAULTS_TOP_P") {
            self.defaults.top_p = Some(parse_env("DEFAULTS_TOP_P", &v)?);
        }

        for provider_type in [ProviderType::Ollama, ProviderType::OpenAICompatible] {
            let key = provider_type.env_key();
            let section = self.section_mut(provider_type);
            if let Some(base_url) = var(&format!("{}_BASE_URL", key)) {
                section.base_url = Some(base_url);
            }
            if let Some(model) = var(&format!("{}_MODEL", key)) {
                section.model = Some(model);
            }
            if provider_type == ProviderType::OpenAICompatible {
                if let Some(api_key) = var(&format!("{}_API_KEY", key)) {
                    section.api_key = Some(api_key);
                }
            }
        }

        // Legacy variables only fill gaps
        let legacy = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if self.openai_compatible.api_key.is_none() {
            self.openai_compatible.api_key = legacy("OPENAI_API_KEY");
        }
        if self.openai_compatible.base_url.is_none() {
            self.openai_compatible.base_url = legacy("OPENAI_API_BASE");
        }
        if self.ollama.base_url.is_none() {
            self.ollama.base_url = legacy("OLLAMA_HOST").map(|host| {
                if host.contains("://") {
                    host
                } else {
                    format!("http://{}", host)
                }
            });
        }

        Ok(())
    }

    /// The selected provider type
    pub fn provider_type(&self) -> Result<ProviderType> {
        self.provider
            .ok_or_else(|| Error::Config("provider not set (expected 'ollama' or 'openai_compatible')".to_string()))
    }

    /// Get the section for a provider
    pub fn section(&self, provider_type: ProviderType) -> &ProviderSection {
        match provider_type {
            ProviderType::Ollama => &self.ollama,
            ProviderType::OpenAICompatible => &self.openai_compatible,
        }
    }

    fn section_mut(&mut self, provider_type: ProviderType) -> &mut ProviderSection {
        match provider_type {
            ProviderType::Ollama => &mut self.ollama,
            ProviderType::OpenAICompatible => &mut self.openai_compatible,
        }
    }

    /// Connection settings for the selected backend
    ///
    /// Fails when no provider is selected or the selected section has no base URL.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let provider_type = self.provider_type()?;
        let section = self.section(provider_type);

        let base_url = section
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("{}.base_url not found in config or environment", provider_type.config_key()))
            })?;

        let api_key = match provider_type {
            ProviderType::Ollama => None,
            ProviderType::OpenAICompatible => {
                if section.api_key.is_none() {
                    tracing::warn!("{}.api_key not set, requests will be sent without authorization", provider_type.config_key());
                }
                section.api_key.clone()
            }
        };

        Ok(ProviderConfig {
            provider_type,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Collapse backend, global and built-in defaults for the selected backend
    pub fn chat_defaults(&self) -> Result<ChatDefaults> {
        let section = self.section(self.provider_type()?);

        Ok(ChatDefaults {
            model: section.model.clone().or_else(|| self.model.clone()),
            max_tokens: section
                .max_tokens
                .or(self.defaults.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: section
                .temperature
                .or(self.defaults.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            top_p: section.top_p.or(self.defaults.top_p).unwrap_or(DEFAULT_TOP_P),
        })
    }
}

fn parse_env<T: FromStr>(suffix: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::Config(format!("{}_{} has an invalid value: {}", ENV_PREFIX, suffix, value))
    })
}

/// Fallback request parameters, computed once at startup
///
/// Holds everything below the request itself in the precedence order:
/// backend section, then global config, then built-in values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDefaults {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        ChatDefaults {
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl ChatDefaults {
    /// Build a backend request, letting explicit request values win
    pub fn resolve(&self, params: ChatParams, messages: Vec<Message>) -> Result<ChatInput> {
        if messages.is_empty() {
            return Err(Error::InvalidRequest("messages must not be empty".to_string()));
        }

        Ok(ChatInput {
            model: params.model.or_else(|| self.model.clone()),
            messages,
            max_tokens: params.max_tokens.unwrap_or(self.max_tokens),
            temperature: params.temperature.unwrap_or(self.temperature),
            top_p: params.top_p.unwrap_or(self.top_p),
        })
    }
}
