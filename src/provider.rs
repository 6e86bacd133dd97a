//! Backend selection

use super::{
    client::{Client, OllamaClient, OpenAICompatibleClient},
    config::{ProviderConfig, ProviderType},
    Result,
};

/// Create a backend client based on the provider configuration.
///
/// Called once at startup; returns a trait object so request handling never
/// branches on the provider type.
pub fn create_client(config: ProviderConfig) -> Result<Box<dyn Client>> {
    match config.provider_type {
        ProviderType::Ollama => Ok(Box::new(OllamaClient::new(config)?)),
        ProviderType::OpenAICompatible => Ok(Box::new(OpenAICompatibleClient::new(config)?)),
    }
}
