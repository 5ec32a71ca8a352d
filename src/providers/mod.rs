//! Provider module for Saanra
//!
//! This module contains the vision provider abstraction and implementations
//! for Google Gemini and Ollama.

pub mod base;
pub mod gemini;
pub mod ollama;

pub use base::VisionProvider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{Result, SaanraError};

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("gemini" or "ollama")
/// * `config` - Provider configuration
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
pub fn create_provider(
    provider_type: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn VisionProvider>> {
    match provider_type {
        "gemini" => Ok(Box::new(GeminiProvider::new(config.gemini.clone())?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        _ => Err(SaanraError::Provider(format!("Unknown provider type: {}", provider_type)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_create_ollama_provider() {
        let config = Config::default();
        let provider = create_provider("ollama", &config.provider).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_create_gemini_provider_requires_key() {
        let mut config = Config::default();
        config.provider.gemini.api_key = None;
        let err = create_provider("gemini", &config.provider).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SaanraError>(),
            Some(SaanraError::MissingCredentials(_))
        ));

        config.provider.gemini.api_key = Some("k".to_string());
        assert_eq!(create_provider("gemini", &config.provider).unwrap().name(), "gemini");
    }

    #[test]
    fn test_create_unknown_provider_fails() {
        let config = Config::default();
        assert!(create_provider("openai", &config.provider).is_err());
    }
}
