//! Configuration management for Saanra
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SaanraError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Saanra
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vision provider configuration (Gemini, Ollama)
    pub provider: ProviderConfig,
    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which vision provider answers questions and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for Gemini
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable for tests and proxies)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// API key; usually supplied through `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Vision-capable model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llava:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Questions an anonymous user may ask before logging in
    #[serde(default = "default_guest_quota")]
    pub guest_quota: u32,

    /// Longest side, in pixels, of an image sent to the provider
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,
}

fn default_guest_quota() -> u32 {
    2
}

fn default_max_image_dimension() -> u32 {
    600
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            guest_quota: default_guest_quota(),
            max_image_dimension: default_max_image_dimension(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment variables, and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            chat: ChatConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SaanraError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SaanraError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("SAANRA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(gemini_model) = std::env::var("SAANRA_GEMINI_MODEL") {
            self.provider.gemini.model = gemini_model;
        }

        if let Ok(api_key) = std::env::var("GOOGLE_API_KEY") {
            if !api_key.trim().is_empty() {
                self.provider.gemini.api_key = Some(api_key);
            }
        }

        if let Ok(ollama_host) = std::env::var("SAANRA_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("SAANRA_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(quota) = std::env::var("SAANRA_GUEST_QUOTA") {
            if let Ok(value) = quota.parse() {
                self.chat.guest_quota = value;
            } else {
                tracing::warn!("Invalid SAANRA_GUEST_QUOTA: {}", quota);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Chat {
            provider: Some(provider),
        } = &cli.command
        {
            self.provider.provider_type = provider.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `SaanraError::Config` if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(SaanraError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SaanraError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(
                SaanraError::Config("provider.gemini.model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.ollama.model.trim().is_empty() {
            return Err(
                SaanraError::Config("provider.ollama.model cannot be empty".to_string()).into(),
            );
        }

        if self.chat.max_image_dimension == 0 {
            return Err(SaanraError::Config(
                "chat.max_image_dimension must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn init_db_cli() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            storage_path: None,
            command: crate::cli::Commands::InitDb,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "gemini");
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.chat.guest_quota, 2);
        assert_eq!(config.chat.max_image_dimension, 600);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "openai".to_string();
        assert!(config.validate().is_err());

        config.provider.provider_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_image_dimension() {
        let mut config = Config::default();
        config.chat.max_image_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: ollama
  ollama:
    host: http://gpu-box:11434
    model: llava:13b

chat:
  guest_quota: 5
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.chat.guest_quota, 5);
        assert_eq!(config.chat.max_image_dimension, 600);
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = Config::default();
        config.provider.gemini.api_key = Some("secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let config = Config::load("nonexistent.yaml", &init_db_cli()).unwrap();
        assert_eq!(config.chat.guest_quota, 2);
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file_values() {
        std::env::set_var("SAANRA_PROVIDER", "ollama");
        std::env::set_var("SAANRA_GUEST_QUOTA", "7");
        std::env::set_var("GOOGLE_API_KEY", "key-from-env");

        let config = Config::load("nonexistent.yaml", &init_db_cli()).unwrap();

        std::env::remove_var("SAANRA_PROVIDER");
        std::env::remove_var("SAANRA_GUEST_QUOTA");
        std::env::remove_var("GOOGLE_API_KEY");

        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.chat.guest_quota, 7);
        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("key-from-env"));
    }

    #[test]
    #[serial]
    fn test_chat_provider_flag_overrides_config() {
        let cli = crate::cli::Cli {
            command: crate::cli::Commands::Chat {
                provider: Some("ollama".to_string()),
            },
            ..init_db_cli()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
    }
}
