//! Error types for Saanra
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Two families exist:
//!
//! - [`SaanraError`]: infrastructure failures (storage, configuration,
//!   provider calls, image decoding)
//! - [`ChatWarning`]: user-facing rejections raised by the chat orchestrator
//!   before any side effect happens

use thiserror::Error;

/// Main error type for Saanra operations
#[derive(Error, Debug)]
pub enum SaanraError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vision provider errors (API calls, unusable responses)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Chat storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Image loading or decoding errors
    #[error("Image error: {0}")]
    Image(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Rejections surfaced to the user by chat actions
///
/// A warning always means the action was refused before touching the
/// store or the vision provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatWarning {
    /// Username or password left blank on sign-up
    #[error("Fill all fields")]
    EmptyFields,

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Sign-up with a username that already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Login failed; deliberately does not say which field was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Session management requires a logged-in account
    #[error("Please login to manage chat sessions")]
    NotLoggedIn,

    /// Session id unknown or owned by another account
    #[error("Session not found")]
    SessionNotFound,

    /// Session name blank after trimming
    #[error("Enter a valid name")]
    EmptySessionName,

    /// Guest context already used its free questions
    #[error("Free trial ended ({limit} messages). Please login to continue.")]
    QuotaExceeded {
        /// The configured guest quota
        limit: u32,
    },

    /// Ask without an attached image
    #[error("Upload an image first!")]
    NoImage,

    /// Ask with a blank question
    #[error("Enter a question!")]
    EmptyQuestion,
}

/// Result type alias for Saanra operations
///
/// Uses `anyhow::Error` so that both [`SaanraError`] and [`ChatWarning`]
/// can travel through `?` and be recovered with `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = SaanraError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = SaanraError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = SaanraError::MissingCredentials("gemini".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: gemini");
    }

    #[test]
    fn test_storage_error_display() {
        let error = SaanraError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SaanraError = io_error.into();
        assert!(matches!(error, SaanraError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: SaanraError = yaml_error.into();
        assert!(matches!(error, SaanraError::Yaml(_)));
    }

    #[test]
    fn test_quota_warning_mentions_limit() {
        let warning = ChatWarning::QuotaExceeded { limit: 2 };
        assert!(warning.to_string().contains("(2 messages)"));
    }

    #[test]
    fn test_warning_survives_anyhow_roundtrip() {
        let err: anyhow::Error = ChatWarning::NoImage.into();
        assert_eq!(err.downcast_ref::<ChatWarning>(), Some(&ChatWarning::NoImage));
        assert!(err.downcast_ref::<SaanraError>().is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SaanraError>();
        assert_send_sync::<ChatWarning>();
    }
}
