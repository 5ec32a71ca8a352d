//! Saanra - image chat library
//!
//! This library provides the core functionality for Saanra, a chat assistant
//! that answers questions about an uploaded image and keeps per-account
//! conversations in a local SQLite database.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Accounts, chat sessions and messages in SQLite
//! - `chat`: Per-user context and the orchestrator behind every user action
//! - `providers`: Vision provider abstraction (Gemini, Ollama)
//! - `attachment`: Image validation and downscaling
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use saanra::{create_provider, ChatContext, ChatOrchestrator, Config, SqliteStorage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let storage = SqliteStorage::new()?;
//!     let provider = create_provider(&config.provider.provider_type, &config.provider)?;
//!     let orchestrator = ChatOrchestrator::new(storage, provider);
//!
//!     let mut ctx = ChatContext::new();
//!     orchestrator.login(&mut ctx, "alice", "pw")?;
//!     Ok(())
//! }
//! ```

pub mod attachment;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use attachment::AttachedImage;
pub use chat::{ChatContext, ChatOrchestrator, ConversationTurn};
pub use config::Config;
pub use error::{ChatWarning, Result, SaanraError};
pub use providers::{create_provider, VisionProvider};
pub use storage::SqliteStorage;

#[cfg(test)]
pub mod test_utils;
