//! Command-line interface definition for Saanra
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// Saanra - ask questions about images
///
/// Log in, attach a picture and chat with a vision model. Conversations are
/// kept per account in a local SQLite database.
#[derive(Parser, Debug, Clone)]
#[command(name = "saanra")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the chat database location
    #[arg(long, env = "SAANRA_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Saanra
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create the database tables if they do not exist yet
    InitDb,

    /// Start the interactive chat
    Chat {
        /// Override the provider from config (gemini, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Chat { provider: None },
        }
    }
}
