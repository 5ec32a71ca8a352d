//! Saanra - image chat CLI
//!
//! Main entry point for the Saanra application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use saanra::cli::{Cli, Commands};
use saanra::commands;
use saanra::config::Config;
use saanra::storage::DB_PATH_ENV;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Mirror the storage override into the environment so that
    // `SqliteStorage::new()` picks it up.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var(DB_PATH_ENV, db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::InitDb => {
            tracing::info!("Initializing chat database");
            commands::init_db()?;
            Ok(())
        }
        Commands::Chat { provider } => {
            tracing::info!("Starting interactive chat");
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }

            commands::chat::run_chat(config, provider).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they do not interleave with the chat prompt.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "saanra=debug" } else { "saanra=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
