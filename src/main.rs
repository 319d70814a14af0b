//! csvchat - chat with your CSV from the terminal
//!
#![doc = "csvchat - chat with your CSV from the terminal"]
#![doc = "Main entry point for the csvchat client."]

use anyhow::Result;

use csvchat::cli::{Cli, Commands};
use csvchat::commands;
use csvchat::config::Config;
use csvchat::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Initialize tracing once the output format is known
    init_logging(cli.verbose, &config.logging)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!("Using API base {}", config.api.resolved_base()?);

    // Execute command
    match cli.command {
        Commands::Upload { file } => {
            tracing::info!("Uploading {}", file.display());
            commands::upload::run_upload(config, &file).await?;
            Ok(())
        }
        Commands::Chat { session, file } => {
            if let Some(id) = &session {
                tracing::debug!("Resuming conversation: {}", id);
            }
            if let Some(path) = &file {
                tracing::debug!("Uploading before chat: {}", path.display());
            }

            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(config, session, file).await?;
            Ok(())
        }
        Commands::Conversations { command } => {
            commands::conversations::handle_conversations(config, command).await?;
            Ok(())
        }
    }
}
