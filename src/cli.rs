//! Command-line interface definition for csvchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for uploading datasets, chatting, and managing
//! stored conversations.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// csvchat - chat with your CSV from the terminal
///
/// Upload a CSV file to the analysis backend, then ask questions about it.
/// Assistant replies and code output are streamed back as they arrive.
#[derive(Parser, Debug, Clone)]
#[command(name = "csvchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the API base URL (absolute, or a path resolved against the origin)
    #[arg(long, env = "CSVCHAT_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for csvchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Upload a CSV file and print its preview
    Upload {
        /// Path to the CSV file
        file: PathBuf,
    },

    /// Start an interactive chat session
    Chat {
        /// Resume an existing conversation by ID
        #[arg(short, long, conflicts_with = "file")]
        session: Option<String>,

        /// Upload this CSV first and chat about it
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage stored conversations
    Conversations {
        /// Conversation subcommand
        #[command(subcommand)]
        command: ConversationCommand,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List stored conversations
    List,

    /// Print the transcript of a conversation
    Show {
        /// Conversation ID
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
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
            api_url: None,
            verbose: false,
            command: Commands::Chat {
                session: None,
                file: None,
            },
        }
    }
}
