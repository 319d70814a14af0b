//! csvchat - chat with your CSV from the terminal
//!
//! This library provides a client for a CSV analysis backend: upload a
//! dataset, ask questions about it, and render the assistant's streamed
//! replies, including the output or errors of code the backend runs.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: HTTP client and wire types for the backend
//! - `stream`: newline-delimited JSON decoding of the chat stream
//! - `chat`: transcript, event interpretation, turn state and session view
//! - `render`: terminal tables and incremental reply printing
//! - `commands`: handlers behind the CLI subcommands
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use csvchat::{ApiClient, ChatView, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = ApiClient::new(&config.api)?;
//!     let upload = client.upload("data.csv".as_ref()).await?;
//!
//!     let mut view = ChatView::new();
//!     view.open(upload.session_id.clone(), Some(upload.dataset()));
//!     view.send(
//!         &client,
//!         "What is the sum of column a?",
//!         &config.stream,
//!         &CancellationToken::new(),
//!         |snapshot| println!("{}", snapshot.content),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod stream;

// Re-export commonly used types
pub use api::ApiClient;
pub use chat::{ChatView, Message, Role, Transcript, TurnMachine, TurnOutcome, TurnState};
pub use config::Config;
pub use error::{CsvChatError, Result};
pub use stream::{parse_event, NdjsonDecoder, StreamEvent};

#[cfg(test)]
pub mod test_utils;
