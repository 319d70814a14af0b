//! Special commands parser for interactive chat mode
//!
//! Special commands manage the session instead of being sent to the
//! assistant:
//! - Start a new chat or upload a new dataset
//! - List, open, and delete stored conversations
//! - Show the dataset preview and help
//! - Exit the session
//!
//! Commands are prefixed with `/`; command names are case-insensitive,
//! arguments (ids, paths) are kept as typed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command takes no argument but one was given
    #[error("Command {command} takes no argument, got: {arg}")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Close the open session and return to the upload prompt
    NewChat,

    /// Upload a CSV file and open its session
    Upload(PathBuf),

    /// List stored conversations
    ListConversations,

    /// Open a stored conversation
    Open(String),

    /// Delete a stored conversation
    Delete(String),

    /// Show the dataset preview of the open session
    Preview,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send as a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and missing or unexpected
/// arguments.
///
/// # Examples
///
/// ```
/// use csvchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/open 3f2a").unwrap(),
///     SpecialCommand::Open("3f2a".to_string())
/// );
/// assert_eq!(
///     parse_special_command("what is the mean of a?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    let no_arg = |command: SpecialCommand| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnexpectedArgument {
                command: name.clone(),
                arg: arg.to_string(),
            })
        }
    };

    let required = |usage: &str| {
        if arg.is_empty() {
            Err(CommandError::MissingArgument {
                command: name.clone(),
                usage: usage.to_string(),
            })
        } else {
            Ok(arg.to_string())
        }
    };

    match name.as_str() {
        "/new" => no_arg(SpecialCommand::NewChat),
        "/list" | "/ls" => no_arg(SpecialCommand::ListConversations),
        "/preview" => no_arg(SpecialCommand::Preview),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => no_arg(SpecialCommand::Exit),
        "/open" => required("/open <conversation_id>").map(SpecialCommand::Open),
        "/delete" | "/rm" => required("/delete <conversation_id>").map(SpecialCommand::Delete),
        "/upload" => required("/upload <path/to/file.csv>")
            .map(|path| SpecialCommand::Upload(PathBuf::from(path))),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SESSIONS:
  /new               - Close this chat and start over with a new upload
  /upload <file.csv> - Upload a CSV file and chat about it
  /list              - List stored conversations (* marks the open one)
  /open <id>         - Resume a stored conversation
  /delete <id>       - Delete a stored conversation

DATA:
  /preview           - Show the preview of the uploaded dataset

OTHER:
  /help              - Show this help
  /exit, exit        - Leave the chat

Press Ctrl-C while a reply is streaming to stop it.
"#
    );
}
