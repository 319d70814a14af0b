/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `upload`        - Upload a CSV file and print its preview
- `chat`          - Interactive chat mode
- `conversations` - List, show, and delete stored conversations

The handlers are thin: they build an [`ApiClient`] from configuration and
drive the library's chat view and renderers.
*/

use crate::api::ApiClient;
use crate::chat::{ChatView, TurnOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::render;
use colored::Colorize;
use rustyline::DefaultEditor;
use std::path::Path;

// Special commands parser for session management inside chat
pub mod special_commands;

// Stored conversation management
pub mod conversations;

// Ctrl-C routing for interactive mode
pub mod interrupt;

/// Print a failure to stderr in red
pub(crate) fn alert(error: &anyhow::Error) {
    eprintln!("{}", format!("{:#}", error).red());
}

/// Ask a yes/no question; anything but `y`/`yes` is a no
pub(crate) fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    let answer = rl.readline(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Upload `path` and open the new session in `view`
///
/// Failures are reported to the user and leave `view` untouched.
pub(crate) async fn open_upload(client: &ApiClient, view: &mut ChatView, path: &Path) -> bool {
    match client.upload(path).await {
        Ok(upload) => {
            let dataset = upload.dataset();
            view.open(upload.session_id, Some(dataset.clone()));
            render::print_dataset(&dataset);
            true
        }
        Err(e) => {
            tracing::error!("Upload failed: {:#}", e);
            alert(&e);
            false
        }
    }
}

/// Open a stored conversation in `view` and print its history
pub(crate) async fn open_stored(client: &ApiClient, view: &mut ChatView, id: &str) {
    view.open(id, None);
    view.hydrate(client).await;

    if let Some(slot) = view.slot() {
        render::print_dataset(slot.dataset());
        render::print_transcript(slot.transcript().messages());
    }
}

// Upload command handler
pub mod upload {
    //! One-shot upload: send the file, print the preview and the session id.

    use super::*;

    /// Upload a CSV file and print its preview
    ///
    /// # Errors
    ///
    /// Returns error if the path is not a `.csv` file or the backend
    /// rejects the upload
    pub async fn run_upload(config: Config, file: &Path) -> Result<()> {
        let client = ApiClient::new(&config.api)?;
        let upload = client.upload(file).await?;

        render::print_dataset(&upload.dataset());
        println!(
            "Session {} created. Use {} to chat about it.",
            upload.session_id.cyan(),
            format!("csvchat chat --session {}", upload.session_id).cyan()
        );
        Ok(())
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop. Plain input is sent to the open session and the
    //! reply is printed as it streams; `/` commands manage sessions.

    use super::interrupt::Interrupts;
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::config::StreamConfig;
    use crate::render::StreamPrinter;
    use rustyline::error::ReadlineError;
    use std::future::Future;

    enum Flow {
        Continue,
        Exit,
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session` - Stored conversation to resume
    /// * `file` - CSV file to upload before chatting
    pub async fn run_chat(
        config: Config,
        session: Option<String>,
        file: Option<std::path::PathBuf>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let client = ApiClient::new(&config.api)?;
        let mut view = ChatView::new();
        let mut rl = DefaultEditor::new()?;
        let interrupts = Interrupts::new();
        let listener = interrupts.listen();

        print_welcome_banner(client.base_url());

        if let Some(path) = &file {
            interruptible(&interrupts, open_upload(&client, &mut view, path)).await;
        } else if let Some(id) = &session {
            interruptible(&interrupts, open_stored(&client, &mut view, id)).await;
        }

        let result = chat_loop(&config, &client, &mut view, &mut rl, &interrupts).await;
        listener.abort();

        println!("Goodbye!");
        result
    }

    async fn chat_loop(
        config: &Config,
        client: &ApiClient,
        view: &mut ChatView,
        rl: &mut DefaultEditor,
        interrupts: &Interrupts,
    ) -> Result<()> {
        loop {
            let prompt = match view.slot() {
                Some(slot) => format!("[{}] >> ", slot.dataset().filename),
                None => "upload> ".to_string(),
            };

            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(command) => {
                            match handle_command(command, client, view, rl, interrupts).await? {
                                Flow::Continue => continue,
                                Flow::Exit => break,
                            }
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    if view.session_id().is_none() {
                        println!(
                            "No dataset is open. Use {} or {}.",
                            "/upload <file.csv>".cyan(),
                            "/open <id>".cyan()
                        );
                        continue;
                    }

                    send_message(client, view, &config.stream, interrupts, &line).await?;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted. Type 'exit' to quit.");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run a session command, returning to the prompt on Ctrl-C
    async fn interruptible<F: Future>(interrupts: &Interrupts, future: F) -> Option<F::Output> {
        let output = interrupts.begin().run(future).await;
        if output.is_none() {
            println!("{}\n", "(interrupted)".dimmed());
        }
        output
    }

    async fn send_message(
        client: &ApiClient,
        view: &mut ChatView,
        stream: &StreamConfig,
        interrupts: &Interrupts,
        line: &str,
    ) -> Result<()> {
        let mut printer = StreamPrinter::new();
        let outcome = {
            let operation = interrupts.begin();
            view.send(client, line, stream, operation.token(), |snapshot| {
                printer.update(snapshot)
            })
            .await
        };
        printer.finish();

        match outcome? {
            TurnOutcome::Failed => {
                if let Some(last) = view.messages().last() {
                    render::print_message(last);
                }
            }
            TurnOutcome::Cancelled => println!("{}\n", "(stopped)".dimmed()),
            TurnOutcome::Completed | TurnOutcome::Ignored => {}
        }
        Ok(())
    }

    async fn handle_command(
        command: SpecialCommand,
        client: &ApiClient,
        view: &mut ChatView,
        rl: &mut DefaultEditor,
        interrupts: &Interrupts,
    ) -> Result<Flow> {
        match command {
            SpecialCommand::NewChat => {
                view.new_chat();
                println!("Started a new chat. Use {} to begin.\n", "/upload <file.csv>".cyan());
            }
            SpecialCommand::Upload(path) => {
                interruptible(interrupts, open_upload(client, view, &path)).await;
            }
            SpecialCommand::ListConversations => {
                interruptible(interrupts, print_conversations(client, view.session_id())).await;
            }
            SpecialCommand::Open(id) => {
                interruptible(interrupts, open_stored(client, view, &id)).await;
            }
            SpecialCommand::Delete(id) => {
                if !confirm(rl, "Delete this chat?")? {
                    return Ok(Flow::Continue);
                }
                match interruptible(interrupts, client.delete_conversation(&id)).await {
                    Some(Ok(())) => {
                        println!("{}", format!("Deleted conversation {}", id).green());
                        if view.on_deleted(&id) {
                            println!("The open chat was deleted; starting a new chat.\n");
                        }
                        interruptible(interrupts, print_conversations(client, view.session_id()))
                            .await;
                    }
                    Some(Err(e)) => {
                        tracing::error!("Failed to delete {}: {:#}", id, e);
                        alert(&e);
                    }
                    None => {}
                }
            }
            SpecialCommand::Preview => match view.slot() {
                Some(slot) if slot.dataset().preview.is_some() => {
                    render::print_dataset(slot.dataset())
                }
                Some(_) => println!("No preview is available for a resumed conversation.\n"),
                None => println!("No dataset is open.\n"),
            },
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return Ok(Flow::Exit),
            SpecialCommand::None => {}
        }
        Ok(Flow::Continue)
    }

    async fn print_conversations(client: &ApiClient, current: Option<&str>) {
        match client.list_conversations().await {
            Ok(conversations) if conversations.is_empty() => {
                println!("{}", "No conversations found.".yellow());
            }
            Ok(conversations) => {
                println!("\nRecent:");
                render::conversations_table(&conversations, current).printstd();
                println!();
            }
            Err(e) => {
                tracing::error!("Failed to load conversations: {:#}", e);
                alert(&e);
            }
        }
    }

    fn print_welcome_banner(api_base: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 Chat with your CSV - Welcome!                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Backend: {}", api_base.cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}
