use super::confirm;
use crate::api::ApiClient;
use crate::chat::Message;
use crate::cli::ConversationCommand;
use crate::config::Config;
use crate::error::Result;
use crate::render;
use colored::Colorize;
use rustyline::DefaultEditor;

/// Handle conversation management commands
pub async fn handle_conversations(config: Config, command: ConversationCommand) -> Result<()> {
    let client = ApiClient::new(&config.api)?;

    match command {
        ConversationCommand::List => {
            let conversations = client.list_conversations().await?;

            if conversations.is_empty() {
                println!("{}", "No conversations found.".yellow());
                return Ok(());
            }

            println!("\nConversations:");
            render::conversations_table(&conversations, None).printstd();
            println!();
            println!(
                "Use {} to resume a conversation.",
                "csvchat chat --session <ID>".cyan()
            );
            println!();
        }
        ConversationCommand::Show { id } => {
            let detail = client.get_conversation(&id).await?;
            let messages: Vec<Message> = detail.transcript_messages();

            println!("\n{} {}\n", "Conversation:".bold(), detail.title.cyan());
            if messages.is_empty() {
                println!("{}", "No messages yet.".yellow());
            } else {
                render::print_transcript(&messages);
            }
        }
        ConversationCommand::Delete { id, yes } => {
            if !yes {
                let mut rl = DefaultEditor::new()?;
                if !confirm(&mut rl, &format!("Delete conversation {}?", id))? {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            client.delete_conversation(&id).await?;
            println!("{}", format!("Deleted conversation {}", id).green());
        }
    }

    Ok(())
}
