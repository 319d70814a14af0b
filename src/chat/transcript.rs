//! In-memory conversation transcript
//!
//! The transcript is the ordered message history of one session as held by
//! the client. It is append-only: messages are never reordered or merged,
//! and the only in-place change is replacing the in-progress assistant
//! message with a newer snapshot.

use crate::error::{CsvChatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user
    User,
    /// Produced by the assistant
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,
    /// Message text (formatted markdown for assistant messages)
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use csvchat::chat::{Message, Role};
    ///
    /// let msg = Message::user("sum column a");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Handle to an assistant message opened with
/// [`Transcript::begin_assistant_turn`]
///
/// The handle is the message's index plus the transcript generation it was
/// issued in, so a handle from before `load_history`/`clear` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnHandle {
    index: usize,
    generation: u64,
}

impl TurnHandle {
    /// Position of the message in the transcript
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Ordered, append-only list of messages for one session
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    generation: u64,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message
    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Append a complete assistant message (no handle issued)
    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// Append an empty assistant message and return a handle to it
    pub fn begin_assistant_turn(&mut self) -> TurnHandle {
        self.messages.push(Message::assistant(String::new()));
        TurnHandle {
            index: self.messages.len() - 1,
            generation: self.generation,
        }
    }

    /// Replace the content of the assistant message behind `handle`
    ///
    /// # Errors
    ///
    /// Returns `CsvChatError::Transcript` if the handle was issued before
    /// the transcript was reloaded or cleared, or does not point at an
    /// assistant message.
    pub fn update_assistant_turn(
        &mut self,
        handle: TurnHandle,
        content: impl Into<String>,
    ) -> Result<()> {
        if handle.generation != self.generation {
            return Err(CsvChatError::Transcript(
                "turn handle belongs to a previous transcript".to_string(),
            )
            .into());
        }

        match self.messages.get_mut(handle.index) {
            Some(slot) if slot.role == Role::Assistant => {
                *slot = Message::assistant(content);
                Ok(())
            }
            Some(_) => Err(CsvChatError::Transcript(format!(
                "message {} is not an assistant message",
                handle.index
            ))
            .into()),
            None => Err(CsvChatError::Transcript(format!(
                "no message at index {}",
                handle.index
            ))
            .into()),
        }
    }

    /// Message behind a handle, if still valid
    pub fn get(&self, handle: TurnHandle) -> Option<&Message> {
        if handle.generation != self.generation {
            return None;
        }
        self.messages.get(handle.index)
    }

    /// Replace the whole transcript with fetched history
    pub fn load_history(&mut self, messages: Vec<Message>) {
        self.generation += 1;
        self.messages = messages;
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.generation += 1;
        self.messages.clear();
    }

    /// All messages in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no messages are held
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
