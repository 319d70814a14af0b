//! Stream event interpretation
//!
//! Maps each [`StreamEvent`] onto a new snapshot of the in-progress
//! assistant message. Deltas are appended verbatim; status and error
//! narration is wrapped in markdown so consecutive blocks stay separated
//! when rendered.

use crate::chat::transcript::Message;
use crate::stream::StreamEvent;

const CODE_OUTPUT_MARKER: &str = "Code Output";
const CODE_OUTPUT_HEADER: &str = "Code Output:\n";
const CODE_ERROR_MARKER: &str = "Code Error";

/// Sub-classification of status/error narration
///
/// The backend signals code execution results only through a textual prefix
/// on the narration content. This is a brittle contract: only the two
/// markers below are recognised, and new kinds should arrive as new event
/// types rather than new prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narration<'a> {
    /// Output of executed code, with the `Code Output:\n` header removed
    CodeOutput(&'a str),
    /// Code execution failure, full content kept
    CodeError(&'a str),
    /// Anything else ("Running code...")
    Note(&'a str),
}

impl<'a> Narration<'a> {
    /// Classify narration content by its leading marker
    ///
    /// # Examples
    ///
    /// ```
    /// use csvchat::chat::Narration;
    ///
    /// assert_eq!(Narration::classify("Code Output:\n42"), Narration::CodeOutput("42"));
    /// assert_eq!(Narration::classify("Running code..."), Narration::Note("Running code..."));
    /// ```
    pub fn classify(content: &'a str) -> Self {
        if content.starts_with(CODE_OUTPUT_MARKER) {
            // Only the exact header is removed; other forms are fenced whole
            Self::CodeOutput(content.strip_prefix(CODE_OUTPUT_HEADER).unwrap_or(content))
        } else if content.starts_with(CODE_ERROR_MARKER) {
            Self::CodeError(content)
        } else {
            Self::Note(content)
        }
    }

    /// Markdown block appended to the assistant message
    pub fn render(&self) -> String {
        match self {
            Self::CodeOutput(output) => format!("\n**Output:**\n```\n{}\n```\n", output),
            Self::CodeError(error) => format!("\n🚨 **Error:**\n```\n{}\n```\n", error),
            Self::Note(note) => format!("\n*{}*\n", note),
        }
    }
}

/// Apply one event to the current assistant message
///
/// Returns a new snapshot; `current` is left untouched.
///
/// # Examples
///
/// ```
/// use csvchat::chat::{apply, Message};
/// use csvchat::stream::StreamEvent;
///
/// let msg = Message::assistant("The ");
/// let next = apply(&StreamEvent::Delta("sum is 5".into()), &msg);
/// assert_eq!(next.content, "The sum is 5");
/// ```
pub fn apply(event: &StreamEvent, current: &Message) -> Message {
    let mut content = String::with_capacity(current.content.len() + event.content().len() + 16);
    content.push_str(&current.content);

    match event {
        StreamEvent::Delta(text) => content.push_str(text),
        StreamEvent::Status(text) | StreamEvent::Error(text) => {
            content.push_str(&Narration::classify(text).render())
        }
    }

    Message {
        role: current.role,
        content,
    }
}
