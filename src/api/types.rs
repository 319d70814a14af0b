//! Wire types of the analysis backend API

use crate::chat::transcript::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One preview row: column name to cell value
pub type PreviewRow = serde_json::Map<String, Value>;

/// Response of `POST /upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Identifier of the created session
    pub session_id: String,
    /// Name of the uploaded file
    pub filename: String,
    /// Column names in file order
    #[serde(default)]
    pub columns: Vec<String>,
    /// First rows of the dataset
    #[serde(default)]
    pub preview: Vec<PreviewRow>,
}

impl UploadResponse {
    /// Dataset metadata for the chat view
    pub fn dataset(&self) -> DatasetInfo {
        DatasetInfo {
            filename: self.filename.clone(),
            columns: self.columns.clone(),
            preview: Some(self.preview.clone()),
        }
    }
}

/// Dataset metadata shown alongside a chat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetInfo {
    /// File name, or the conversation title when resumed
    pub filename: String,
    /// Column names in file order (empty when resumed)
    pub columns: Vec<String>,
    /// Preview rows, only available right after an upload
    pub preview: Option<Vec<PreviewRow>>,
}

/// Item of `GET /conversations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation (session) identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
}

/// Response of `GET /conversations/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDetail {
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Stored messages in order
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// Stored message as returned by the backend
///
/// The backend also persists tool messages, so the role is kept as a plain
/// string here and narrowed in [`ConversationDetail::transcript_messages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Stored role name
    pub role: String,
    /// Stored content
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConversationDetail {
    /// User and assistant messages, in order; other roles are skipped
    pub fn transcript_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter_map(|m| {
                let role = match m.role.as_str() {
                    "user" => Role::User,
                    "assistant" => Role::Assistant,
                    other => {
                        tracing::debug!("Skipping history message with role '{}'", other);
                        return None;
                    }
                };
                Some(Message {
                    role,
                    content: m.content.clone(),
                })
            })
            .collect()
    }
}

/// Request body of `POST /chat/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// User message text
    pub message: &'a str,
}

/// Error body returned by the backend (`{"detail": ...}`)
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<Value>,
}

/// Render a cell value for display
///
/// Strings are shown without quotes, `null` as an empty cell, everything
/// else in its JSON form.
///
/// # Examples
///
/// ```
/// use csvchat::api::types::display_value;
/// use serde_json::json;
///
/// assert_eq!(display_value(&json!("north")), "north");
/// assert_eq!(display_value(&json!(2.5)), "2.5");
/// assert_eq!(display_value(&json!(null)), "");
/// ```
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
