//! Backend abstraction consumed by the chat flow
//!
//! The chat view and turn runner only need two things from the server: a
//! way to open the streamed reply for a message, and a way to fetch stored
//! history. [`crate::api::ApiClient`] implements this over HTTP.

use crate::api::types::ConversationDetail;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Raw response body of a chat request, as a stream of byte chunks
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Server operations needed by an open chat view
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send `message` to the session and return the streamed reply body
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the server answers
    /// with a non-success status.
    async fn open_chat_stream(&self, session_id: &str, message: &str) -> Result<ByteStream>;

    /// Fetch stored title and messages of a session
    async fn fetch_history(&self, session_id: &str) -> Result<ConversationDetail>;
}
