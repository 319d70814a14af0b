//! Test utilities for csvchat
//!
//! Provides a scripted in-memory [`ChatBackend`] for chat flow tests.

use crate::api::types::ConversationDetail;
use crate::chat::backend::{ByteStream, ChatBackend};
use crate::error::{CsvChatError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Mutex;

/// One step of a scripted response body
#[derive(Debug, Clone)]
enum Step {
    Chunk(Vec<u8>),
    Fail(String),
    Hang,
}

/// Scripted reply to a chat request
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    open_error: Option<String>,
    steps: Vec<Step>,
}

impl ScriptedReply {
    /// Reply body delivered as the given chunks, then end of stream
    pub fn chunks(chunks: &[&str]) -> Self {
        Self {
            open_error: None,
            steps: chunks
                .iter()
                .map(|c| Step::Chunk(c.as_bytes().to_vec()))
                .collect(),
        }
    }

    /// Request fails before any body is returned
    pub fn open_error(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            steps: Vec::new(),
        }
    }

    /// Break the stream with a transport error after the scripted chunks
    pub fn then_fail(mut self, message: &str) -> Self {
        self.steps.push(Step::Fail(message.to_string()));
        self
    }

    /// Never end the stream after the scripted chunks
    pub fn then_hang(mut self) -> Self {
        self.steps.push(Step::Hang);
        self
    }

    fn into_stream(self) -> ByteStream {
        let mut items: Vec<Result<Bytes>> = Vec::new();
        let mut hang = false;
        for step in self.steps {
            match step {
                Step::Chunk(bytes) => items.push(Ok(Bytes::from(bytes))),
                Step::Fail(message) => {
                    items.push(Err(CsvChatError::Stream(message).into()));
                    break;
                }
                Step::Hang => {
                    hang = true;
                    break;
                }
            }
        }

        let body = futures::stream::iter(items);
        if hang {
            body.chain(futures::stream::pending()).boxed()
        } else {
            body.boxed()
        }
    }
}

/// In-memory backend returning scripted replies and history
pub struct FakeBackend {
    reply: ScriptedReply,
    history: Option<ConversationDetail>,
    requests: Mutex<Vec<(String, String)>>,
    history_calls: Mutex<usize>,
}

impl FakeBackend {
    /// Backend answering every chat request with `reply`
    pub fn with_reply(reply: ScriptedReply) -> Self {
        Self {
            reply,
            history: None,
            requests: Mutex::new(Vec::new()),
            history_calls: Mutex::new(0),
        }
    }

    /// Serve `detail` from `fetch_history`; without it history fetches fail
    pub fn with_history(mut self, detail: ConversationDetail) -> Self {
        self.history = Some(detail);
        self
    }

    /// `(session_id, message)` of every chat request so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of history fetches so far
    pub fn history_calls(&self) -> usize {
        *self.history_calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn open_chat_stream(&self, session_id: &str, message: &str) -> Result<ByteStream> {
        self.requests
            .lock()
            .unwrap()
            .push((session_id.to_string(), message.to_string()));

        let reply = self.reply.clone();
        if let Some(err) = &reply.open_error {
            return Err(CsvChatError::Api {
                status: 503,
                message: err.clone(),
            }
            .into());
        }
        Ok(reply.into_stream())
    }

    async fn fetch_history(&self, _session_id: &str) -> Result<ConversationDetail> {
        *self.history_calls.lock().unwrap() += 1;
        self.history.clone().ok_or_else(|| {
            CsvChatError::Api {
                status: 500,
                message: "Failed to load history".to_string(),
            }
            .into()
        })
    }
}
