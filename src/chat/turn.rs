//! Chat turn state machine and stream read loop
//!
//! A turn is one user message and the assistant reply streamed back for it.
//!
//! ```text
//! Idle -> AwaitingResponse -> Streaming -> Idle     (success)
//! Idle -> AwaitingResponse -> Failed    -> Idle     (non-OK status, network fault)
//! AwaitingResponse | Streaming -> Idle              (cancelled)
//! ```
//!
//! Submissions outside `Idle` are ignored, never queued, so only one read
//! loop writes to a transcript at a time.

use crate::chat::backend::{ByteStream, ChatBackend};
use crate::chat::interpreter::apply;
use crate::chat::transcript::{Message, Transcript, TurnHandle};
use crate::config::StreamConfig;
use crate::error::{CsvChatError, Result};
use crate::stream::{parse_event, NdjsonDecoder};
use bytes::Bytes;
use futures::StreamExt;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Synthetic assistant message appended when a turn fails
pub const UNREACHABLE_MESSAGE: &str = "Error: Could not reach the server.";

/// Lifecycle state of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Ready for input
    #[default]
    Idle,
    /// User message sent, waiting for the response stream to open
    AwaitingResponse,
    /// Response stream open, assistant message being filled
    Streaming,
    /// Request failed; transient before returning to `Idle`
    Failed,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingResponse => write!(f, "awaiting_response"),
            Self::Streaming => write!(f, "streaming"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of offering input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input accepted and user message appended
    Accepted,
    /// Input blank or a turn already in progress; nothing changed
    Ignored,
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Submission was ignored
    Ignored,
    /// Stream ran to completion
    Completed,
    /// Request or stream failed; synthetic error message appended
    Failed,
    /// Cancelled by the caller; partial content kept
    Cancelled,
}

/// Turn state machine for one chat session
#[derive(Debug, Default)]
pub struct TurnMachine {
    state: TurnState,
}

impl TurnMachine {
    /// Create a machine in `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// True while a turn is awaiting or streaming its response
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            TurnState::AwaitingResponse | TurnState::Streaming
        )
    }

    fn transition(&mut self, next: TurnState) {
        tracing::debug!("Turn state {} -> {}", self.state, next);
        self.state = next;
    }

    /// Offer user input
    ///
    /// Accepted only in `Idle` with non-blank input: the user message is
    /// appended optimistically and the machine enters `AwaitingResponse`.
    pub fn try_submit(&mut self, transcript: &mut Transcript, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.state != TurnState::Idle {
            tracing::debug!("Ignoring submission while {}", self.state);
            return SubmitOutcome::Ignored;
        }

        transcript.append_user(input);
        self.transition(TurnState::AwaitingResponse);
        SubmitOutcome::Accepted
    }

    /// Response stream opened: append the empty assistant message
    pub fn stream_opened(&mut self, transcript: &mut Transcript) -> TurnHandle {
        self.transition(TurnState::Streaming);
        transcript.begin_assistant_turn()
    }

    /// Stream finished normally
    pub fn complete(&mut self) {
        self.transition(TurnState::Idle);
    }

    /// Turn failed: append the synthetic error message and return to `Idle`
    pub fn fail(&mut self, transcript: &mut Transcript) {
        self.transition(TurnState::Failed);
        transcript.append_assistant(UNREACHABLE_MESSAGE);
        self.transition(TurnState::Idle);
    }

    /// Turn cancelled by the caller
    pub fn cancel(&mut self) {
        self.transition(TurnState::Idle);
    }
}

/// Per-turn parameters that are not part of the session state
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    /// Session the message is sent to
    pub session_id: &'a str,
    /// Stream consumption settings
    pub stream: &'a StreamConfig,
    /// Cancelling this token aborts the turn at its next suspension point
    pub cancel: &'a CancellationToken,
}

/// Run one chat turn to completion
///
/// Submits `input`, opens the response stream, and folds every decoded
/// event into the in-progress assistant message. `on_update` is called with
/// each new snapshot of that message.
pub async fn run_turn<B, F>(
    machine: &mut TurnMachine,
    transcript: &mut Transcript,
    backend: &B,
    ctx: TurnContext<'_>,
    input: &str,
    mut on_update: F,
) -> TurnOutcome
where
    B: ChatBackend + ?Sized,
    F: FnMut(&Message),
{
    if machine.try_submit(transcript, input) == SubmitOutcome::Ignored {
        return TurnOutcome::Ignored;
    }

    let opened = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => {
            tracing::info!("Turn cancelled before the response stream opened");
            machine.cancel();
            return TurnOutcome::Cancelled;
        }
        opened = backend.open_chat_stream(ctx.session_id, input) => opened,
    };

    let mut body = match opened {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Chat request for session {} failed: {:#}", ctx.session_id, e);
            machine.fail(transcript);
            return TurnOutcome::Failed;
        }
    };

    let handle = machine.stream_opened(transcript);
    let mut current = Message::assistant(String::new());
    let mut decoder = NdjsonDecoder::new();
    let idle_timeout = ctx.stream.idle_timeout();

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                tracing::info!("Turn cancelled while streaming");
                machine.cancel();
                return TurnOutcome::Cancelled;
            }
            next = next_chunk(&mut body, idle_timeout) => next,
        };

        match next {
            Ok(Some(chunk)) => {
                for line in decoder.next_lines(&chunk) {
                    apply_line(&line, &mut current, transcript, handle, &mut on_update);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Chat stream for session {} broke: {:#}", ctx.session_id, e);
                machine.fail(transcript);
                return TurnOutcome::Failed;
            }
        }
    }

    if let Some(tail) = decoder.finish() {
        if ctx.stream.flush_trailing_record {
            tracing::debug!("Interpreting unterminated final stream record");
            apply_line(&tail, &mut current, transcript, handle, &mut on_update);
        } else {
            tracing::warn!("Discarding unterminated final stream record: {}", tail);
        }
    }

    machine.complete();
    TurnOutcome::Completed
}

fn apply_line<F: FnMut(&Message)>(
    line: &str,
    current: &mut Message,
    transcript: &mut Transcript,
    handle: TurnHandle,
    on_update: &mut F,
) {
    let Some(event) = parse_event(line) else {
        return;
    };

    *current = apply(&event, current);
    match transcript.update_assistant_turn(handle, current.content.clone()) {
        Ok(()) => on_update(current),
        Err(e) => tracing::warn!("Dropping stream update: {:#}", e),
    }
}

async fn next_chunk(body: &mut ByteStream, idle_timeout: Option<Duration>) -> Result<Option<Bytes>> {
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, body.next())
            .await
            .map_err(|_| {
                CsvChatError::Stream(format!("no data received for {}s", limit.as_secs()))
            })?,
        None => body.next().await,
    };
    next.transpose()
}
