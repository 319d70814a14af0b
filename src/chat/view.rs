//! Per-session chat view state
//!
//! A [`ChatView`] holds exactly one [`SessionSlot`]: the dataset, transcript
//! and turn state of the open session. Opening a different session id
//! replaces the slot, so no state (including "history already fetched")
//! leaks from one session into the next.

use crate::api::types::DatasetInfo;
use crate::chat::backend::ChatBackend;
use crate::chat::transcript::{Message, Transcript};
use crate::chat::turn::{run_turn, TurnContext, TurnMachine, TurnOutcome};
use crate::config::StreamConfig;
use crate::error::{CsvChatError, Result};
use tokio_util::sync::CancellationToken;

/// State of one open session
#[derive(Debug)]
pub struct SessionSlot {
    session_id: String,
    dataset: DatasetInfo,
    transcript: Transcript,
    turn: TurnMachine,
    hydrated: bool,
}

impl SessionSlot {
    fn new(session_id: String, dataset: Option<DatasetInfo>) -> Self {
        // A fresh upload has nothing stored yet; only resumed sessions fetch
        let hydrated = dataset.is_some();
        Self {
            session_id,
            dataset: dataset.unwrap_or_default(),
            transcript: Transcript::new(),
            turn: TurnMachine::new(),
            hydrated,
        }
    }

    /// Session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Dataset metadata
    pub fn dataset(&self) -> &DatasetInfo {
        &self.dataset
    }

    /// Transcript of the session
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Turn state machine of the session
    pub fn turn(&self) -> &TurnMachine {
        &self.turn
    }

    /// Whether stored history has been requested for this slot
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }
}

/// Chat view owning the state of the open session
#[derive(Debug, Default)]
pub struct ChatView {
    slot: Option<SessionSlot>,
}

impl ChatView {
    /// Create a view with no open session
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `session_id`
    ///
    /// Pass the dataset returned by an upload; pass `None` when resuming a
    /// stored conversation. Reopening the current session keeps its state.
    /// Returns true when the slot was replaced.
    pub fn open(&mut self, session_id: impl Into<String>, dataset: Option<DatasetInfo>) -> bool {
        let session_id = session_id.into();
        if self.session_id() == Some(session_id.as_str()) {
            if let (Some(slot), Some(dataset)) = (self.slot.as_mut(), dataset) {
                slot.dataset = dataset;
            }
            return false;
        }

        tracing::info!("Opening session {}", session_id);
        self.slot = Some(SessionSlot::new(session_id, dataset));
        true
    }

    /// Identifier of the open session
    pub fn session_id(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.session_id.as_str())
    }

    /// Open session state
    pub fn slot(&self) -> Option<&SessionSlot> {
        self.slot.as_ref()
    }

    /// Messages of the open session (empty when none is open)
    pub fn messages(&self) -> &[Message] {
        self.slot
            .as_ref()
            .map(|s| s.transcript.messages())
            .unwrap_or_default()
    }

    /// Load stored history into a resumed session
    ///
    /// Runs at most once per slot. A failed fetch leaves the transcript
    /// empty and is only logged. Returns true when history was loaded.
    pub async fn hydrate<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(slot) = self.slot.as_mut() else {
            return false;
        };
        if slot.hydrated {
            return false;
        }
        slot.hydrated = true;

        match backend.fetch_history(&slot.session_id).await {
            Ok(detail) => {
                let messages = detail.transcript_messages();
                tracing::debug!(
                    "Loaded {} history messages for {}",
                    messages.len(),
                    slot.session_id
                );
                slot.dataset = DatasetInfo {
                    filename: detail.title,
                    columns: Vec::new(),
                    preview: None,
                };
                slot.transcript.load_history(messages);
                true
            }
            Err(e) => {
                tracing::error!("Error loading history for {}: {:#}", slot.session_id, e);
                false
            }
        }
    }

    /// Close the open session ("new chat")
    pub fn new_chat(&mut self) {
        if let Some(slot) = self.slot.take() {
            tracing::info!("Closed session {}", slot.session_id);
        }
    }

    /// React to a conversation being deleted
    ///
    /// Deleting the open session behaves like "new chat". Returns true when
    /// the open session was closed.
    pub fn on_deleted(&mut self, id: &str) -> bool {
        if self.session_id() == Some(id) {
            self.new_chat();
            true
        } else {
            false
        }
    }

    /// Send a message in the open session and stream the reply
    ///
    /// # Errors
    ///
    /// Returns error if no session is open. Request and stream failures are
    /// not errors; they are reported through the returned outcome.
    pub async fn send<B, F>(
        &mut self,
        backend: &B,
        input: &str,
        stream: &StreamConfig,
        cancel: &CancellationToken,
        on_update: F,
    ) -> Result<TurnOutcome>
    where
        B: ChatBackend + ?Sized,
        F: FnMut(&Message),
    {
        let slot = self
            .slot
            .as_mut()
            .ok_or_else(|| CsvChatError::Validation("No session is open".to_string()))?;

        let ctx = TurnContext {
            session_id: &slot.session_id,
            stream,
            cancel,
        };

        Ok(run_turn(
            &mut slot.turn,
            &mut slot.transcript,
            backend,
            ctx,
            input,
            on_update,
        )
        .await)
    }
}
