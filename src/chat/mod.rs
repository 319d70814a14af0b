//! Chat flow: transcript, event interpretation, and turn handling
//!
//! - `transcript`: append-only message list with handle-based updates
//! - `interpreter`: stream events to assistant message snapshots
//! - `turn`: turn state machine and the stream read loop
//! - `view`: per-session state owned by the open chat
//! - `backend`: the server operations the chat flow depends on

pub mod backend;
pub mod interpreter;
pub mod transcript;
pub mod turn;
pub mod view;

pub use backend::{ByteStream, ChatBackend};
pub use interpreter::{apply, Narration};
pub use transcript::{Message, Role, Transcript, TurnHandle};
pub use turn::{
    run_turn, SubmitOutcome, TurnContext, TurnMachine, TurnOutcome, TurnState,
    UNREACHABLE_MESSAGE,
};
pub use view::{ChatView, SessionSlot};
