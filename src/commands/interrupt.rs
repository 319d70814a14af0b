//! Ctrl-C routing for interactive chat
//!
//! Installing a `tokio::signal::ctrl_c` listener replaces the default SIGINT
//! behavior for the rest of the process, so interactive mode installs exactly
//! one listener and routes every Ctrl-C to whichever operation is running:
//! a streaming reply or a session command such as `/upload` or `/open`.
//! At the prompt rustyline reads Ctrl-C itself.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Routes interrupts to the running operation, if any
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    active: Arc<Mutex<Active>>,
}

#[derive(Debug, Default)]
struct Active {
    next_id: u64,
    running: Option<(u64, CancellationToken)>,
}

impl Interrupts {
    /// Create a router with no operation running
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the process-wide Ctrl-C listener
    ///
    /// Abort the returned handle when interactive mode ends.
    pub fn listen(&self) -> JoinHandle<()> {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupts.interrupt() {
                    tracing::debug!("Ctrl-C with no operation running");
                }
            }
        })
    }

    /// Register a new interruptible operation
    ///
    /// The operation stays registered until the returned guard is dropped.
    pub fn begin(&self) -> Operation<'_> {
        let token = CancellationToken::new();
        let mut active = self.lock();
        let id = active.next_id;
        active.next_id += 1;
        active.running = Some((id, token.clone()));
        Operation {
            interrupts: self,
            id,
            token,
        }
    }

    /// Cancel the running operation
    ///
    /// Returns false when nothing was running.
    pub fn interrupt(&self) -> bool {
        match &self.lock().running {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether an operation is registered
    pub fn is_active(&self) -> bool {
        self.lock().running.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Active> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard for one interruptible operation
#[derive(Debug)]
pub struct Operation<'a> {
    interrupts: &'a Interrupts,
    id: u64,
    token: CancellationToken,
}

impl Operation<'_> {
    /// Token cancelled by the next interrupt
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drive `future` unless interrupted first
    ///
    /// Returns `None` when interrupted; the future is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        let mut active = self.interrupts.lock();
        // A newer operation may have replaced this one
        if matches!(active.running, Some((id, _)) if id == self.id) {
            active.running = None;
        }
    }
}
