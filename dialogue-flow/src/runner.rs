//! FlowRunner – loads a session, executes exactly **one** dialogue turn, and persists the
//! updated session back to storage.
//!
//! Turns of the same session are serialized: a second event for a chat waits until the first
//! one has been handled and saved, so the handler always sees the state the previous turn left.
//! Different sessions run concurrently and never contend with each other.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{
    dialogue::{Dialogue, ExecutionResult},
    error::Result,
    event::Event,
    storage::{Session, SessionStorage},
};

/// High-level helper that orchestrates the _load → execute → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    dialogue: Arc<Dialogue>,
    storage: Arc<dyn SessionStorage>,
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FlowRunner {
    pub fn new(dialogue: Arc<Dialogue>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            dialogue,
            storage,
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    /// Handle one event for `session_id`, creating the session on first contact.
    pub async fn run(&self, session_id: &str, event: &Event) -> Result<ExecutionResult> {
        let _turn = self.lock(session_id).await;

        let mut session = match self.storage.get(session_id).await? {
            Some(session) => session,
            None => {
                debug!(session_id, "starting new session");
                Session::new(session_id)
            }
        };

        let result = self.dialogue.execute_session(&mut session, event).await?;

        self.storage.save(session).await?;

        Ok(result)
    }

    /// Current stored session, if the chat ever talked to us
    pub async fn session(&self, session_id: &str) -> Result<Option<Session>> {
        self.storage.get(session_id).await
    }

    /// Forget the session; the next event starts from `Idle` with an empty context.
    pub async fn reset(&self, session_id: &str) -> Result<()> {
        let _turn = self.lock(session_id).await;
        self.storage.delete(session_id).await
    }

    /// Wait for exclusive use of a session.
    ///
    /// [`FlowRunner::run`] takes the same guard, so work that happens outside the dialogue
    /// (voice clips, for example) stays ordered with the session's turns while the guard is held.
    pub async fn lock(&self, session_id: &str) -> TurnGuard {
        let lock = self
            .turn_locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        TurnGuard {
            guard: Some(lock.lock_owned().await),
            session_id: session_id.to_string(),
            turn_locks: self.turn_locks.clone(),
        }
    }
}

/// Exclusive hold on one session. The lock entry is dropped with the last guard.
#[must_use = "the session is only locked while the guard is alive"]
pub struct TurnGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: String,
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map itself still points at the mutex: nobody holds or waits for it.
        self.turn_locks
            .remove_if(&self.session_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
