use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    context::SessionContext, error::Result, event::Event, reply::Reply, state::DialogueState,
};

/// Result of a task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Messages to send back, in order
    pub replies: Vec<Reply>,
    /// Next action to take
    pub next_action: NextAction,
}

impl TaskResult {
    pub fn new(replies: Vec<Reply>, next_action: NextAction) -> Self {
        Self {
            replies,
            next_action,
        }
    }

    /// Stay in the current state and wait for the next event
    pub fn wait(replies: Vec<Reply>) -> Self {
        Self::new(replies, NextAction::WaitForInput)
    }

    /// Move to another state
    pub fn goto(state: DialogueState, replies: Vec<Reply>) -> Self {
        Self::new(replies, NextAction::GoTo(state))
    }

    /// Finish the flow and fall back to `Idle`
    pub fn end(replies: Vec<Reply>) -> Self {
        Self::new(replies, NextAction::End)
    }
}

/// Defines what should happen after a task completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Remain in the current state
    WaitForInput,
    /// Move to a specific state
    GoTo(DialogueState),
    /// End the flow, back to `Idle`
    End,
}

/// Handler for every event a session receives while in one state.
#[async_trait]
pub trait Task: Send + Sync {
    /// The state this task is responsible for
    fn state(&self) -> DialogueState;

    /// Handle one event and decide where the dialogue goes next
    async fn run(&self, event: &Event, context: &mut SessionContext) -> Result<TaskResult>;
}
