use thiserror::Error;

use crate::state::DialogueState;

pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no task registered for state {0}")]
    TaskNotFound(DialogueState),

    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        from: DialogueState,
        to: DialogueState,
    },

    #[error("task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("session storage error: {0}")]
    StorageError(String),
}
