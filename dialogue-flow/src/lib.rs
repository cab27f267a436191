pub mod context;
pub mod dialogue;
pub mod error;
pub mod event;
pub mod reply;
pub mod runner;
pub mod state;
pub mod storage;
pub mod task;

// Re-export commonly used types
pub use context::{KeyboardLayout, SessionContext};
pub use dialogue::{Dialogue, DialogueBuilder, ExecutionResult};
pub use error::{FlowError, Result};
pub use event::Event;
pub use reply::{InlineButton, Markup, Reply};
pub use runner::{FlowRunner, TurnGuard};
pub use state::DialogueState;
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use task::{NextAction, Task, TaskResult};
