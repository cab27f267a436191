use dashmap::DashMap;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

use crate::{
    error::{FlowError, Result},
    event::Event,
    reply::Reply,
    state::DialogueState,
    storage::Session,
    task::{NextAction, Task},
};

/// A set of tasks, one per dialogue state.
pub struct Dialogue {
    pub id: String,
    tasks: DashMap<DialogueState, Arc<dyn Task>>,
    reset_commands: HashSet<String>,
}

impl Dialogue {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: DashMap::new(),
            reset_commands: HashSet::new(),
        }
    }

    /// Register a task for the state it declares. A later task for the same state replaces the earlier one.
    pub fn add_task(&self, task: Arc<dyn Task>) -> &Self {
        self.tasks.insert(task.state(), task);
        self
    }

    /// Commands that cancel any flow in progress and hand the event to the `Idle` task
    pub fn add_reset_command(&mut self, name: impl Into<String>) -> &mut Self {
        self.reset_commands.insert(name.into());
        self
    }

    pub fn get_task(&self, state: DialogueState) -> Option<Arc<dyn Task>> {
        self.tasks.get(&state).map(|entry| entry.clone())
    }

    /// States a session could reach but no task would handle
    pub fn unhandled_states(&self) -> Vec<DialogueState> {
        DialogueState::ALL
            .into_iter()
            .filter(|state| !self.tasks.contains_key(state))
            .collect()
    }

    fn resets_on(&self, event: &Event) -> bool {
        matches!(event, Event::Command { name } if self.reset_commands.contains(name))
    }

    /// Execute exactly one turn for the session.
    ///
    /// The task for the current state runs on a copy of the session context. The copy and the
    /// new state are committed together only when the task succeeds and the transition is legal,
    /// so a failed turn leaves the session as it was.
    pub async fn execute_session(
        &self,
        session: &mut Session,
        event: &Event,
    ) -> Result<ExecutionResult> {
        let from = if self.resets_on(event) {
            debug!(dialogue = %self.id, session_id = %session.id, "reset command, dialogue back to idle");
            DialogueState::Idle
        } else {
            session.state
        };

        let task = self.get_task(from).ok_or(FlowError::TaskNotFound(from))?;

        let mut context = session.context.clone();
        let result = task.run(event, &mut context).await?;

        let to = match result.next_action {
            NextAction::WaitForInput => from,
            NextAction::GoTo(state) => state,
            NextAction::End => DialogueState::Idle,
        };

        if !from.can_transition_to(to) {
            warn!(dialogue = %self.id, session_id = %session.id, %from, %to, "task requested an illegal transition");
            return Err(FlowError::IllegalTransition { from, to });
        }

        if self.tasks.contains_key(&to) {
            session.state = to;
            session.context = context;
            Ok(ExecutionResult {
                replies: result.replies,
                state: to,
            })
        } else {
            Err(FlowError::TaskNotFound(to))
        }
    }
}

/// Builder for creating dialogues
pub struct DialogueBuilder {
    dialogue: Dialogue,
}

impl DialogueBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            dialogue: Dialogue::new(id),
        }
    }

    pub fn add_task(self, task: Arc<dyn Task>) -> Self {
        self.dialogue.add_task(task);
        self
    }

    pub fn reset_on_command(mut self, name: impl Into<String>) -> Self {
        self.dialogue.add_reset_command(name);
        self
    }

    pub fn build(self) -> Dialogue {
        for state in self.dialogue.unhandled_states() {
            warn!(dialogue = %self.dialogue.id, %state, "no task registered for state");
        }
        self.dialogue
    }
}

/// Outcome of one executed turn
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub replies: Vec<Reply>,
    /// State the session is in after the turn
    pub state: DialogueState,
}
