use async_trait::async_trait;
use dialogue_flow::{DialogueState, Event, Reply, Result, SessionContext, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    gateway::{Backend, BackendExt},
    menus,
};

/// Answers one free-form question from the FAQ backend
pub struct QuestionTask {
    backend: Arc<dyn Backend>,
}

impl QuestionTask {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Task for QuestionTask {
    fn state(&self) -> DialogueState {
        DialogueState::AwaitingQuestion
    }

    async fn run(&self, event: &Event, context: &mut SessionContext) -> Result<TaskResult> {
        let question = match event {
            Event::Text { text } => text.trim(),
            Event::Callback { .. } => {
                return Ok(TaskResult::wait(vec![Reply::text(menus::STALE_BUTTON)]));
            }
            _ => return Ok(TaskResult::wait(vec![])),
        };

        if question.is_empty() {
            return Ok(TaskResult::wait(vec![Reply::text(menus::INVALID_QUESTION)]));
        }

        let reply = match self.backend.ask_faq(question).await {
            Ok(answer) if answer == menus::FAQ_NOT_FOUND => {
                context.unrecognized_attempts += 1;
                info!(attempts = context.unrecognized_attempts, "no FAQ match");
                Reply::text(menus::QUESTION_NOT_FOUND)
            }
            Ok(answer) => Reply::markdown(answer),
            Err(e) => {
                warn!("FAQ lookup failed: {}", e);
                Reply::text(menus::FAQ_FAILED)
            }
        };

        Ok(TaskResult::end(vec![reply]))
    }
}
