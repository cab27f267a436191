use async_trait::async_trait;
use dialogue_flow::{DialogueState, Event, Reply, Result, SessionContext, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    format::format_doctors,
    gateway::{Backend, BackendExt},
    menus,
};

/// Takes the doctor or specialization the user typed and lists matching doctors
pub struct DoctorNameTask {
    backend: Arc<dyn Backend>,
}

impl DoctorNameTask {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Task for DoctorNameTask {
    fn state(&self) -> DialogueState {
        DialogueState::AwaitingDoctorName
    }

    async fn run(&self, event: &Event, _context: &mut SessionContext) -> Result<TaskResult> {
        let name = match event {
            Event::Text { text } => text.trim(),
            Event::Callback { .. } => {
                return Ok(TaskResult::wait(vec![Reply::text(menus::STALE_BUTTON)]));
            }
            _ => return Ok(TaskResult::wait(vec![])),
        };

        if name.is_empty() {
            return Ok(TaskResult::wait(vec![Reply::text(menus::INVALID_DOCTOR)]));
        }

        info!(name, "searching doctors");
        let mut replies = vec![Reply::text(menus::SEARCHING_DOCTORS)];

        match self.backend.search_doctors(name).await {
            Err(e) => {
                warn!(name, "doctor search failed: {}", e);
                replies.push(Reply::text(menus::DOCTOR_UNAVAILABLE));
            }
            Ok(doctors) if doctors.is_empty() => {
                replies.push(Reply::text(menus::DOCTORS_NOT_FOUND));
            }
            Ok(doctors) => {
                info!(count = doctors.len(), "doctors found");
                replies.push(Reply::text(format!(
                    "{}\n\n{}",
                    menus::DOCTORS_FOUND,
                    format_doctors(&doctors)
                )));
                replies.push(Reply::text(menus::CONFIRM_QUESTION).with_keyboard(menus::confirm_menu()));
            }
        }

        Ok(TaskResult::end(replies))
    }
}
