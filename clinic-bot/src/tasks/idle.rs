use async_trait::async_trait;
use dialogue_flow::{DialogueState, Event, Reply, Result, SessionContext, Task, TaskResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analysis::select_category;
use crate::{
    format::format_info,
    gateway::{Backend, BackendExt},
    menus::{self, MenuCommand},
};

/// Main menu: routes button labels to flows and counts inputs it cannot place
pub struct IdleTask {
    backend: Arc<dyn Backend>,
}

impl IdleTask {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn show_main_menu(context: &mut SessionContext) -> Reply {
        context.remember_menu(menus::main_menu());
        menus::main_menu_reply()
    }

    async fn on_menu(&self, command: MenuCommand, context: &mut SessionContext) -> TaskResult {
        match command {
            MenuCommand::Doctors => {
                context.clear_category();
                TaskResult::goto(
                    DialogueState::AwaitingDoctorName,
                    vec![Reply::text(menus::ASK_DOCTOR)],
                )
            }
            MenuCommand::Question => {
                context.clear_category();
                TaskResult::goto(
                    DialogueState::AwaitingQuestion,
                    vec![Reply::text(menus::ASK_QUESTION)],
                )
            }
            MenuCommand::Analyses => self.offer_categories().await,
            MenuCommand::About => {
                let reply = match self.backend.clinic_info().await {
                    Ok(info) => Reply::markdown(format_info(&info)),
                    Err(e) => {
                        warn!("clinic info unavailable: {}", e);
                        Reply::text(menus::INFO_FAILED)
                    }
                };
                TaskResult::wait(vec![reply])
            }
            MenuCommand::Back => {
                let reply = match context.last_menu.clone() {
                    Some(layout) => Reply::text(menus::GOING_BACK).with_keyboard(layout),
                    None => Reply::text(menus::NO_PREVIOUS_MENU),
                };
                TaskResult::wait(vec![reply])
            }
            MenuCommand::Confirm => TaskResult::end(vec![
                Reply::text(menus::referral_message()),
                Self::show_main_menu(context),
            ]),
            MenuCommand::Certificate => TaskResult::wait(vec![]),
        }
    }

    async fn offer_categories(&self) -> TaskResult {
        match self.backend.analysis_categories().await {
            Ok(categories) if categories.is_empty() => {
                TaskResult::wait(vec![Reply::text(menus::CATEGORIES_EMPTY)])
            }
            Ok(categories) => TaskResult::goto(
                DialogueState::AwaitingAnalysisInput,
                vec![
                    Reply::text(menus::CHOOSE_CATEGORY)
                        .with_inline(menus::category_buttons(&categories)),
                ],
            ),
            Err(e) => {
                warn!("analysis categories unavailable: {}", e);
                TaskResult::wait(vec![Reply::text(menus::CATEGORIES_FAILED)])
            }
        }
    }

    fn on_unrecognized(text: &str, context: &mut SessionContext) -> TaskResult {
        if context.register_miss(menus::MISS_THRESHOLD) {
            info!("too many unrecognized inputs, pointing to call center");
            return TaskResult::wait(vec![Reply::text(menus::fallback_message())]);
        }
        debug!(text, attempts = context.unrecognized_attempts, "unrecognized input");
        TaskResult::wait(vec![])
    }
}

#[async_trait]
impl Task for IdleTask {
    fn state(&self) -> DialogueState {
        DialogueState::Idle
    }

    async fn run(&self, event: &Event, context: &mut SessionContext) -> Result<TaskResult> {
        let result = match event {
            Event::Command { name } if name == menus::START_COMMAND => {
                context.clear_category();
                TaskResult::end(vec![Self::show_main_menu(context)])
            }
            Event::Command { .. } | Event::Voice { .. } => TaskResult::wait(vec![]),
            Event::Callback { data } => select_category(self.backend.as_ref(), data, context).await,
            Event::Text { text } => match MenuCommand::parse(text) {
                Some(command) => self.on_menu(command, context).await,
                None => Self::on_unrecognized(text, context),
            },
        };
        Ok(result)
    }
}
