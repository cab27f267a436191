use async_trait::async_trait;
use dialogue_flow::{DialogueState, Event, Reply, Result, SessionContext, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    format::{ANALYSIS_MARKER, CERTIFICATE_MARKER, format_analyses},
    gateway::{Backend, BackendExt},
    menus::{self, is_certificate_category},
};

/// Handles a picked category, from whichever state the inline button was pressed in.
///
/// Certificate categories are answered immediately and end the flow without remembering the
/// category. Any other category is stored and the user is asked for a search term.
pub(crate) async fn select_category(
    backend: &dyn Backend,
    category: &str,
    context: &mut SessionContext,
) -> TaskResult {
    info!(category, "analysis category selected");

    if is_certificate_category(category) {
        context.clear_category();
        let reply = match backend.search_certificates(category).await {
            Ok(certificates) if !certificates.is_empty() => {
                Reply::text(format_analyses(&certificates, CERTIFICATE_MARKER))
            }
            Ok(_) => Reply::text(menus::ANALYSIS_NOT_FOUND),
            Err(e) => {
                warn!(category, "certificate lookup failed: {}", e);
                Reply::text(menus::ANALYSIS_NOT_FOUND)
            }
        };
        return TaskResult::end(vec![reply]);
    }

    context.select_category(category);
    TaskResult::goto(
        DialogueState::AwaitingAnalysisInput,
        vec![Reply::text(menus::category_chosen_message(category))],
    )
}

/// Waits for a category selection, then for a search term inside that category
pub struct AnalysisInputTask {
    backend: Arc<dyn Backend>,
}

impl AnalysisInputTask {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    async fn search(&self, term: &str, context: &mut SessionContext) -> TaskResult {
        let term = term.trim();
        let Some(category) = context.selected_category.clone() else {
            return TaskResult::wait(vec![Reply::text(menus::PICK_CATEGORY_FIRST)]);
        };
        if term.is_empty() {
            return TaskResult::wait(vec![Reply::text(menus::ASK_SEARCH_TERM)]);
        }

        info!(category = %category, term, "searching analyses");
        let reply = match self.backend.search_analyses(&category, term).await {
            Ok(analyses) if !analyses.is_empty() => {
                Reply::markdown(format_analyses(&analyses, ANALYSIS_MARKER))
            }
            Ok(_) => Reply::text(menus::ANALYSIS_NOT_FOUND),
            Err(e) => {
                warn!(category = %category, "analysis search failed: {}", e);
                Reply::text(menus::ANALYSIS_NOT_FOUND)
            }
        };
        TaskResult::end(vec![reply])
    }
}

#[async_trait]
impl Task for AnalysisInputTask {
    fn state(&self) -> DialogueState {
        DialogueState::AwaitingAnalysisInput
    }

    async fn run(&self, event: &Event, context: &mut SessionContext) -> Result<TaskResult> {
        let result = match event {
            Event::Callback { data } => select_category(self.backend.as_ref(), data, context).await,
            Event::Text { text } => self.search(text, context).await,
            Event::Command { .. } | Event::Voice { .. } => TaskResult::wait(vec![]),
        };
        Ok(result)
    }
}
