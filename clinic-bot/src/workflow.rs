use dialogue_flow::{Dialogue, DialogueBuilder, FlowRunner, SessionStorage};
use std::sync::Arc;

use crate::{
    gateway::Backend,
    menus::START_COMMAND,
    tasks::{AnalysisInputTask, DoctorNameTask, IdleTask, QuestionTask},
};

pub fn build_clinic_dialogue(backend: Arc<dyn Backend>) -> Dialogue {
    DialogueBuilder::new("clinic")
        .add_task(Arc::new(IdleTask::new(backend.clone())))
        .add_task(Arc::new(DoctorNameTask::new(backend.clone())))
        .add_task(Arc::new(AnalysisInputTask::new(backend.clone())))
        .add_task(Arc::new(QuestionTask::new(backend)))
        .reset_on_command(START_COMMAND)
        .build()
}

pub fn create_flow_runner(
    backend: Arc<dyn Backend>,
    session_storage: Arc<dyn SessionStorage>,
) -> FlowRunner {
    let dialogue = Arc::new(build_clinic_dialogue(backend));
    FlowRunner::new(dialogue, session_storage)
}
