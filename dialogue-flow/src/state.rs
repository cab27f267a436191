use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session currently is in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Main menu, no flow in progress
    #[default]
    Idle,
    /// Next text is a doctor or specialization query
    AwaitingDoctorName,
    /// Waiting for a category selection or a search term inside the selected category
    AwaitingAnalysisInput,
    /// Next text is a free-form question
    AwaitingQuestion,
}

impl DialogueState {
    pub const ALL: [DialogueState; 4] = [
        DialogueState::Idle,
        DialogueState::AwaitingDoctorName,
        DialogueState::AwaitingAnalysisInput,
        DialogueState::AwaitingQuestion,
    ];

    /// Transition table. Staying put and returning to `Idle` are always legal;
    /// the waiting states can only be entered from `Idle`.
    pub fn can_transition_to(self, next: DialogueState) -> bool {
        use DialogueState::*;

        match (self, next) {
            (_, Idle) => true,
            (Idle, _) => true,
            (AwaitingDoctorName, AwaitingDoctorName) => true,
            (AwaitingAnalysisInput, AwaitingAnalysisInput) => true,
            (AwaitingQuestion, AwaitingQuestion) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingDoctorName => "awaiting_doctor_name",
            DialogueState::AwaitingAnalysisInput => "awaiting_analysis_input",
            DialogueState::AwaitingQuestion => "awaiting_question",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
