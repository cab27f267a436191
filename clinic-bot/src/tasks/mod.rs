pub mod analysis;
pub mod doctor;
pub mod idle;
pub mod question;

#[cfg(test)]
pub(crate) mod mock;

// Re-export task implementations
pub use analysis::AnalysisInputTask;
pub use doctor::DoctorNameTask;
pub use idle::IdleTask;
pub use question::QuestionTask;
