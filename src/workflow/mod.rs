// src/workflow/mod.rs
// The turn-processing workflow engine and its collaborators.

pub mod command;
pub mod engine;
pub mod history;
pub mod prompt;
pub mod session;
pub mod status;

pub use engine::{process_turn, EngineOptions, TurnOutcome};
pub use session::{ConfirmedChapter, Session};
pub use status::WorkflowStatus;
