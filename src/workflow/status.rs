// src/workflow/status.rs

use serde::{Deserialize, Serialize};

/// Workflow position of a session.
///
/// `GeneratingOutline` and `GeneratingChapter` are transient in-flight
/// markers: the engine enters them and completes the generation call within
/// a single turn, so they are never written to the store as committed
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    AwaitingInitialInput,
    GeneratingOutline,
    AwaitingOutlineApproval,
    GeneratingChapter,
    AwaitingChapterFeedback,
    Completed,
    /// Deserialization guard for status strings this build does not know.
    /// Never constructed by the engine; the transition table maps it to a
    /// full reset that preserves history.
    #[serde(other)]
    Unknown,
}

impl WorkflowStatus {
    /// Wire name used in turn responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::AwaitingInitialInput => "AwaitingInitialInput",
            WorkflowStatus::GeneratingOutline => "GeneratingOutline",
            WorkflowStatus::AwaitingOutlineApproval => "AwaitingOutlineApproval",
            WorkflowStatus::GeneratingChapter => "GeneratingChapter",
            WorkflowStatus::AwaitingChapterFeedback => "AwaitingChapterFeedback",
            WorkflowStatus::Completed => "Completed",
            WorkflowStatus::Unknown => "Unknown",
        }
    }
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        WorkflowStatus::AwaitingInitialInput
    }
}
