// src/workflow/command.rs
// Turns a raw user message into a workflow signal, contextual to the
// current state.

use super::status::WorkflowStatus;

/// Single recognized affirmative token ending a review state.
pub const CONFIRM_TOKEN: &str = "c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// The confirmation token in a feedback-bearing state.
    Confirm,
    /// Anything else in a feedback-bearing state: revision feedback.
    Revise(String),
    /// Raw text in every other state (e.g. the initial requirements).
    Content(String),
}

/// Commands only exist in the two feedback-bearing states; everywhere else
/// the text is primary content. No side effects.
pub fn parse(status: WorkflowStatus, raw: &str) -> ParsedInput {
    match status {
        WorkflowStatus::AwaitingOutlineApproval | WorkflowStatus::AwaitingChapterFeedback => {
            if raw.trim().to_lowercase() == CONFIRM_TOKEN {
                ParsedInput::Confirm
            } else {
                ParsedInput::Revise(raw.to_string())
            }
        }
        _ => ParsedInput::Content(raw.to_string()),
    }
}
