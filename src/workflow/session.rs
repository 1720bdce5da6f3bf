// src/workflow/session.rs

use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::status::WorkflowStatus;

/// One confirmed chapter. Indices in `Session::confirmed_chapters` are
/// strictly increasing and unique; chapters are appended only when the user
/// confirms a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedChapter {
    pub index: usize,
    pub content: String,
}

/// Durable per-code workflow record, read-modified-written on every turn.
/// Owned exclusively by the engine between load and store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub initial_requirements: Option<String>,
    #[serde(default)]
    pub outline: Option<String>,
    /// Set exactly once when the user confirms an outline; immutable
    /// afterward until reset.
    #[serde(default)]
    pub approved_outline: Option<String>,
    /// `-1` before any chapter work begins, else the 0-based index of the
    /// chapter currently being drafted or reviewed.
    #[serde(default = "default_chapter_index")]
    pub current_chapter_index: i32,
    #[serde(default)]
    pub confirmed_chapters: Vec<ConfirmedChapter>,
    /// Most recent (possibly unconfirmed) chapter draft.
    #[serde(default)]
    pub last_chapter_content: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

fn default_chapter_index() -> i32 {
    -1
}

impl Default for Session {
    fn default() -> Self {
        Self {
            status: WorkflowStatus::AwaitingInitialInput,
            initial_requirements: None,
            outline: None,
            approved_outline: None,
            current_chapter_index: -1,
            confirmed_chapters: Vec::new(),
            last_chapter_content: None,
            conversation_history: Vec::new(),
        }
    }
}

impl Session {
    /// Clear all workflow progress but keep the transcript. Used when a
    /// persisted session carries a status this build does not recognize.
    pub fn reset_preserving_history(&mut self) {
        let history = std::mem::take(&mut self.conversation_history);
        *self = Session {
            conversation_history: history,
            ..Session::default()
        };
    }
}
