// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::workflow::{ConfirmedChapter, Session};

/// One inbound user turn.
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub message: String,
    pub code: String,
}

/// Workflow position echoed back with every reply.
#[derive(Debug, Serialize)]
pub struct SessionStateView {
    pub status: String,
    /// Absent until chapter work has begun.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_chapter_index: Option<i32>,
}

impl SessionStateView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            status: session.status.as_str().to_string(),
            current_chapter_index: if session.current_chapter_index >= 0 {
                Some(session.current_chapter_index)
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterView {
    pub index: usize,
    pub content: String,
}

impl From<ConfirmedChapter> for ChapterView {
    fn from(chapter: ConfirmedChapter) -> Self {
        Self { index: chapter.index, content: chapter.content }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub reply: String,
    pub state: SessionStateView,
    /// Present only on the terminal `Completed` transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterView>>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
}
