// src/workflow/prompt.rs
// Selects the system instruction and assembles the message list for each
// generation call. The engine decides *whether* to call; this module
// decides *what* the call says.

use crate::llm::Message;

use super::history::{self, HistoryEntry, Provenance, CHAPTER_CONTEXT_CAP};
use super::session::Session;

pub const OUTLINE_SYSTEM: &str = "你是一位专业的写作助手。请根据用户提供的创作需求，生成一份结构清晰的文档大纲。\
大纲按章节逐行列出，每行包含章节标题和一句简要说明。只输出大纲本身。";

pub const OUTLINE_REVISION_SYSTEM: &str = "你是一位专业的写作助手。用户对当前大纲提出了修改意见。\
请在保留合理部分的前提下，按照意见重新生成完整的大纲。只输出修改后的大纲。";

pub const CHAPTER_SYSTEM: &str = "你是一位专业的写作助手。请根据已确认的大纲撰写指定章节的完整内容，\
与前文保持连贯，直接输出正文。";

pub const CHAPTER_REVISION_SYSTEM: &str = "你是一位专业的写作助手。用户对本章内容提出了修改意见。\
请按照意见重新撰写本章的完整内容，直接输出正文。";

/// System instruction plus the ordered message list for one generation call.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system: &'static str,
    pub messages: Vec<Message>,
}

fn to_messages(entries: Vec<HistoryEntry>) -> Vec<Message> {
    entries
        .into_iter()
        .map(|e| Message { role: e.role, content: e.content })
        .collect()
}

/// The user-visible request line for one chapter, 1-based on the wire.
pub fn chapter_request_line(index: i32) -> String {
    format!("请根据大纲撰写第 {} 章的内容。", index + 1)
}

/// First turn: a single user message embedding the raw requirements.
pub fn outline_generation(requirements: &str) -> PromptPlan {
    PromptPlan {
        system: OUTLINE_SYSTEM,
        messages: vec![Message::user(format!(
            "创作需求：{}\n\n请根据以上需求生成文档大纲。",
            requirements
        ))],
    }
}

/// Outline rework: prior requirements/outline turns plus one message
/// carrying the requirements, the outline being replaced, and the feedback.
pub fn outline_revision(session: &Session, feedback: &str) -> PromptPlan {
    let relevant = history::select(
        &session.conversation_history,
        &[Provenance::Requirements, Provenance::Outline],
        None,
    );
    let requirements = session.initial_requirements.as_deref().unwrap_or_default();
    let outline = session.outline.as_deref().unwrap_or_default();

    let mut messages = to_messages(relevant);
    messages.push(Message::user(format!(
        "创作需求：{}\n\n当前大纲：\n{}\n\n修改意见：{}\n\n请根据修改意见重新生成完整大纲。",
        requirements, outline, feedback
    )));
    PromptPlan { system: OUTLINE_REVISION_SYSTEM, messages }
}

/// Chapter draft for `index` (already advanced by the engine). The first
/// chapter continues from the requirements/outline turns; later chapters
/// continue from the outline plus the most recently confirmed chapter,
/// capped to the last few matching turns.
pub fn chapter_generation(session: &Session, index: i32) -> PromptPlan {
    let relevant = if index == 0 {
        history::select(
            &session.conversation_history,
            &[Provenance::Requirements, Provenance::Outline],
            None,
        )
    } else {
        history::select(
            &session.conversation_history,
            &[Provenance::Outline, Provenance::Chapter((index - 1) as u32)],
            Some(CHAPTER_CONTEXT_CAP),
        )
    };

    let mut messages = to_messages(relevant);
    messages.push(Message::user(chapter_request_line(index)));
    PromptPlan { system: CHAPTER_SYSTEM, messages }
}

/// Chapter rework: current chapter's turns plus one message carrying the
/// approved outline, the draft being replaced, and the feedback.
pub fn chapter_revision(session: &Session, feedback: &str) -> PromptPlan {
    let index = session.current_chapter_index.max(0) as u32;
    let relevant = history::select(
        &session.conversation_history,
        &[Provenance::Outline, Provenance::Chapter(index)],
        None,
    );
    let outline = session.approved_outline.as_deref().unwrap_or_default();
    let draft = session.last_chapter_content.as_deref().unwrap_or_default();

    let mut messages = to_messages(relevant);
    messages.push(Message::user(format!(
        "已确认的大纲：\n{}\n\n本章当前内容：\n{}\n\n修改意见：{}\n\n请根据修改意见重新撰写本章内容。",
        outline, draft, feedback
    )));
    PromptPlan { system: CHAPTER_REVISION_SYSTEM, messages }
}
