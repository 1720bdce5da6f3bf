// src/workflow/engine.rs
// The state machine proper: one user turn in, one (possibly unchanged)
// session plus a reply out. At most one generation call per turn; the
// transient Generating* states are entered and left within that turn and
// are never persisted, so an upstream failure leaves the stored session in
// its pre-call state and the turn is retryable.

use tracing::{info, warn};

use crate::llm::{Generate, GenerationError};

use super::command::{self, ParsedInput};
use super::history::{self, HistoryEntry, Provenance};
use super::prompt;
use super::session::{ConfirmedChapter, Session};
use super::status::WorkflowStatus;

pub const OUTLINE_CONFIRM_HINT: &str =
    "\n\n如果满意这份大纲，请回复 C 确认；如需调整，请直接输入修改意见。";
pub const CHAPTER_CONFIRM_HINT: &str =
    "\n\n如果满意本章内容，请回复 C 确认并继续；如需调整，请直接输入修改意见。";
pub const OUTLINE_IN_PROGRESS: &str = "大纲正在生成中，请稍候。";
pub const CHAPTER_IN_PROGRESS: &str = "章节正在生成中，请稍候。";
pub const ALREADY_COMPLETED: &str = "本次创作已完成。如需开始新的创作，请先重置会话。";
pub const RESET_NOTICE: &str = "会话状态已重置。请告诉我您想创作什么样的文档。";

/// Fallback number of chapters when the outline yields too few lines.
const MIN_CHAPTERS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Explicit chapter target; when unset the line-count heuristic decides.
    pub target_chapters: Option<usize>,
}

/// Result of one processed turn. `session` is the post-turn state; the
/// caller persists it only when `changed` is true.
#[derive(Debug)]
pub struct TurnOutcome {
    pub session: Session,
    pub reply: String,
    /// Present only on the terminal transition into `Completed`.
    pub chapters: Option<Vec<ConfirmedChapter>>,
    pub changed: bool,
}

/// Chapter-count estimate for an approved outline: half its non-blank
/// lines, never below the minimum. An explicit target wins when configured.
pub fn estimate_chapters(outline: &str, target_override: Option<usize>) -> usize {
    if let Some(target) = target_override {
        if target > 0 {
            return target;
        }
    }
    let lines = outline.lines().filter(|l| !l.trim().is_empty()).count();
    (lines / 2).max(MIN_CHAPTERS)
}

fn record_turn(
    session: &mut Session,
    user_text: &str,
    user_tag: Provenance,
    reply: &str,
    reply_tag: Provenance,
) {
    history::push(
        &mut session.conversation_history,
        HistoryEntry::new("user", user_text, user_tag),
    );
    history::push(
        &mut session.conversation_history,
        HistoryEntry::new("assistant", reply, reply_tag),
    );
}

fn unchanged(session: Session, reply: &str) -> TurnOutcome {
    TurnOutcome {
        session,
        reply: reply.to_string(),
        chapters: None,
        changed: false,
    }
}

/// Process one user turn against a loaded session. On `Err` the caller must
/// discard `session`'s clone and keep the stored pre-call state.
pub async fn process_turn<G: Generate + ?Sized>(
    mut session: Session,
    raw: &str,
    generator: &G,
    opts: &EngineOptions,
) -> Result<TurnOutcome, GenerationError> {
    // Self-heal: a persisted status this build does not recognize resets
    // everything except the transcript.
    if session.status == WorkflowStatus::Unknown {
        warn!("unrecognized session status; resetting workflow, keeping history");
        session.reset_preserving_history();
        record_turn(&mut session, raw, Provenance::Chat, RESET_NOTICE, Provenance::Chat);
        return Ok(TurnOutcome {
            session,
            reply: RESET_NOTICE.to_string(),
            chapters: None,
            changed: true,
        });
    }

    match session.status {
        WorkflowStatus::AwaitingInitialInput => {
            let requirements = match command::parse(session.status, raw) {
                ParsedInput::Content(text) => text,
                // parse() only emits commands in the review states
                ParsedInput::Confirm | ParsedInput::Revise(_) => raw.to_string(),
            };
            session.initial_requirements = Some(requirements.clone());
            session.status = WorkflowStatus::GeneratingOutline;

            let plan = prompt::outline_generation(&requirements);
            let generated = generator.generate(plan.system, &plan.messages).await?;
            info!("outline generated ({} chars)", generated.len());

            session.outline = Some(generated.clone());
            session.status = WorkflowStatus::AwaitingOutlineApproval;
            let reply = format!("{}{}", generated, OUTLINE_CONFIRM_HINT);
            record_turn(&mut session, raw, Provenance::Requirements, &reply, Provenance::Outline);
            Ok(TurnOutcome { session, reply, chapters: None, changed: true })
        }

        // Re-entrant guards: a turn arriving while a call is notionally in
        // flight gets a holding reply and touches nothing.
        WorkflowStatus::GeneratingOutline => Ok(unchanged(session, OUTLINE_IN_PROGRESS)),
        WorkflowStatus::GeneratingChapter => Ok(unchanged(session, CHAPTER_IN_PROGRESS)),

        WorkflowStatus::AwaitingOutlineApproval => match command::parse(session.status, raw) {
            ParsedInput::Confirm => {
                // Only the first confirmation sets the approved outline.
                if session.approved_outline.is_none() {
                    session.approved_outline = session.outline.clone();
                }
                session.current_chapter_index = 0;
                session.status = WorkflowStatus::GeneratingChapter;

                let plan = prompt::chapter_generation(&session, 0);
                let generated = generator.generate(plan.system, &plan.messages).await?;
                info!("chapter 1 generated ({} chars)", generated.len());

                session.last_chapter_content = Some(generated.clone());
                session.status = WorkflowStatus::AwaitingChapterFeedback;
                let reply = format!("{}{}", generated, CHAPTER_CONFIRM_HINT);
                record_turn(&mut session, raw, Provenance::Outline, &reply, Provenance::Chapter(0));
                Ok(TurnOutcome { session, reply, chapters: None, changed: true })
            }
            ParsedInput::Revise(feedback) | ParsedInput::Content(feedback) => {
                session.status = WorkflowStatus::GeneratingOutline;

                let plan = prompt::outline_revision(&session, &feedback);
                let generated = generator.generate(plan.system, &plan.messages).await?;
                info!("outline regenerated ({} chars)", generated.len());

                session.outline = Some(generated.clone());
                session.status = WorkflowStatus::AwaitingOutlineApproval;
                let reply = format!("{}{}", generated, OUTLINE_CONFIRM_HINT);
                record_turn(&mut session, raw, Provenance::Outline, &reply, Provenance::Outline);
                Ok(TurnOutcome { session, reply, chapters: None, changed: true })
            }
        },

        WorkflowStatus::AwaitingChapterFeedback => match command::parse(session.status, raw) {
            ParsedInput::Confirm => {
                let index = session.current_chapter_index.max(0) as usize;
                let draft = session.last_chapter_content.clone().unwrap_or_default();
                // Indices stay strictly increasing: a double confirm for
                // the same index must not append twice.
                let already = session
                    .confirmed_chapters
                    .last()
                    .map_or(false, |c| c.index >= index);
                if !already {
                    session.confirmed_chapters.push(ConfirmedChapter { index, content: draft });
                }

                let outline = session.approved_outline.as_deref().unwrap_or_default();
                let estimate = estimate_chapters(outline, opts.target_chapters);

                if index + 1 < estimate {
                    let next = (index + 1) as i32;
                    session.current_chapter_index = next;
                    session.status = WorkflowStatus::GeneratingChapter;

                    let plan = prompt::chapter_generation(&session, next);
                    let generated = generator.generate(plan.system, &plan.messages).await?;
                    info!("chapter {} generated ({} chars)", next + 1, generated.len());

                    session.last_chapter_content = Some(generated.clone());
                    session.status = WorkflowStatus::AwaitingChapterFeedback;
                    let reply = format!("{}{}", generated, CHAPTER_CONFIRM_HINT);
                    record_turn(
                        &mut session,
                        raw,
                        Provenance::Chapter(index as u32),
                        &reply,
                        Provenance::Chapter(next as u32),
                    );
                    Ok(TurnOutcome { session, reply, chapters: None, changed: true })
                } else {
                    session.status = WorkflowStatus::Completed;
                    let total = session.confirmed_chapters.len();
                    info!("workflow completed with {} chapters", total);
                    let reply = format!("全部 {} 章已完成创作！", total);
                    record_turn(
                        &mut session,
                        raw,
                        Provenance::Chapter(index as u32),
                        &reply,
                        Provenance::Chat,
                    );
                    let chapters = Some(session.confirmed_chapters.clone());
                    Ok(TurnOutcome { session, reply, chapters, changed: true })
                }
            }
            ParsedInput::Revise(feedback) | ParsedInput::Content(feedback) => {
                let index = session.current_chapter_index.max(0) as u32;
                session.status = WorkflowStatus::GeneratingChapter;

                let plan = prompt::chapter_revision(&session, &feedback);
                let generated = generator.generate(plan.system, &plan.messages).await?;
                info!("chapter {} regenerated ({} chars)", index + 1, generated.len());

                session.last_chapter_content = Some(generated.clone());
                session.status = WorkflowStatus::AwaitingChapterFeedback;
                let reply = format!("{}{}", generated, CHAPTER_CONFIRM_HINT);
                record_turn(
                    &mut session,
                    raw,
                    Provenance::Chapter(index),
                    &reply,
                    Provenance::Chapter(index),
                );
                Ok(TurnOutcome { session, reply, chapters: None, changed: true })
            }
        },

        WorkflowStatus::Completed => Ok(unchanged(session, ALREADY_COMPLETED)),

        // Handled by the reset guard above.
        WorkflowStatus::Unknown => Ok(unchanged(session, RESET_NOTICE)),
    }
}
