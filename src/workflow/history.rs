// src/workflow/history.rs
// Bounded conversation transcript with provenance-tagged selection.

use serde::{Deserialize, Serialize};

/// Maximum retained transcript entries; the oldest entry is dropped first.
pub const HISTORY_CAP: usize = 20;

/// When continuing chapter work, only this many of the matching prior
/// entries are attached to the generation request.
pub const CHAPTER_CONTEXT_CAP: usize = 4;

/// What part of the workflow an entry belongs to. Selection matches on
/// these tags instead of substring containment, so picking "the turns about
/// the outline" or "the turns about chapter 3" is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// The user's initial requirements turn.
    Requirements,
    /// Outline generation, revision and approval turns.
    Outline,
    /// Drafting and feedback turns for one chapter, by 0-based index.
    Chapter(u32),
    /// Everything else (guard replies, completion chatter).
    Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub provenance: Provenance,
}

impl HistoryEntry {
    pub fn new(role: &str, content: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            provenance,
        }
    }
}

/// Append one entry, then truncate from the front to enforce the cap.
pub fn push(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.push(entry);
    if history.len() > HISTORY_CAP {
        let excess = history.len() - HISTORY_CAP;
        history.drain(..excess);
    }
}

/// Entries whose provenance is in `tags`, insertion order preserved.
/// With `cap`, only the last `cap` matches are kept.
pub fn select(history: &[HistoryEntry], tags: &[Provenance], cap: Option<usize>) -> Vec<HistoryEntry> {
    let mut selected: Vec<HistoryEntry> = history
        .iter()
        .filter(|e| tags.contains(&e.provenance))
        .cloned()
        .collect();
    if let Some(cap) = cap {
        if selected.len() > cap {
            selected.drain(..selected.len() - cap);
        }
    }
    selected
}
