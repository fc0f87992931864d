use std::collections::HashSet;

use chrono::Utc;

use crate::id::new_id;
use crate::models::{EntryKind, ReplyMeta, ReplySource, TranscriptEntry};

/// The running list of chat entries shown in a panel.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) -> String {
        self.push_entry(kind, text.into(), None, None)
    }

    pub fn push_reply(
        &mut self,
        text: impl Into<String>,
        source: ReplySource,
        meta: Option<ReplyMeta>,
    ) -> String {
        self.push_entry(EntryKind::Assistant, text.into(), Some(source), meta)
    }

    fn push_entry(
        &mut self,
        kind: EntryKind,
        text: String,
        source: Option<ReplySource>,
        meta: Option<ReplyMeta>,
    ) -> String {
        let entry = TranscriptEntry {
            id: new_id("msg"),
            kind,
            text,
            source,
            meta,
            created_at: Utc::now(),
        };
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    /// Record the user's message followed by a thinking placeholder that
    /// stays visible until the reply is finished.
    pub fn begin(&mut self, message: &str, thinking: &str) -> PendingReply {
        self.push(EntryKind::User, message);
        let placeholder = self.push(EntryKind::Thinking, thinking);
        PendingReply {
            message: message.to_string(),
            placeholder,
        }
    }

    /// Drop an entry, typically the thinking placeholder.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The last `n` entries in order, or all of them if there are fewer.
    pub fn last(&self, n: usize) -> Vec<TranscriptEntry> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A message that is waiting for its reply.
#[derive(Debug)]
#[must_use = "finish the reply or the thinking placeholder stays in the transcript"]
pub struct PendingReply {
    message: String,
    placeholder: String,
}

impl PendingReply {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Id of the thinking entry shown while the reply is pending.
    pub fn placeholder_id(&self) -> &str {
        &self.placeholder
    }
}

/// Tracks which entries a renderer has already shown, so entries that land
/// later (deferred notices) can be picked up on the next poll.
#[derive(Debug, Default)]
pub struct Cursor {
    shown: HashSet<String>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries not returned before, in transcript order.
    pub fn unseen(&mut self, entries: &[TranscriptEntry]) -> Vec<TranscriptEntry> {
        entries
            .iter()
            .filter(|e| self.shown.insert(e.id.clone()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_returns_tail_in_order() {
        let mut transcript = Transcript::new();
        for i in 0..7 {
            transcript.push(EntryKind::User, format!("m{}", i));
        }

        let tail: Vec<String> = transcript.last(5).into_iter().map(|e| e.text).collect();
        assert_eq!(tail, vec!["m2", "m3", "m4", "m5", "m6"]);
        assert_eq!(transcript.last(50).len(), 7);
    }

    #[test]
    fn remove_placeholder() {
        let mut transcript = Transcript::new();
        transcript.push(EntryKind::User, "hi");
        let placeholder = transcript.push(EntryKind::Thinking, "Thinking…");

        assert!(transcript.remove(&placeholder));
        assert!(!transcript.remove(&placeholder));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn begin_leaves_placeholder_up() {
        let mut transcript = Transcript::new();
        let pending = transcript.begin("hello", "Thinking…");

        assert_eq!(pending.message(), "hello");
        let last = transcript.entries().last().unwrap();
        assert_eq!(last.id, pending.placeholder_id());
        assert_eq!(last.kind, EntryKind::Thinking);
    }

    #[test]
    fn cursor_returns_each_entry_once() {
        let mut transcript = Transcript::new();
        let mut cursor = Cursor::new();
        transcript.push(EntryKind::User, "a");

        assert_eq!(cursor.unseen(transcript.entries()).len(), 1);
        assert!(cursor.unseen(transcript.entries()).is_empty());

        transcript.push(EntryKind::Notice, "b");
        let fresh = cursor.unseen(transcript.entries());
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].text, "b");
    }
}
