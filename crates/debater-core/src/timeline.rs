//! Ordered store of conversation and status entries.
//!
//! Append-only apart from removal by identity. The store does no I/O and knows
//! nothing about requests; the orchestrator decides what goes in.

use crate::state::{EntryId, StatusEntry, TimelineEntry};

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identity. Sequence ids are never reused, even after
    /// the entry carrying one is removed.
    pub fn next_id(&mut self) -> EntryId {
        let id = EntryId::Seq(self.next_seq);
        self.next_seq += 1;
        id
    }

    pub fn append(&mut self, entry: TimelineEntry) {
        debug_assert!(
            self.entries.iter().all(|e| e.id() != entry.id()),
            "duplicate timeline id {}",
            entry.id()
        );
        self.entries.push(entry);
    }

    /// Remove the entry with `id`, returning it. No-op when absent.
    pub fn remove_by_id(&mut self, id: EntryId) -> Option<TimelineEntry> {
        let idx = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(idx))
    }

    /// Point-in-time copy for rendering.
    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&TimelineEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn pending(&self) -> Option<&StatusEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_pending())
            .find_map(TimelineEntry::as_status)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An empty timeline is where a renderer shows its welcome banner.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ConversationEntry, Role, StatusKind};

    fn user(timeline: &mut Timeline, text: &str) -> TimelineEntry {
        TimelineEntry::Conversation(ConversationEntry {
            id: timeline.next_id(),
            role: Role::User,
            text: text.to_string(),
            is_generated: false,
        })
    }

    fn pending() -> TimelineEntry {
        TimelineEntry::Status(StatusEntry {
            id: EntryId::Pending,
            kind: StatusKind::Pending,
            text: "Generating".to_string(),
        })
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut timeline = Timeline::new();
        let a = user(&mut timeline, "a");
        let b = user(&mut timeline, "b");
        timeline.append(a.clone());
        timeline.append(b.clone());
        assert_eq!(timeline.snapshot(), vec![a, b]);
    }

    #[test]
    fn test_remove_by_id_only_touches_matching_entry() {
        let mut timeline = Timeline::new();
        let a = user(&mut timeline, "a");
        timeline.append(a.clone());
        timeline.append(pending());

        let removed = timeline.remove_by_id(EntryId::Pending);
        assert!(removed.is_some_and(|e| e.is_pending()));
        assert_eq!(timeline.snapshot(), vec![a]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut timeline = Timeline::new();
        let a = user(&mut timeline, "a");
        timeline.append(a);
        assert!(timeline.remove_by_id(EntryId::Pending).is_none());
        assert!(timeline.remove_by_id(EntryId::Seq(99)).is_none());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut timeline = Timeline::new();
        let a = user(&mut timeline, "a");
        let first = a.id();
        timeline.append(a);
        timeline.remove_by_id(first);
        assert_ne!(timeline.next_id(), first);
    }

    #[test]
    fn test_pending_lookup() {
        let mut timeline = Timeline::new();
        assert!(timeline.pending().is_none());
        timeline.append(pending());
        assert_eq!(timeline.pending_count(), 1);
        assert_eq!(timeline.pending().map(|s| s.id), Some(EntryId::Pending));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut timeline = Timeline::new();
        let a = user(&mut timeline, "a");
        timeline.append(a);
        let before = timeline.snapshot();
        timeline.append(pending());
        assert_eq!(before.len(), 1);
        assert_eq!(timeline.len(), 2);
    }
}
