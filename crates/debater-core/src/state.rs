//! UI-agnostic timeline types
//!
//! These are the values a front end renders. They are never mutated in place:
//! a state change removes the old entry and appends a new one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a timeline entry.
///
/// `Pending` is the reserved identity of the single in-progress status entry,
/// so it can be located and removed without colliding with sequence ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryId {
    Pending,
    Seq(u64),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Pending => f.write_str("pending"),
            EntryId::Seq(n) => write!(f, "entry-{n}"),
        }
    }
}

/// The role of a conversation message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Pending,
    Success,
    Failure,
}

/// A message in the conversation, either echoed user input or model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: EntryId,
    pub role: Role,
    pub text: String,
    /// True for model-produced content.
    pub is_generated: bool,
}

/// A transient progress or outcome notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: EntryId,
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEntry {
    Conversation(ConversationEntry),
    Status(StatusEntry),
}

impl TimelineEntry {
    pub fn id(&self) -> EntryId {
        match self {
            TimelineEntry::Conversation(entry) => entry.id,
            TimelineEntry::Status(entry) => entry.id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TimelineEntry::Conversation(entry) => &entry.text,
            TimelineEntry::Status(entry) => &entry.text,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TimelineEntry::Status(entry) if entry.kind == StatusKind::Pending)
    }

    pub fn as_status(&self) -> Option<&StatusEntry> {
        match self {
            TimelineEntry::Status(entry) => Some(entry),
            TimelineEntry::Conversation(_) => None,
        }
    }

    pub fn as_conversation(&self) -> Option<&ConversationEntry> {
        match self {
            TimelineEntry::Conversation(entry) => Some(entry),
            TimelineEntry::Status(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_id_is_distinct_from_sequence_ids() {
        assert_ne!(EntryId::Pending, EntryId::Seq(0));
        assert_eq!(EntryId::Pending.to_string(), "pending");
        assert_eq!(EntryId::Seq(7).to_string(), "entry-7");
    }

    #[test]
    fn test_is_pending_only_for_pending_status() {
        let pending = TimelineEntry::Status(StatusEntry {
            id: EntryId::Pending,
            kind: StatusKind::Pending,
            text: "working".to_string(),
        });
        let failure = TimelineEntry::Status(StatusEntry {
            id: EntryId::Seq(1),
            kind: StatusKind::Failure,
            text: "nope".to_string(),
        });
        assert!(pending.is_pending());
        assert!(!failure.is_pending());
        assert_eq!(failure.text(), "nope");
    }
}
