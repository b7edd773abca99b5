//! Journal entry data structures
//!
//! Defines the mutation kinds that are journaled and the binary layout of one
//! entry: a tag byte, a little-endian `i64` Unix timestamp in seconds, then
//! the kind's fields, each NUL-terminated.

use chrono::{DateTime, SubsecRound, Utc};

/// Size of the fixed prefix of every entry (tag + timestamp)
pub const HEADER_LEN: usize = 9;

/// Types of mutations that are journaled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    AddAccount,
    RemoveAccount,
    AddProperty,
    RemoveProperty,
}

impl EntryKind {
    /// On-disk tag byte
    pub fn tag(self) -> u8 {
        match self {
            EntryKind::AddAccount => 1,
            EntryKind::RemoveAccount => 2,
            EntryKind::AddProperty => 3,
            EntryKind::RemoveProperty => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(EntryKind::AddAccount),
            2 => Some(EntryKind::RemoveAccount),
            3 => Some(EntryKind::AddProperty),
            4 => Some(EntryKind::RemoveProperty),
            _ => None,
        }
    }

    /// Number of NUL-terminated fields following the header
    pub fn field_count(self) -> usize {
        match self {
            EntryKind::AddAccount | EntryKind::RemoveAccount => 1,
            EntryKind::RemoveProperty => 2,
            EntryKind::AddProperty => 3,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::AddAccount => write!(f, "ADD_ACCOUNT"),
            EntryKind::RemoveAccount => write!(f, "REMOVE_ACCOUNT"),
            EntryKind::AddProperty => write!(f, "ADD_PROPERTY"),
            EntryKind::RemoveProperty => write!(f, "REMOVE_PROPERTY"),
        }
    }
}

/// A journaled mutation and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    AddAccount {
        account: String,
    },
    RemoveAccount {
        account: String,
    },
    AddProperty {
        property: String,
        account: String,
        value: String,
    },
    RemoveProperty {
        property: String,
        account: String,
    },
}

impl JournalEvent {
    pub fn kind(&self) -> EntryKind {
        match self {
            JournalEvent::AddAccount { .. } => EntryKind::AddAccount,
            JournalEvent::RemoveAccount { .. } => EntryKind::RemoveAccount,
            JournalEvent::AddProperty { .. } => EntryKind::AddProperty,
            JournalEvent::RemoveProperty { .. } => EntryKind::RemoveProperty,
        }
    }

    /// Fields in on-disk order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            JournalEvent::AddAccount { account } | JournalEvent::RemoveAccount { account } => {
                vec![account.as_str()]
            }
            JournalEvent::AddProperty {
                property,
                account,
                value,
            } => vec![property.as_str(), account.as_str(), value.as_str()],
            JournalEvent::RemoveProperty { property, account } => {
                vec![property.as_str(), account.as_str()]
            }
        }
    }

    /// Rebuild an event from its decoded fields
    ///
    /// Returns `None` when the number of fields does not match `kind`.
    pub fn from_fields(kind: EntryKind, fields: Vec<String>) -> Option<Self> {
        if fields.len() != kind.field_count() {
            return None;
        }
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();

        Some(match kind {
            EntryKind::AddAccount => JournalEvent::AddAccount { account: next() },
            EntryKind::RemoveAccount => JournalEvent::RemoveAccount { account: next() },
            EntryKind::AddProperty => JournalEvent::AddProperty {
                property: next(),
                account: next(),
                value: next(),
            },
            EntryKind::RemoveProperty => JournalEvent::RemoveProperty {
                property: next(),
                account: next(),
            },
        })
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// When the mutation happened, whole seconds (UTC)
    pub timestamp: DateTime<Utc>,

    /// What was changed
    pub event: JournalEvent,
}

impl JournalEntry {
    /// Create an entry stamped with the current time
    pub fn new(event: JournalEvent) -> Self {
        Self {
            timestamp: Utc::now().trunc_subsecs(0),
            event,
        }
    }

    pub fn with_timestamp(event: JournalEvent, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, event }
    }

    pub fn kind(&self) -> EntryKind {
        self.event.kind()
    }

    /// Serialize into the on-disk layout
    pub fn encode(&self) -> Vec<u8> {
        let fields = self.event.fields();
        let len = HEADER_LEN + fields.iter().map(|f| f.len() + 1).sum::<usize>();

        let mut out = Vec::with_capacity(len);
        out.push(self.kind().tag());
        out.extend_from_slice(&self.timestamp.timestamp().to_le_bytes());
        for field in fields {
            out.extend_from_slice(field.as_bytes());
            out.push(0);
        }
        out
    }

    /// Format the entry for display
    pub fn format_human_readable(&self) -> String {
        let timestamp = self.timestamp.format("%Y-%m-%d %H:%M:%S UTC");

        let description = match &self.event {
            JournalEvent::AddAccount { account } => format!("Added account '{}'", account),
            JournalEvent::RemoveAccount { account } => format!("Removed account '{}'", account),
            JournalEvent::AddProperty {
                property,
                account,
                value,
            } => format!(
                "Added property '{}' to account '{}' with value '{}'",
                property, account, value
            ),
            JournalEvent::RemoveProperty { property, account } => {
                format!("Removed property '{}' from account '{}'", property, account)
            }
        };

        format!("[{}] {}", timestamp, description)
    }
}
