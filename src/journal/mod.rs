//! Journal of store mutations
//!
//! Every successful mutation of the record store appends one entry here.
//! The journal is an audit trail: entries are never rewritten or removed.

pub mod entry;
pub mod log;

pub use entry::{EntryKind, JournalEntry, JournalEvent};
pub use log::{Journal, JournalReader};
