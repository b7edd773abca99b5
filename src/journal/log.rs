//! Append-only journal file
//!
//! The journal file is opened once and kept for the life of the store. Each
//! entry goes out in a single write followed by a flush, so a reader never
//! sees half of an entry written by a completed mutation.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tracing::{debug, warn};

use crate::error::{PwmgrError, PwmgrResult};
use crate::storage::file_io::open_append;
use crate::storage::record::{Field, FieldReader};
use crate::storage::ScanStage;

use super::entry::{EntryKind, JournalEntry, JournalEvent, HEADER_LEN};

/// Handles writing entries to the journal file
#[derive(Debug)]
pub struct Journal {
    /// Path to the journal file
    path: PathBuf,
    /// Long-lived append handle
    file: File,
    read_window: usize,
}

impl Journal {
    /// Open (creating if needed) the journal at `path`
    pub fn open(path: PathBuf, read_window: usize) -> PwmgrResult<Self> {
        let file = open_append(&path).map_err(|e| {
            PwmgrError::Setup(format!(
                "Unable to open journal '{}' ({})",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            path,
            file,
            read_window,
        })
    }

    /// Record a mutation
    ///
    /// Returns the entry exactly as it was written.
    pub fn append(&self, event: JournalEvent) -> PwmgrResult<JournalEntry> {
        let entry = JournalEntry::new(event);
        let bytes = entry.encode();

        let mut file = &self.file;
        file.write_all(&bytes)
            .map_err(|e| PwmgrError::Io(format!("Failed to write journal entry: {}", e)))?;
        file.flush()
            .map_err(|e| PwmgrError::Io(format!("Failed to flush journal: {}", e)))?;

        debug!(kind = %entry.kind(), "journal entry written");
        Ok(entry)
    }

    /// Lazily read every entry, oldest first
    ///
    /// Each call opens a fresh handle, so enumeration can be restarted.
    pub fn read_all(&self) -> PwmgrResult<JournalReader<File>> {
        let file = File::open(&self.path)
            .map_err(|e| PwmgrError::Io(format!("Failed to open journal: {}", e)))?;
        Ok(JournalReader::new(file, self.path.clone(), self.read_window))
    }

    /// Get the number of entries in the journal
    pub fn entry_count(&self) -> PwmgrResult<usize> {
        self.read_all()?
            .try_fold(0, |count, entry| entry.map(|_| count + 1))
    }

    /// Get the path to the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lazy sequence of decoded journal entries
///
/// A corrupt entry is yielded as an `Err` item and ends the enumeration.
pub struct JournalReader<R = File> {
    fields: FieldReader<R>,
    file: PathBuf,
    done: bool,
}

impl<R: Read> JournalReader<R> {
    pub fn new(inner: R, file: PathBuf, window: usize) -> Self {
        Self {
            fields: FieldReader::new(inner, window),
            file,
            done: false,
        }
    }

    fn corrupt(&self, stage: ScanStage) -> PwmgrError {
        warn!(file = %self.file.display(), %stage, "corrupt journal");
        PwmgrError::Corrupt {
            file: self.file.clone(),
            stage,
        }
    }

    fn read_error(&self, err: io::Error) -> PwmgrError {
        PwmgrError::Io(format!("Failed to read journal: {}", err))
    }

    fn read_entry(&mut self) -> PwmgrResult<Option<JournalEntry>> {
        let header = match self
            .fields
            .take(HEADER_LEN)
            .map_err(|e| self.read_error(e))?
        {
            Field::Complete(header) => header,
            Field::End => return Ok(None),
            Field::Partial => return Err(self.corrupt(ScanStage::EntryHeader)),
        };

        let kind = EntryKind::from_tag(header[0]).ok_or_else(|| self.corrupt(ScanStage::EntryKind))?;

        let mut seconds = [0u8; 8];
        seconds.copy_from_slice(&header[1..HEADER_LEN]);
        let timestamp = Utc
            .timestamp_opt(i64::from_le_bytes(seconds), 0)
            .single()
            .ok_or_else(|| self.corrupt(ScanStage::EntryHeader))?;

        let mut fields = Vec::with_capacity(kind.field_count());
        for _ in 0..kind.field_count() {
            match self.fields.next_field(None).map_err(|e| self.read_error(e))? {
                Field::Complete(field) => fields.push(String::from_utf8_lossy(&field).into_owned()),
                Field::End | Field::Partial => return Err(self.corrupt(ScanStage::EntryField)),
            }
        }

        let event = JournalEvent::from_fields(kind, fields)
            .ok_or_else(|| self.corrupt(ScanStage::EntryField))?;
        Ok(Some(JournalEntry::with_timestamp(event, timestamp)))
    }
}

impl<R: Read> Iterator for JournalReader<R> {
    type Item = PwmgrResult<JournalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
