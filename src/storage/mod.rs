//! Storage layer for pwmgr
//!
//! Provides the on-disk account records, crash-safe rewrites and the journal
//! handle, all rooted in one base directory.

pub mod accounts;
pub mod file_io;
pub mod record;

pub use accounts::{validate_account_name, StagedRemoval};
pub use file_io::{exchange, Swap, TempFile};
pub use record::{Property, RecordReader, ScanStage, MAX_NAME_LEN};

use crate::config::paths::PwmgrPaths;
use crate::config::Settings;
use crate::error::{PwmgrError, PwmgrResult};
use crate::journal::Journal;

/// Storage context shared by every command of a session
#[derive(Debug)]
pub struct Store {
    paths: PwmgrPaths,
    /// Bytes requested per read while scanning
    read_window: usize,
    journal: Journal,
}

impl Store {
    /// Open the store, creating the base directory and journal if needed
    pub fn open(paths: PwmgrPaths, settings: &Settings) -> PwmgrResult<Self> {
        paths.ensure_directories()?;

        let read_window = settings.effective_read_window();
        let journal = Journal::open(paths.journal_file(), read_window).map_err(|e| match e {
            PwmgrError::Setup(_) => e,
            other => PwmgrError::Setup(other.to_string()),
        })?;

        Ok(Self {
            paths,
            read_window,
            journal,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PwmgrPaths {
        &self.paths
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}
