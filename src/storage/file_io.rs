//! File I/O utilities for crash-safe rewrites
//!
//! Rewrites go to a scratch file first, get synced, and only then take the
//! place of the original in a single directory operation. On Linux the two
//! entries are exchanged with `renameat2(RENAME_EXCHANGE)`, so the old content
//! stays reachable under the scratch name until it is removed.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// How [`exchange`] put the new content in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swap {
    /// Both entries were swapped; the old content now sits at the scratch path
    Exchanged,
    /// The scratch file was renamed over the target; the old content is gone
    Replaced,
}

fn private_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Create a new, empty file readable only by its owner
///
/// Fails with `AlreadyExists` if anything is already at `path`.
pub fn create_private(path: &Path) -> io::Result<File> {
    private_options().write(true).create_new(true).open(path)
}

/// Open a file for appending, creating it if needed, with reads allowed
pub fn open_append(path: &Path) -> io::Result<File> {
    private_options()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
}

/// Atomically swap the directory entries of `a` and `b`
///
/// Falls back to renaming `a` over `b` where the filesystem cannot exchange
/// entries; readers still see either the old or the new file, never a mix.
#[cfg(target_os = "linux")]
pub fn exchange(a: &Path, b: &Path) -> io::Result<Swap> {
    use rustix::fs::{renameat_with, RenameFlags, CWD};
    use rustix::io::Errno;

    match renameat_with(CWD, a, CWD, b, RenameFlags::EXCHANGE) {
        Ok(()) => Ok(Swap::Exchanged),
        Err(errno) if errno == Errno::INVAL || errno == Errno::NOSYS => {
            warn!(%errno, "filesystem cannot exchange entries, renaming instead");
            fs::rename(a, b)?;
            Ok(Swap::Replaced)
        }
        Err(errno) => Err(errno.into()),
    }
}

/// Atomically put `a` in place of `b`
#[cfg(not(target_os = "linux"))]
pub fn exchange(a: &Path, b: &Path) -> io::Result<Swap> {
    fs::rename(a, b)?;
    Ok(Swap::Replaced)
}

/// Scratch file that is deleted when dropped
///
/// Whatever ends up at the scratch path (new content that was never
/// committed, or old content after an exchange) is removed on drop.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    file: File,
}

impl TempFile {
    /// Create (or truncate) the scratch file at `path`
    pub fn create(path: PathBuf) -> io::Result<Self> {
        let file = private_options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Flush file content and metadata to disk
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove scratch file"),
        }
    }
}
