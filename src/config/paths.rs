//! Path management for pwmgr
//!
//! Every file lives directly in one base directory: one regular file per
//! account plus a few dot files that account listings skip.
//!
//! ## Path Resolution Order
//!
//! 1. `--data-dir` on the command line (see `main.rs`)
//! 2. `PWMGR_DATA_DIR` environment variable (if set)
//! 3. `$HOME/Passwords`

use std::path::{Path, PathBuf};

use crate::error::PwmgrError;

/// Name of the journal file inside the base directory
pub const JOURNAL_FILE_NAME: &str = ".backup";

/// Scratch file used while rewriting an account
pub const TEMP_FILE_NAME: &str = ".tmp";

/// Manages all paths used by pwmgr
#[derive(Debug, Clone)]
pub struct PwmgrPaths {
    /// Directory holding the accounts, the journal and the settings
    base_dir: PathBuf,
}

impl PwmgrPaths {
    /// Create a new PwmgrPaths instance
    ///
    /// Path resolution:
    /// 1. `PWMGR_DATA_DIR` env var (explicit override)
    /// 2. `Passwords` inside the user's home directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, PwmgrError> {
        let base_dir = if let Ok(custom) = std::env::var("PWMGR_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PwmgrPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/Passwords or equivalent)
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path of an account file
    pub fn account_file(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Get the path to the journal
    pub fn journal_file(&self) -> PathBuf {
        self.base_dir.join(JOURNAL_FILE_NAME)
    }

    /// Get the path of the scratch file used by property removal
    pub fn temp_file(&self) -> PathBuf {
        self.base_dir.join(TEMP_FILE_NAME)
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join(".settings.json")
    }

    /// Get the path to the diagnostic log
    pub fn log_file(&self) -> PathBuf {
        self.base_dir.join(".pwmgr.log")
    }

    /// Ensure the base directory exists
    ///
    /// On unix a newly created directory is only accessible by its owner.
    pub fn ensure_directories(&self) -> Result<(), PwmgrError> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        builder.create(&self.base_dir).map_err(|e| {
            PwmgrError::Setup(format!(
                "Could not create directory '{}' ({})",
                self.base_dir.display(),
                e
            ))
        })
    }
}

/// Resolve the default data directory from the user's home
fn resolve_default_path() -> Result<PathBuf, PwmgrError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| PwmgrError::Config("Could not determine the home directory".into()))?;
    Ok(dirs.home_dir().join("Passwords"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PwmgrPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.journal_file(), temp_dir.path().join(".backup"));
        assert_eq!(paths.account_file("github"), temp_dir.path().join("github"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        // Set the env var
        env::set_var("PWMGR_DATA_DIR", custom_path);

        let paths = PwmgrPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        // Clean up
        env::remove_var("PWMGR_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PwmgrPaths::with_base_dir(temp_dir.path().join("nested").join("Passwords"));

        paths.ensure_directories().unwrap();
        assert!(paths.base_dir().is_dir());

        // Second call is a no-op
        paths.ensure_directories().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_base_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let paths = PwmgrPaths::with_base_dir(temp_dir.path().join("Passwords"));
        paths.ensure_directories().unwrap();

        let mode = std::fs::metadata(paths.base_dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_unusable_base_dir_is_setup_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let paths = PwmgrPaths::with_base_dir(blocker.join("Passwords"));
        let err = paths.ensure_directories().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_dot_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PwmgrPaths::with_base_dir(temp_dir.path().to_path_buf());

        for path in [
            paths.journal_file(),
            paths.temp_file(),
            paths.settings_file(),
            paths.log_file(),
        ] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with('.'), "{name} must be hidden");
        }
    }
}
