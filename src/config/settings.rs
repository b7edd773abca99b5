//! User settings for pwmgr
//!
//! Stored as JSON next to the accounts. Every field has a default so older or
//! hand-edited files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::PwmgrPaths;
use crate::error::PwmgrError;

/// Smallest read window the scanner accepts
pub const MIN_READ_WINDOW: usize = 64;

/// User settings for pwmgr
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Print the account list after startup
    #[serde(default = "default_list_accounts_on_start")]
    pub list_accounts_on_start: bool,

    /// Bytes requested per read when scanning record and journal files
    #[serde(default = "default_read_window")]
    pub read_window: usize,

    /// tracing filter directive used when `PWMGR_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_list_accounts_on_start() -> bool {
    true
}

fn default_read_window() -> usize {
    1024
}

fn default_log_filter() -> String {
    "pwmgr=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            list_accounts_on_start: default_list_accounts_on_start(),
            read_window: default_read_window(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Read window clamped to a usable size
    pub fn effective_read_window(&self) -> usize {
        self.read_window.max(MIN_READ_WINDOW)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PwmgrPaths) -> Result<Self, PwmgrError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| PwmgrError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PwmgrError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PwmgrPaths) -> Result<(), PwmgrError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PwmgrError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| PwmgrError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
