//! Custom error types for pwmgr
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Errors fall into five classes: syntax,
//! dispatch, resource, corruption and fatal setup. Only the last one ends the
//! process.

use std::path::PathBuf;

use thiserror::Error;

use crate::command::DispatchError;
use crate::lexer::LexError;
use crate::storage::ScanStage;

/// The main error type for pwmgr operations
#[derive(Error, Debug)]
pub enum PwmgrError {
    /// The input line could not be tokenized
    #[error("Syntax error: {0}")]
    Syntax(#[from] LexError),

    /// The token stream does not name a command
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The environment could not be prepared (base directory, journal)
    #[error("Setup failed: {0}")]
    Setup(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Validation errors for names and values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} '{identifier}' doesn't exist")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} '{identifier}' already exists")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A record or journal file broke the NUL framing
    #[error("File '{}' is corrupt (stage: {stage})", file.display())]
    Corrupt { file: PathBuf, stage: ScanStage },
}

impl PwmgrError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for properties
    pub fn property_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Property",
            identifier: identifier.into(),
        }
    }

    /// Create a "duplicate" error for accounts
    pub fn account_exists(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "duplicate" error for properties
    pub fn property_exists(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Property",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a corruption error
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Check if this error must end the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Setup(_) | Self::Config(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for PwmgrError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for pwmgr operations
pub type PwmgrResult<T> = Result<T, PwmgrError>;
