//! pwmgr - interactive manager for account records
//!
//! Accounts are plain files of NUL-terminated `name, value` pairs in one
//! data directory. Commands typed at a prompt walk a fixed command tree, and
//! every change to an account is appended to a journal.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `lexer`: Splits an input line into typed tokens
//! - `command`: Static command tree and the dispatcher that walks it
//! - `storage`: Account files, scanning and crash-safe rewrites
//! - `journal`: Append-only record of every mutation
//! - `config`: Configuration and path management
//! - `display`: Plain-text formatting of trees, options and accounts
//! - `cli`: Session that ties the pieces together for the prompt
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,no_run
//! use pwmgr::cli::Session;
//! use pwmgr::config::{PwmgrPaths, Settings};
//! use pwmgr::storage::Store;
//!
//! # fn main() -> Result<(), pwmgr::PwmgrError> {
//! let paths = PwmgrPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let session = Session::new(Store::open(paths, &settings)?, settings);
//!
//! for message in session.execute_line("list accounts").messages {
//!     println!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod journal;
pub mod lexer;
pub mod storage;

pub use error::PwmgrError;
