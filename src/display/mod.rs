//! Display formatting for terminal output
//!
//! Plain-text formatting only; coloring by severity happens in the binary.

pub mod account;
pub mod command;

pub use account::{format_account_list, format_property};
pub use command::{format_caret, format_options, format_tree};
