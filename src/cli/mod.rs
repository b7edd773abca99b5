//! Interactive front end
//!
//! Turns input lines into store operations and severity-tagged output. The
//! binary only reads lines and prints the resulting messages.

pub mod help;
pub mod output;
pub mod session;

pub use output::{Message, Outcome, Severity};
pub use session::Session;
