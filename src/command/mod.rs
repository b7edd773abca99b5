//! Command language: static tree and dispatcher
//!
//! ```rust
//! use pwmgr::command::{dispatch, Action, CommandTree, Resolved};
//! use pwmgr::lexer::tokenize;
//!
//! let tree = CommandTree::standard();
//! let stream = tokenize("+ account bob").unwrap();
//! match dispatch(stream, &tree).unwrap() {
//!     Resolved::Command { action, args, .. } => {
//!         assert_eq!(action, Action::AddAccount);
//!         assert_eq!(args[0].as_str(), "bob");
//!     }
//!     Resolved::Special { .. } => unreachable!(),
//! }
//! ```

pub mod dispatch;
pub mod tree;

pub use dispatch::{describe, dispatch, shorthand, DispatchError, Resolved};
pub use tree::{dependency, Action, CommandTree, Dependency, Node, NodeKind, Special, DEPENDENCIES};
