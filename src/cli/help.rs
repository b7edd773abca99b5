//! The `help` command

use crate::command::{describe, CommandTree};
use crate::display::format_options;
use crate::lexer::{TokenKind, TokenStream};

use super::output::{Message, Outcome};
use super::session::dispatch_error_messages;

/// Topics that are not commands
pub const GENERAL_TOPICS: &[(&str, &str)] = &[
    (
        "accounts",
        "accounts are combinations of data like password, username or date of birth \
         that make up an online presence",
    ),
    (
        "backups",
        "the journal ('.backup' in the data directory) records every change you make; \
         'info backup' shows it",
    ),
    ("tree", "shows a tree view of all commands"),
];

/// Greeting shown at startup and by a bare `help`
pub fn banner() -> Vec<Message> {
    vec![
        Message::highlight(format!("Password manager {}", env!("CARGO_PKG_VERSION"))),
        Message::log("Type 'help' for more information or 'tree' to see every command."),
    ]
}

/// Answer `help` followed by the rest of the line
pub fn run_help(tree: &CommandTree, mut rest: TokenStream<'_>, outcome: &mut Outcome) {
    if let Some(token) = rest.peek_token().filter(|t| t.kind == TokenKind::Word) {
        let word = rest.text(token);
        if let Some((_, info)) = GENERAL_TOPICS.iter().find(|(name, _)| *name == word) {
            outcome.push(Message::log(format!("INFO: {}", info)));
            return;
        }
    }

    let line = rest.line();
    let node = match describe(&mut rest, tree) {
        Ok(node) => node,
        Err(err) => {
            outcome.messages.extend(dispatch_error_messages(line, &err));
            return;
        }
    };

    if node.is_root() {
        outcome.messages.extend(banner());
        outcome.push(Message::log(
            "Commands follow branches: each word picks a branch and some branches expect \
             an argument right after them, for instance 'account' needs a name(word). \
             For more information put any of these words after 'help':",
        ));
        for (name, _) in GENERAL_TOPICS {
            outcome.push(Message::highlight(format!("    help {}", name)));
        }
        return;
    }

    outcome.push(Message::log(node.description));
    if node.is_interior() {
        outcome.push(Message::log(format_options(node)));
    }
}
