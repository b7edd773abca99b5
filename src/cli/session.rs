//! Interactive session
//!
//! A [`Session`] owns the store and runs one input line at a time through
//! the lexer, the dispatcher and the store, collecting everything the user
//! should see as [`Message`]s.

use tracing::debug;

use crate::command::{dispatch, Action, CommandTree, DispatchError, Resolved, Special};
use crate::config::Settings;
use crate::display::{format_account_list, format_caret, format_options, format_property, format_tree};
use crate::error::{PwmgrError, PwmgrResult};
use crate::lexer::{tokenize, Value};
use crate::storage::Store;

use super::help::{banner, run_help};
use super::output::{Message, Outcome};

/// Messages describing a dispatch failure on `line`
pub(crate) fn dispatch_error_messages(line: &str, err: &DispatchError) -> Vec<Message> {
    let mut messages = vec![Message::error(err.to_string())];
    if let Some(offset) = err.offset() {
        messages.push(Message::log(format_caret(line, offset)));
    }
    if let Some(node) = err.options() {
        let options = format_options(node);
        if !options.is_empty() {
            messages.push(Message::log(options));
        }
    }
    messages
}

fn error_message(err: &PwmgrError) -> Message {
    if err.is_fatal() {
        Message::fatal(err.to_string())
    } else {
        Message::error(err.to_string())
    }
}

fn arg<'a>(args: &[Value<'a>], index: usize) -> PwmgrResult<&'a str> {
    args.get(index)
        .map(|value| value.as_str())
        .ok_or_else(|| PwmgrError::Validation(format!("Missing argument {}", index + 1)))
}

/// One interactive session over a store
#[derive(Debug)]
pub struct Session {
    store: Store,
    tree: CommandTree,
    settings: Settings,
}

impl Session {
    pub fn new(store: Store, settings: Settings) -> Self {
        Self {
            store,
            tree: CommandTree::standard(),
            settings,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn banner(&self) -> Vec<Message> {
        banner()
    }

    /// Run one input line
    ///
    /// Blank lines produce no output. Failures never leave the store half
    /// written; they are reported as messages.
    pub fn execute_line(&self, line: &str) -> Outcome {
        let mut outcome = Outcome::default();

        let stream = match tokenize(line) {
            Ok(stream) => stream,
            Err(err) => {
                outcome.push(Message::error(PwmgrError::from(err).to_string()));
                outcome.push(Message::log(format_caret(line, err.offset)));
                return outcome;
            }
        };
        if stream.is_empty() {
            return outcome;
        }

        match dispatch(stream, &self.tree) {
            Ok(Resolved::Command { action, args, .. }) => {
                if let Err(err) = self.run(action, &args, &mut outcome) {
                    debug!(?action, error = %err, "command failed");
                    outcome.push(error_message(&err));
                }
            }
            Ok(Resolved::Special {
                special: Special::Help,
                rest,
                ..
            }) => run_help(&self.tree, rest, &mut outcome),
            Err(err) => outcome.messages.extend(dispatch_error_messages(line, &err)),
        }

        if outcome.is_fatal() {
            outcome.quit = true;
        }
        outcome
    }

    fn run(&self, action: Action, args: &[Value<'_>], outcome: &mut Outcome) -> PwmgrResult<()> {
        match action {
            Action::AddAccount => {
                let name = arg(args, 0)?;
                self.store.create_account(name)?;
                outcome.push(Message::log(format!(
                    "Created new account '{}' inside '{}'",
                    name,
                    self.store.paths().base_dir().display()
                )));
            }
            Action::AddProperty => {
                let (property, account, value) = (arg(args, 0)?, arg(args, 1)?, arg(args, 2)?);
                self.store.append_property(account, property, value)?;
                outcome.push(Message::log(format!(
                    "Written '{}' to account '{}'",
                    property, account
                )));
            }
            Action::RemoveAccount => {
                let name = arg(args, 0)?;
                self.store.remove_account(name)?;
                outcome.push(Message::log(format!(
                    "Successfully removed account '{}'",
                    name
                )));
            }
            Action::RemoveProperty => {
                let (property, account) = (arg(args, 0)?, arg(args, 1)?);
                self.store.remove_property(account, property)?;
                outcome.push(Message::log(format!(
                    "Removed property '{}' from account '{}'",
                    property, account
                )));
            }
            Action::ShowAccount => self.show_account(arg(args, 0)?, outcome)?,
            Action::ShowJournal => self.show_journal(outcome)?,
            Action::ListAccounts => {
                let names = self.store.list_accounts()?;
                outcome.push(Message::log(format_account_list(&names)));
            }
            Action::Tree => outcome.push(Message::log(format_tree(self.tree.root()))),
            Action::Clear => outcome.clear = true,
            Action::Quit => outcome.quit = true,
        }
        if action.is_mutation() {
            debug!(?action, "store updated");
        }
        Ok(())
    }

    /// Print properties as they are read; a corrupt tail keeps the good head
    fn show_account(&self, name: &str, outcome: &mut Outcome) -> PwmgrResult<()> {
        let properties = self.store.read_account(name)?;
        outcome.push(Message::highlight(format!("Account '{}':", name)));

        let mut count = 0;
        for property in properties {
            outcome.push(Message::log(format_property(&property?)));
            count += 1;
        }
        if count == 0 {
            outcome.push(Message::log("(no properties)"));
        }
        Ok(())
    }

    /// Count header, then one line per entry
    ///
    /// A corrupt journal has no count; the listing stops where it broke.
    fn show_journal(&self, outcome: &mut Outcome) -> PwmgrResult<()> {
        let journal = self.store.journal();
        if let Ok(total) = journal.entry_count() {
            if total == 0 {
                outcome.push(Message::log("The journal is empty"));
                return Ok(());
            }
            let noun = if total == 1 { "entry" } else { "entries" };
            outcome.push(Message::highlight(format!("Journal ({} {}):", total, noun)));
        }

        for entry in journal.read_all()? {
            outcome.push(Message::log(entry?.format_human_readable()));
        }
        Ok(())
    }
}
