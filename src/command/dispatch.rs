//! Dispatcher: walks the command tree one token at a time
//!
//! Each step pops a token, maps it to a canonical word, moves to the child of
//! that name and, when the name has a dependency descriptor, pops and checks
//! the argument that must follow it. A leaf ends the walk with its action and
//! the collected arguments; a special node ends it with the rest of the
//! stream. Any failure aborts the whole command before anything has run.

use thiserror::Error;
use tracing::debug;

use super::tree::{dependency, Action, CommandTree, Node, NodeKind, Special};
use crate::lexer::{Token, TokenKind, TokenStream, Value};

/// A fully resolved command
#[derive(Debug)]
pub enum Resolved<'a> {
    /// Leaf with its positional arguments, in the order they appeared
    Command {
        node: &'static Node,
        action: Action,
        args: Vec<Value<'a>>,
    },
    /// Special node with the tokens it has not consumed
    Special {
        node: &'static Node,
        special: Special,
        rest: TokenStream<'a>,
    },
}

/// Why a token stream does not name a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Ran out of tokens on an interior node
    #[error("{}", incomplete_message(.node))]
    Incomplete { node: &'static Node },

    /// No child of `node` is called `word`
    #[error("{}", unknown_branch_message(.node, .word))]
    UnknownBranch { node: &'static Node, word: String },

    /// Token that cannot name a branch (string, number, stray punctuation)
    #[error("Unexpected {kind} at position {offset}")]
    UnexpectedToken { kind: TokenKind, offset: usize },

    /// Dependency token missing at end of input
    #[error("Expected {expected} after '{branch}'")]
    MissingDependency {
        branch: &'static str,
        expected: &'static str,
    },

    /// Dependency token present but of the wrong kind
    #[error("Expected {expected} after '{branch}', found {found}")]
    WrongDependency {
        branch: &'static str,
        expected: &'static str,
        found: TokenKind,
        offset: usize,
    },
}

fn incomplete_message(node: &Node) -> String {
    if node.is_root() {
        "Command needs more options".to_string()
    } else {
        format!("Branch '{}' needs more options", node.name)
    }
}

fn unknown_branch_message(node: &Node, word: &str) -> String {
    if node.is_root() {
        format!("Branch '{}' doesn't exist", word)
    } else {
        format!("Branch '{}' doesn't have the option '{}'", node.name, word)
    }
}

impl DispatchError {
    /// Node whose children are worth listing as alternatives
    pub fn options(&self) -> Option<&'static Node> {
        match self {
            Self::Incomplete { node } | Self::UnknownBranch { node, .. } => Some(*node),
            _ => None,
        }
    }

    /// Byte offset the error points at, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedToken { offset, .. } | Self::WrongDependency { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

/// Canonical word for shorthand punctuation
pub fn shorthand(kind: TokenKind) -> Option<&'static str> {
    let word = match kind {
        TokenKind::Plus => "add",
        TokenKind::Minus => "remove",
        TokenKind::Colon => "account",
        TokenKind::Equals => "value",
        TokenKind::At => "property",
        TokenKind::Question => "info",
        _ => return None,
    };
    Some(word)
}

fn canonical_word<'a>(stream: &TokenStream<'a>, token: Token) -> Result<&'a str, DispatchError> {
    match token.kind {
        TokenKind::Word => Ok(stream.text(token)),
        kind => shorthand(kind).ok_or(DispatchError::UnexpectedToken {
            kind,
            offset: token.offset,
        }),
    }
}

fn step<'a>(
    node: &'static Node,
    stream: &mut TokenStream<'a>,
) -> Result<&'static Node, DispatchError> {
    let token = stream
        .next_token()
        .ok_or(DispatchError::Incomplete { node })?;
    let word = canonical_word(stream, token)?;
    node.child(word)
        .ok_or_else(|| DispatchError::UnknownBranch {
            node,
            word: word.to_string(),
        })
}

/// Resolve a token stream against a command tree
pub fn dispatch<'a>(
    mut stream: TokenStream<'a>,
    tree: &CommandTree,
) -> Result<Resolved<'a>, DispatchError> {
    let mut node = tree.root();
    let mut args = Vec::new();

    loop {
        let child = step(node, &mut stream)?;

        if let Some(dep) = dependency(child.name) {
            let token = stream
                .next_token()
                .ok_or(DispatchError::MissingDependency {
                    branch: child.name,
                    expected: dep.expected,
                })?;
            let value = stream
                .value(token)
                .filter(|_| dep.accepts(token.kind))
                .ok_or(DispatchError::WrongDependency {
                    branch: child.name,
                    expected: dep.expected,
                    found: token.kind,
                    offset: token.offset,
                })?;
            args.push(value);
        }

        node = child;
        match node.kind {
            NodeKind::Leaf(action) => {
                debug!(branch = node.name, ?action, args = args.len(), "resolved command");
                return Ok(Resolved::Command { node, action, args });
            }
            NodeKind::Special(special) => {
                debug!(branch = node.name, ?special, "resolved special command");
                return Ok(Resolved::Special {
                    node,
                    special,
                    rest: stream,
                });
            }
            NodeKind::Interior(_) => {}
        }
    }
}

/// Follow branch names without checking dependencies
///
/// Used by `help` to find the node a path of names refers to. A branch with
/// a dependency skips the one token after it, whatever its kind, so
/// `account bob show` reaches `show`. Stops at the first leaf or special
/// node; trailing tokens after it are ignored.
pub fn describe(
    stream: &mut TokenStream<'_>,
    tree: &CommandTree,
) -> Result<&'static Node, DispatchError> {
    let mut node = tree.root();
    while node.is_interior() && stream.has_next() {
        node = step(node, stream)?;
        if node.is_interior() && dependency(node.name).is_some() {
            stream.next_token();
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    static ADD_ONLY: [Node; 1] = [Node::leaf("account", "add an account", Action::AddAccount)];
    static SMALL_TOP: [Node; 1] = [Node::interior("add", "add things", &ADD_ONLY)];
    static SMALL_ROOT: Node = Node::interior("", "", &SMALL_TOP);

    fn small_tree() -> CommandTree {
        CommandTree::new(&SMALL_ROOT)
    }

    fn resolve(line: &str) -> Result<(Action, Vec<String>), DispatchError> {
        let stream = tokenize(line).unwrap();
        match dispatch(stream, &CommandTree::standard())? {
            Resolved::Command { action, args, .. } => {
                Ok((action, args.iter().map(|v| v.to_string()).collect()))
            }
            Resolved::Special { .. } => panic!("unexpected special node"),
        }
    }

    #[test]
    fn test_leaf_with_dependency() {
        let stream = tokenize("add account bob").unwrap();
        match dispatch(stream, &small_tree()).unwrap() {
            Resolved::Command { node, action, args } => {
                assert_eq!(node.name, "account");
                assert_eq!(action, Action::AddAccount);
                assert_eq!(args, vec![Value::Word("bob")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_option_lists_parent() {
        let stream = tokenize("add zzz").unwrap();
        let err = dispatch(stream, &small_tree()).unwrap_err();
        assert_eq!(err.to_string(), "Branch 'add' doesn't have the option 'zzz'");
        let options = err.options().unwrap();
        assert_eq!(options.name, "add");
        assert_eq!(options.children()[0].name, "account");
    }

    #[test]
    fn test_unknown_top_level_branch() {
        let err = resolve("frobnicate").unwrap_err();
        assert_eq!(err.to_string(), "Branch 'frobnicate' doesn't exist");
        assert!(err.options().unwrap().is_root());
    }

    fn describe_line(line: &str) -> Result<&'static str, DispatchError> {
        let mut stream = tokenize(line).unwrap();
        describe(&mut stream, &CommandTree::standard()).map(|node| node.name)
    }

    #[test]
    fn test_describe_skips_dependency_values() {
        assert_eq!(describe_line("account bob show").unwrap(), "show");
        assert_eq!(describe_line(": \"bob\" show").unwrap(), "show");
        assert_eq!(describe_line("account bob").unwrap(), "account");
        assert_eq!(describe_line("add property").unwrap(), "property");
        assert!(matches!(
            describe_line("account bob zzz"),
            Err(DispatchError::UnknownBranch { word, .. }) if word == "zzz"
        ));
    }

    #[test]
    fn test_shorthand_matches_words() {
        let long = resolve("add account bob").unwrap();
        let short = resolve("+ account bob").unwrap();
        let shorter = resolve("+:bob").unwrap();
        assert_eq!(long, short);
        assert_eq!(long, shorter);
    }

    #[test]
    fn test_add_property_collects_three_arguments() {
        let (action, args) =
            resolve(r#"add property user account github value "bob""#).unwrap();
        assert_eq!(action, Action::AddProperty);
        assert_eq!(args, vec!["user", "github", "bob"]);

        let (action, args) = resolve(r#"+@user:github="bob""#).unwrap();
        assert_eq!(action, Action::AddProperty);
        assert_eq!(args, vec!["user", "github", "bob"]);
    }

    #[test]
    fn test_number_value_is_accepted() {
        let (_, args) = resolve("+@pin:bank=0042").unwrap();
        assert_eq!(args, vec!["pin", "bank", "0042"]);
    }

    #[test]
    fn test_digit_names_are_accepted() {
        let (action, args) = resolve("add account 2024").unwrap();
        assert_eq!(action, Action::AddAccount);
        assert_eq!(args, vec!["2024"]);

        let (_, args) = resolve(r#"add property 2 account 007 value "x""#).unwrap();
        assert_eq!(args, vec!["2", "007", "x"]);
    }

    #[test]
    fn test_needs_more_options() {
        let err = resolve("remove").unwrap_err();
        assert_eq!(err.to_string(), "Branch 'remove' needs more options");
        assert_eq!(err.options().unwrap().name, "remove");

        let err = resolve("").unwrap_err();
        assert!(err.options().unwrap().is_root());
    }

    #[test]
    fn test_missing_dependency() {
        let err = resolve("add account").unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingDependency {
                branch: "account",
                expected: "an account name (word)",
            }
        );
    }

    #[test]
    fn test_wrong_dependency_kind() {
        let err = resolve(r#"add account "bob""#).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::WrongDependency {
                branch: "account",
                found: TokenKind::String,
                offset: 12,
                ..
            }
        ));
        assert_eq!(err.offset(), Some(12));

        let err = resolve("+@user:github=bob").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::WrongDependency {
                branch: "value",
                found: TokenKind::Word,
                ..
            }
        ));
    }

    #[test]
    fn test_string_cannot_name_a_branch() {
        let err = resolve(r#""add""#).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnexpectedToken {
                kind: TokenKind::String,
                offset: 0,
            }
        );

        let err = resolve("add %").unwrap_err();
        assert_eq!(err.offset(), Some(4));
    }

    #[test]
    fn test_no_backtracking_to_siblings() {
        // "account" under "add" is a leaf needing a name; the failure must not
        // fall through to "property"
        let err = resolve(r#"add account "12""#).unwrap_err();
        assert!(matches!(err, DispatchError::WrongDependency { .. }));
    }

    #[test]
    fn test_special_keeps_remaining_tokens() {
        let stream = tokenize("help add account").unwrap();
        match dispatch(stream, &CommandTree::standard()).unwrap() {
            Resolved::Special {
                special, mut rest, ..
            } => {
                assert_eq!(special, Special::Help);
                assert_eq!(rest.remaining(), 2);
                let next = rest.next_token().unwrap();
                assert_eq!(rest.text(next), "add");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_leaves_without_dependencies() {
        assert_eq!(resolve("tree").unwrap(), (Action::Tree, vec![]));
        assert_eq!(resolve("? backup").unwrap(), (Action::ShowJournal, vec![]));
        assert_eq!(
            resolve("account bob show").unwrap(),
            (Action::ShowAccount, vec!["bob".to_string()])
        );
    }

    #[test]
    fn test_describe_ignores_dependencies() {
        let tree = CommandTree::standard();

        let mut stream = tokenize("add account").unwrap();
        assert_eq!(describe(&mut stream, &tree).unwrap().name, "account");

        let mut stream = tokenize("").unwrap();
        assert!(describe(&mut stream, &tree).unwrap().is_root());

        let mut stream = tokenize("add nope").unwrap();
        assert!(matches!(
            describe(&mut stream, &tree),
            Err(DispatchError::UnknownBranch { .. })
        ));
    }
}
