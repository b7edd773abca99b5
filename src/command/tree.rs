//! Static command tree and dependency descriptors
//!
//! The grammar is a forest of [`Node`]s declared as `static` tables. A node is
//! either an interior branch, a leaf bound to an [`Action`], or a special node
//! that takes over the rest of the token stream. Names that need an argument
//! are listed in [`DEPENDENCIES`], keyed by name only, so the same label asks
//! for the same token kind wherever it appears in the tree.

use crate::error::{PwmgrError, PwmgrResult};
use crate::lexer::TokenKind;

/// Operations a leaf node can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddAccount,
    AddProperty,
    RemoveAccount,
    RemoveProperty,
    ShowAccount,
    ShowJournal,
    ListAccounts,
    Tree,
    Clear,
    Quit,
}

impl Action {
    /// Whether the action writes to the store (and therefore the journal)
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddAccount | Self::AddProperty | Self::RemoveAccount | Self::RemoveProperty
        )
    }
}

/// Handlers that receive the unconsumed token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub enum NodeKind {
    Interior(&'static [Node]),
    Leaf(Action),
    Special(Special),
}

/// One branch of the command tree
#[derive(Debug, PartialEq, Eq)]
pub struct Node {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: NodeKind,
}

impl Node {
    pub const fn interior(
        name: &'static str,
        description: &'static str,
        children: &'static [Node],
    ) -> Self {
        Self {
            name,
            description,
            kind: NodeKind::Interior(children),
        }
    }

    pub const fn leaf(name: &'static str, description: &'static str, action: Action) -> Self {
        Self {
            name,
            description,
            kind: NodeKind::Leaf(action),
        }
    }

    pub const fn special(
        name: &'static str,
        description: &'static str,
        special: Special,
    ) -> Self {
        Self {
            name,
            description,
            kind: NodeKind::Special(special),
        }
    }

    /// Children of an interior node; empty for leaves and special nodes
    pub fn children(&self) -> &[Node] {
        match self.kind {
            NodeKind::Interior(children) => children,
            NodeKind::Leaf(_) | NodeKind::Special(_) => &[],
        }
    }

    /// Child whose name matches `name` exactly
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().iter().find(|child| child.name == name)
    }

    pub fn is_interior(&self) -> bool {
        matches!(self.kind, NodeKind::Interior(_))
    }

    /// The root is the only node without a name
    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }
}

/// Token kinds that must directly follow a command name
#[derive(Debug, PartialEq, Eq)]
pub struct Dependency {
    pub name: &'static str,
    pub accepts: &'static [TokenKind],
    /// Short form shown next to the name in listings
    pub hint: &'static str,
    /// Phrase used in "Expected ... after" diagnostics
    pub expected: &'static str,
}

impl Dependency {
    pub fn accepts(&self, kind: TokenKind) -> bool {
        self.accepts.contains(&kind)
    }
}

pub static DEPENDENCIES: &[Dependency] = &[
    Dependency {
        name: "account",
        accepts: &[TokenKind::Word, TokenKind::Number],
        hint: "name(word)",
        expected: "an account name (word)",
    },
    Dependency {
        name: "property",
        accepts: &[TokenKind::Word, TokenKind::Number],
        hint: "name(word)",
        expected: "a property name (word)",
    },
    Dependency {
        name: "value",
        accepts: &[TokenKind::String, TokenKind::Number],
        hint: "value(string|number)",
        expected: "a value (string or number)",
    },
];

/// Dependency descriptor for a node name
pub fn dependency(name: &str) -> Option<&'static Dependency> {
    DEPENDENCIES.iter().find(|dep| dep.name == name)
}

static ADD_PROPERTY_ACCOUNT: [Node; 1] = [Node::leaf(
    "value",
    "set the value of the new property",
    Action::AddProperty,
)];

static ADD_PROPERTY: [Node; 1] = [Node::interior(
    "account",
    "choose the account that receives the property",
    &ADD_PROPERTY_ACCOUNT,
)];

static ADD: [Node; 2] = [
    Node::leaf("account", "add an account", Action::AddAccount),
    Node::interior("property", "add a property to an account", &ADD_PROPERTY),
];

static REMOVE_PROPERTY: [Node; 1] = [Node::leaf(
    "account",
    "choose an account to remove the property from",
    Action::RemoveProperty,
)];

static REMOVE: [Node; 2] = [
    Node::leaf(
        "account",
        "remove an account from the list of accounts",
        Action::RemoveAccount,
    ),
    Node::interior(
        "property",
        "remove a property from an account",
        &REMOVE_PROPERTY,
    ),
];

static LIST: [Node; 1] = [Node::leaf(
    "accounts",
    "lists all accounts",
    Action::ListAccounts,
)];

static ACCOUNT: [Node; 1] = [Node::leaf(
    "show",
    "shows data of given account",
    Action::ShowAccount,
)];

static INFO: [Node; 2] = [
    Node::leaf("account", "shows data of given account", Action::ShowAccount),
    Node::leaf("backup", "shows every entry of the journal", Action::ShowJournal),
];

static TOP_LEVEL: [Node; 10] = [
    Node::special("help", "shows help for a specific command", Special::Help),
    Node::interior("add", "add an account or a property", &ADD),
    Node::interior("remove", "remove an account or a property", &REMOVE),
    Node::interior("list", "shows a specific list", &LIST),
    Node::leaf("tree", "shows a tree view of all commands", Action::Tree),
    Node::interior("account", "access account file", &ACCOUNT),
    Node::interior("info", "show an account or the journal", &INFO),
    Node::leaf("clear", "clears the screen", Action::Clear),
    Node::leaf("quit", "quit the program", Action::Quit),
    Node::leaf("exit", "exit the program (same as quit)", Action::Quit),
];

static ROOT: Node = Node::interior("", "", &TOP_LEVEL);

/// Read-only handle on a command tree
#[derive(Debug, Clone, Copy)]
pub struct CommandTree {
    root: &'static Node,
}

impl CommandTree {
    /// Tree over an arbitrary static root
    pub fn new(root: &'static Node) -> Self {
        Self { root }
    }

    /// The grammar of the interactive shell
    pub fn standard() -> Self {
        Self::new(&ROOT)
    }

    pub fn root(&self) -> &'static Node {
        self.root
    }

    /// Check that no interior node has two children with the same name
    pub fn validate(&self) -> PwmgrResult<()> {
        fn check(node: &Node) -> PwmgrResult<()> {
            let children = node.children();
            for (i, child) in children.iter().enumerate() {
                if child.name.is_empty() {
                    return Err(PwmgrError::Validation(format!(
                        "Branch '{}' has a child without a name",
                        node.name
                    )));
                }
                if children[..i].iter().any(|other| other.name == child.name) {
                    return Err(PwmgrError::Validation(format!(
                        "Branch '{}' has more than one option named '{}'",
                        node.name, child.name
                    )));
                }
                check(child)?;
            }
            Ok(())
        }

        check(self.root)
    }
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::standard()
    }
}
