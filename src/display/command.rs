//! Command tree display formatting
//!
//! Formats option listings, the full command tree and caret markers under
//! the offending position of an input line.

use crate::command::{dependency, Node};

/// Name of a branch followed by its dependency hint, if it has one
fn branch_label(node: &Node) -> String {
    match dependency(node.name) {
        Some(dep) => format!("{} {}", node.name, dep.hint),
        None => node.name.to_string(),
    }
}

/// Format the children of `node` as a list of alternatives
pub fn format_options(node: &Node) -> String {
    let children = node.children();
    if children.is_empty() {
        return String::new();
    }

    let labels: Vec<String> = children.iter().map(branch_label).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut output = String::from("Possible options are:");
    for (label, child) in labels.iter().zip(children) {
        output.push_str(&format!(
            "\n    {:<width$}  {}",
            label,
            child.description,
            width = width
        ));
    }
    output
}

/// Format every command reachable from `root`
///
/// Siblings go on their own line, indented with one ` |` per level; an only
/// child continues the line of its parent.
pub fn format_tree(root: &Node) -> String {
    let mut output = String::new();
    write_subtree(&mut output, root, 0);
    output.trim_start_matches('\n').to_string()
}

fn write_subtree(output: &mut String, node: &Node, depth: usize) {
    let children = node.children();
    for child in children {
        if children.len() == 1 {
            output.push(' ');
        } else {
            output.push('\n');
            output.push_str(&" |".repeat(depth));
        }
        output.push_str(&branch_label(child));

        if child.is_interior() {
            write_subtree(output, child, depth + 1);
        } else {
            output.push_str(" - ");
            output.push_str(child.description);
        }
    }
}

/// Format `line` with a caret under byte `offset`
pub fn format_caret(line: &str, offset: usize) -> String {
    let column = line
        .get(..offset)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(offset);
    format!("{}\n{}^", line, " ".repeat(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandTree;

    #[test]
    fn test_options_show_dependency_hints() {
        let root = CommandTree::standard().root();
        let add = root.child("add").unwrap();

        let output = format_options(add);
        assert!(output.starts_with("Possible options are:"));
        assert!(output.contains("account name(word)"));
        assert!(output.contains("add a property to an account"));
    }

    #[test]
    fn test_options_of_leaf_are_empty() {
        let root = CommandTree::standard().root();
        assert_eq!(format_options(root.child("tree").unwrap()), "");
    }

    #[test]
    fn test_tree_layout() {
        let output = format_tree(CommandTree::standard().root());

        assert!(output.starts_with("help - shows help"));
        assert!(output.contains(
            "\n |property name(word) account name(word) value value(string|number) - "
        ));
        assert!(output.contains("\nlist accounts - lists all accounts"));
        assert!(output.contains("\n |backup - shows every entry of the journal"));
    }

    #[test]
    fn test_caret_position() {
        assert_eq!(format_caret("add \"x", 4), "add \"x\n    ^");
        assert_eq!(format_caret("é $", 3), "é $\n  ^");
    }
}
