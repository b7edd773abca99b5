//! Account display formatting

use crate::storage::Property;

/// Format a list of account names
pub fn format_account_list(names: &[String]) -> String {
    if names.is_empty() {
        return "No accounts found.".to_string();
    }

    let mut output = String::from("Accounts:");
    for name in names {
        output.push_str("\n    ");
        output.push_str(name);
    }
    output
}

/// Format one property as `name = value`
pub fn format_property(property: &Property) -> String {
    format!("{} = {}", property.name_lossy(), property.value_lossy())
}
