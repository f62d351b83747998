//! Sibling-unique node names.

use crate::node::{NodeId, SchemaNode};

/// Return `name`, or `name_2`, `name_3`, ... so that no sibling other than
/// `exclude` already uses it.
///
/// A blank name falls back to `new_node`.
pub fn unique_name(name: &str, exclude: Option<NodeId>, siblings: &[SchemaNode]) -> String {
    let base = match name.trim() {
        "" => "new_node",
        trimmed => trimmed,
    };
    let taken = |candidate: &str| {
        siblings
            .iter()
            .any(|s| Some(s.id) != exclude && s.name == candidate)
    };

    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FieldType;

    fn siblings(names: &[&str]) -> Vec<SchemaNode> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| SchemaNode::field(NodeId(i as u64 + 1), *n, FieldType::String))
            .collect()
    }

    #[test]
    fn free_name_is_kept() {
        assert_eq!(unique_name("email", None, &siblings(&["name"])), "email");
    }

    #[test]
    fn collision_gets_suffix() {
        let s = siblings(&["email", "email_2"]);
        assert_eq!(unique_name("email", None, &s), "email_3");
    }

    #[test]
    fn own_name_does_not_collide() {
        let s = siblings(&["email", "phone"]);
        assert_eq!(unique_name("email", Some(NodeId(1)), &s), "email");
        assert_eq!(unique_name("phone", Some(NodeId(1)), &s), "phone_2");
    }

    #[test]
    fn blank_name_falls_back() {
        assert_eq!(unique_name("  ", None, &[]), "new_node");
    }
}
