//! Schema node types.

use std::fmt;

/// Stable identity of a node, unique within one [`Schema`](crate::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The id of every schema's root group.
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == NodeId::ROOT {
            f.write_str("root")
        } else {
            write!(f, "node-{}", self.0)
        }
    }
}

/// Scalar type of a field node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldType {
    #[default]
    String,
    Date,
    Number,
}

impl FieldType {
    pub const ALL: [FieldType; 3] = [FieldType::String, FieldType::Date, FieldType::Number];

    /// Lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Number => "number",
        }
    }

    /// The next type in [`FieldType::ALL`], wrapping.
    pub fn cycle(self) -> Self {
        match self {
            FieldType::String => FieldType::Date,
            FieldType::Date => FieldType::Number,
            FieldType::Number => FieldType::String,
        }
    }
}

/// What a node is, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Group,
    List,
    Field,
}

impl KindTag {
    /// Lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            KindTag::Group => "group",
            KindTag::List => "list",
            KindTag::Field => "field",
        }
    }

    /// The next kind, wrapping group -> list -> field.
    pub fn cycle(self) -> Self {
        match self {
            KindTag::Group => KindTag::List,
            KindTag::List => KindTag::Field,
            KindTag::Field => KindTag::Group,
        }
    }
}

/// A node's kind and, for containers, its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A named group of heterogeneous children.
    Group(Vec<SchemaNode>),
    /// A repeated structure whose children describe one item.
    List(Vec<SchemaNode>),
    /// A leaf value.
    Field(FieldType),
}

/// One node in a schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Create an empty group.
    pub fn group(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Group(Vec::new()),
        }
    }

    /// Create an empty list.
    pub fn list(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::List(Vec::new()),
        }
    }

    /// Create a field.
    pub fn field(id: NodeId, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Field(field_type),
        }
    }

    /// Append `child` and return `self`. Ignored for fields.
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    /// The node's kind without payload.
    pub fn tag(&self) -> KindTag {
        match self.kind {
            NodeKind::Group(_) => KindTag::Group,
            NodeKind::List(_) => KindTag::List,
            NodeKind::Field(_) => KindTag::Field,
        }
    }

    /// The field type, for field nodes.
    pub fn field_type(&self) -> Option<FieldType> {
        match self.kind {
            NodeKind::Field(t) => Some(t),
            _ => None,
        }
    }

    /// Whether the node can hold children.
    pub fn is_container(&self) -> bool {
        !matches!(self.kind, NodeKind::Field(_))
    }

    /// Children, empty for fields.
    pub fn children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Group(c) | NodeKind::List(c) => c,
            NodeKind::Field(_) => &[],
        }
    }

    /// Mutable children, `None` for fields.
    pub fn children_mut(&mut self) -> Option<&mut Vec<SchemaNode>> {
        match &mut self.kind {
            NodeKind::Group(c) | NodeKind::List(c) => Some(c),
            NodeKind::Field(_) => None,
        }
    }

    /// Change the node's kind.
    ///
    /// Switching between group and list keeps the children. Switching to a
    /// field drops them and starts as a string; a field becoming a container
    /// starts empty.
    pub fn set_kind(&mut self, tag: KindTag) {
        if tag == self.tag() {
            return;
        }
        let children = match &mut self.kind {
            NodeKind::Group(c) | NodeKind::List(c) => std::mem::take(c),
            NodeKind::Field(_) => Vec::new(),
        };
        self.kind = match tag {
            KindTag::Group => NodeKind::Group(children),
            KindTag::List => NodeKind::List(children),
            KindTag::Field => NodeKind::Field(FieldType::String),
        };
    }

    /// Set the field type. Ignored for containers.
    pub fn set_field_type(&mut self, field_type: FieldType) {
        if let NodeKind::Field(t) = &mut self.kind {
            *t = field_type;
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(SchemaNode::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_id_displays_as_root() {
        assert_eq!(NodeId::ROOT.to_string(), "root");
        assert_eq!(NodeId(7).to_string(), "node-7");
    }

    #[test]
    fn group_to_list_keeps_children() {
        let mut node = SchemaNode::group(NodeId(1), "address")
            .with_child(SchemaNode::field(NodeId(2), "street", FieldType::String));
        node.set_kind(KindTag::List);
        assert_eq!(node.tag(), KindTag::List);
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn container_to_field_drops_children() {
        let mut node = SchemaNode::list(NodeId(1), "items")
            .with_child(SchemaNode::field(NodeId(2), "sku", FieldType::Number));
        node.set_kind(KindTag::Field);
        assert_eq!(node.field_type(), Some(FieldType::String));
        assert!(node.children().is_empty());
        assert!(node.children_mut().is_none());
    }

    #[test]
    fn field_to_group_starts_empty() {
        let mut node = SchemaNode::field(NodeId(1), "total", FieldType::Number);
        node.set_kind(KindTag::Group);
        assert!(node.is_container());
        assert!(node.children().is_empty());
    }

    #[test]
    fn field_ignores_children() {
        let node = SchemaNode::field(NodeId(1), "x", FieldType::Date)
            .with_child(SchemaNode::field(NodeId(2), "y", FieldType::Date));
        assert_eq!(node.subtree_len(), 1);
    }

    #[test]
    fn cycles_wrap() {
        assert_eq!(KindTag::Field.cycle(), KindTag::Group);
        assert_eq!(FieldType::Number.cycle(), FieldType::String);
    }
}
