//! The schema collection and its index-path operations.
//!
//! An index path lists child positions starting below the root group: `[]`
//! is the root, `[0]` its first child, `[0, 2]` the third child of that.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::naming::unique_name;
use crate::node::{FieldType, KindTag, NodeId, SchemaNode};

const NEW_NODE_NAME: &str = "new_node";

/// A visible row of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub id: NodeId,
    pub path: Vec<usize>,
    pub depth: usize,
    pub name: String,
    pub tag: KindTag,
    pub field_type: Option<FieldType>,
    pub has_children: bool,
    pub expanded: bool,
}

/// A schema: one root group plus an id allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    root: SchemaNode,
    next_id: u64,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Create a schema with an empty root group.
    pub fn new() -> Self {
        Self {
            root: SchemaNode::group(NodeId::ROOT, "Root"),
            next_id: 1,
        }
    }

    /// Allocate a fresh node id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Build a group with a fresh id.
    pub fn group(&mut self, name: &str) -> SchemaNode {
        SchemaNode::group(self.next_id(), name)
    }

    /// Build a list with a fresh id.
    pub fn list(&mut self, name: &str) -> SchemaNode {
        SchemaNode::list(self.next_id(), name)
    }

    /// Build a field with a fresh id.
    pub fn field(&mut self, name: &str, field_type: FieldType) -> SchemaNode {
        SchemaNode::field(self.next_id(), name, field_type)
    }

    /// The root group.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        self.root.subtree_len() - 1
    }

    /// Whether the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    /// The node at `path`.
    pub fn node_at(&self, path: &[usize]) -> Option<&SchemaNode> {
        path.iter()
            .try_fold(&self.root, |node, &i| node.children().get(i))
    }

    fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut SchemaNode> {
        let mut node = &mut self.root;
        for &i in path {
            node = node.children_mut()?.get_mut(i)?;
        }
        Some(node)
    }

    /// The node with `id`.
    pub fn find(&self, id: NodeId) -> Option<&SchemaNode> {
        self.index_path(id).and_then(|p| self.node_at(&p))
    }

    /// The index path of the node with `id`.
    pub fn index_path(&self, id: NodeId) -> Option<Vec<usize>> {
        fn search(node: &SchemaNode, id: NodeId, path: &mut Vec<usize>) -> bool {
            if node.id == id {
                return true;
            }
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                if search(child, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.root, id, &mut path).then_some(path)
    }

    /// The parent of the node with `id`. The root has none.
    pub fn parent_of(&self, id: NodeId) -> Option<&SchemaNode> {
        let path = self.index_path(id)?;
        let (_, parent) = path.split_last()?;
        self.node_at(parent)
    }

    /// Insert `node` as the previous sibling of the node at `path`.
    pub fn insert_before(
        &mut self,
        path: &[usize],
        node: SchemaNode,
    ) -> Result<Vec<usize>, SchemaError> {
        let (&index, parent) = path.split_last().ok_or(SchemaError::EmptyPath)?;
        self.insert_at(parent, index, node)
    }

    /// Insert `node` as the next sibling of the node at `path`.
    pub fn insert_after(
        &mut self,
        path: &[usize],
        node: SchemaNode,
    ) -> Result<Vec<usize>, SchemaError> {
        let (&index, parent) = path.split_last().ok_or(SchemaError::EmptyPath)?;
        self.insert_at(parent, index + 1, node)
    }

    /// Append `node` as the last child of the container at `path`.
    pub fn insert_within(
        &mut self,
        path: &[usize],
        node: SchemaNode,
    ) -> Result<Vec<usize>, SchemaError> {
        let len = self
            .node_at(path)
            .ok_or_else(|| SchemaError::InvalidPath(path.to_vec()))?
            .children()
            .len();
        self.insert_at(path, len, node)
    }

    /// Append `node` to the root group.
    pub fn push_root(&mut self, node: SchemaNode) -> Vec<usize> {
        let index = self.root.children().len();
        tracing::debug!(id = %node.id, name = %node.name, "node added at root");
        if let Some(children) = self.root.children_mut() {
            children.push(node);
        }
        vec![index]
    }

    fn insert_at(
        &mut self,
        parent_path: &[usize],
        index: usize,
        node: SchemaNode,
    ) -> Result<Vec<usize>, SchemaError> {
        let mut full = parent_path.to_vec();
        full.push(index);

        let parent = self
            .node_at_mut(parent_path)
            .ok_or_else(|| SchemaError::InvalidPath(parent_path.to_vec()))?;
        let children = parent
            .children_mut()
            .ok_or_else(|| SchemaError::NotAContainer(parent_path.to_vec()))?;
        if index > children.len() {
            return Err(SchemaError::InvalidPath(full));
        }

        tracing::debug!(id = %node.id, name = %node.name, path = ?full, "node inserted");
        children.insert(index, node);
        Ok(full)
    }

    /// Replace the node at `path`, returning the old node.
    pub fn replace(&mut self, path: &[usize], node: SchemaNode) -> Result<SchemaNode, SchemaError> {
        if path.is_empty() {
            return Err(SchemaError::RootImmutable);
        }
        let slot = self
            .node_at_mut(path)
            .ok_or_else(|| SchemaError::InvalidPath(path.to_vec()))?;
        tracing::debug!(id = %node.id, name = %node.name, path = ?path, "node replaced");
        Ok(std::mem::replace(slot, node))
    }

    /// Replace the node at `path` after giving it a name unique among its
    /// siblings. Returns the name actually stored.
    pub fn save(&mut self, path: &[usize], mut node: SchemaNode) -> Result<String, SchemaError> {
        let (_, parent_path) = path.split_last().ok_or(SchemaError::RootImmutable)?;
        let siblings = self
            .node_at(parent_path)
            .ok_or_else(|| SchemaError::InvalidPath(parent_path.to_vec()))?
            .children();
        node.name = unique_name(&node.name, Some(node.id), siblings);
        let name = node.name.clone();
        self.replace(path, node)?;
        Ok(name)
    }

    /// Remove the node with `id` and its subtree.
    pub fn delete(&mut self, id: NodeId) -> Result<SchemaNode, SchemaError> {
        if id == NodeId::ROOT {
            return Err(SchemaError::RootImmutable);
        }
        let path = self.index_path(id).ok_or(SchemaError::NotFound(id))?;
        let (&index, parent_path) = path.split_last().ok_or(SchemaError::RootImmutable)?;
        let children = self
            .node_at_mut(parent_path)
            .and_then(SchemaNode::children_mut)
            .ok_or(SchemaError::NotFound(id))?;
        let removed = children.remove(index);
        tracing::debug!(id = %id, removed = removed.subtree_len(), "node deleted");
        Ok(removed)
    }

    /// Build a fresh field named uniquely among the children of the
    /// container at `parent_path`.
    pub fn new_node(&mut self, parent_path: &[usize]) -> Result<SchemaNode, SchemaError> {
        let parent = self
            .node_at(parent_path)
            .ok_or_else(|| SchemaError::InvalidPath(parent_path.to_vec()))?;
        if !parent.is_container() {
            return Err(SchemaError::NotAContainer(parent_path.to_vec()));
        }
        let name = unique_name(NEW_NODE_NAME, None, parent.children());
        Ok(SchemaNode::field(self.next_id(), name, FieldType::String))
    }

    /// Add a fresh node as the previous sibling of `id`.
    pub fn add_before(&mut self, id: NodeId) -> Result<Vec<usize>, SchemaError> {
        let path = self.index_path(id).ok_or(SchemaError::NotFound(id))?;
        let (_, parent) = path.split_last().ok_or(SchemaError::EmptyPath)?;
        let node = self.new_node(parent)?;
        self.insert_before(&path, node)
    }

    /// Add a fresh node as the next sibling of `id`.
    pub fn add_after(&mut self, id: NodeId) -> Result<Vec<usize>, SchemaError> {
        let path = self.index_path(id).ok_or(SchemaError::NotFound(id))?;
        let (_, parent) = path.split_last().ok_or(SchemaError::EmptyPath)?;
        let node = self.new_node(parent)?;
        self.insert_after(&path, node)
    }

    /// Add a fresh node as the last child of container `id`.
    pub fn add_within(&mut self, id: NodeId) -> Result<Vec<usize>, SchemaError> {
        let path = self.index_path(id).ok_or(SchemaError::NotFound(id))?;
        let node = self.new_node(&path)?;
        self.insert_within(&path, node)
    }

    /// Add a fresh node at the end of the root group.
    pub fn add_at_root(&mut self) -> Vec<usize> {
        let name = unique_name(NEW_NODE_NAME, None, self.root.children());
        let node = SchemaNode::field(self.next_id(), name, FieldType::String);
        self.push_root(node)
    }

    /// Depth-first list of visible rows. Children of a container are listed
    /// only when its id is in `expanded`. The root itself is not listed.
    pub fn flatten(&self, expanded: &HashSet<NodeId>) -> Vec<FlatNode> {
        fn walk(
            node: &SchemaNode,
            path: &mut Vec<usize>,
            expanded: &HashSet<NodeId>,
            out: &mut Vec<FlatNode>,
        ) {
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                let open = expanded.contains(&child.id);
                out.push(FlatNode {
                    id: child.id,
                    path: path.clone(),
                    depth: path.len() - 1,
                    name: child.name.clone(),
                    tag: child.tag(),
                    field_type: child.field_type(),
                    has_children: !child.children().is_empty(),
                    expanded: open,
                });
                if open {
                    walk(child, path, expanded, out);
                }
                path.pop();
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut Vec::new(), expanded, &mut out);
        out
    }

    /// Ids of every container, for "expand all".
    pub fn container_ids(&self) -> HashSet<NodeId> {
        fn collect(node: &SchemaNode, out: &mut HashSet<NodeId>) {
            if node.is_container() {
                out.insert(node.id);
            }
            node.children().iter().for_each(|c| collect(c, out));
        }
        let mut out = HashSet::new();
        collect(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root
    /// ├── customer (group)
    /// │   ├── name (string)
    /// │   └── email (string)
    /// ├── items (list)
    /// │   └── sku (number)
    /// └── issued (date)
    fn sample() -> Schema {
        let mut schema = Schema::new();
        let name = schema.field("name", FieldType::String);
        let email = schema.field("email", FieldType::String);
        let customer = schema.group("customer").with_child(name).with_child(email);
        let sku = schema.field("sku", FieldType::Number);
        let items = schema.list("items").with_child(sku);
        let issued = schema.field("issued", FieldType::Date);
        schema.push_root(customer);
        schema.push_root(items);
        schema.push_root(issued);
        schema
    }

    fn id_of(schema: &Schema, path: &[usize]) -> NodeId {
        schema.node_at(path).unwrap().id
    }

    #[test]
    fn node_at_and_index_path_agree() {
        let schema = sample();
        assert_eq!(schema.len(), 6);
        let email = id_of(&schema, &[0, 1]);
        assert_eq!(schema.node_at(&[0, 1]).unwrap().name, "email");
        assert_eq!(schema.index_path(email), Some(vec![0, 1]));
        assert_eq!(schema.index_path(NodeId::ROOT), Some(vec![]));
        assert_eq!(schema.index_path(NodeId(999)), None);
        assert!(schema.node_at(&[2, 0]).is_none());
    }

    #[test]
    fn parent_lookup() {
        let schema = sample();
        let sku = id_of(&schema, &[1, 0]);
        assert_eq!(schema.parent_of(sku).unwrap().name, "items");
        assert_eq!(schema.parent_of(id_of(&schema, &[2])).unwrap().id, NodeId::ROOT);
        assert!(schema.parent_of(NodeId::ROOT).is_none());
    }

    #[test]
    fn insert_before_and_after() {
        let mut schema = sample();
        let a = schema.field("a", FieldType::String);
        let b = schema.field("b", FieldType::String);
        assert_eq!(schema.insert_before(&[0, 1], a).unwrap(), vec![0, 1]);
        assert_eq!(schema.insert_after(&[0, 0], b).unwrap(), vec![0, 1]);
        let names: Vec<_> = schema
            .node_at(&[0])
            .unwrap()
            .children()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, ["name", "b", "a", "email"]);
    }

    #[test]
    fn insert_after_last_sibling_appends() {
        let mut schema = sample();
        let node = schema.field("total", FieldType::Number);
        assert_eq!(schema.insert_after(&[2], node).unwrap(), vec![3]);
        assert_eq!(schema.node_at(&[3]).unwrap().name, "total");
    }

    #[test]
    fn insert_within_appends_child() {
        let mut schema = sample();
        let node = schema.field("qty", FieldType::Number);
        assert_eq!(schema.insert_within(&[1], node).unwrap(), vec![1, 1]);
    }

    #[test]
    fn insert_into_field_is_rejected() {
        let mut schema = sample();
        let node = schema.field("x", FieldType::String);
        assert_eq!(
            schema.insert_within(&[2], node.clone()),
            Err(SchemaError::NotAContainer(vec![2]))
        );
        assert_eq!(
            schema.insert_before(&[5, 0], node.clone()),
            Err(SchemaError::InvalidPath(vec![5]))
        );
        assert_eq!(schema.insert_before(&[], node), Err(SchemaError::EmptyPath));
    }

    #[test]
    fn replace_returns_old_node() {
        let mut schema = sample();
        let id = id_of(&schema, &[2]);
        let renamed = SchemaNode::field(id, "issued_at", FieldType::Date);
        let old = schema.replace(&[2], renamed).unwrap();
        assert_eq!(old.name, "issued");
        assert_eq!(schema.node_at(&[2]).unwrap().name, "issued_at");
        assert_eq!(
            schema.replace(&[], SchemaNode::group(NodeId::ROOT, "x")),
            Err(SchemaError::RootImmutable)
        );
    }

    #[test]
    fn save_makes_name_unique() {
        let mut schema = sample();
        let mut edited = schema.node_at(&[0, 1]).unwrap().clone();
        edited.name = "name".into();
        assert_eq!(schema.save(&[0, 1], edited).unwrap(), "name_2");

        let unchanged = schema.node_at(&[0, 0]).unwrap().clone();
        assert_eq!(schema.save(&[0, 0], unchanged).unwrap(), "name");
    }

    #[test]
    fn delete_removes_subtree() {
        let mut schema = sample();
        let customer = id_of(&schema, &[0]);
        let removed = schema.delete(customer).unwrap();
        assert_eq!(removed.subtree_len(), 3);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.node_at(&[0]).unwrap().name, "items");
        assert_eq!(schema.delete(customer), Err(SchemaError::NotFound(customer)));
        assert_eq!(schema.delete(NodeId::ROOT), Err(SchemaError::RootImmutable));
    }

    #[test]
    fn new_nodes_get_unique_names_and_ids() {
        let mut schema = sample();
        let first = schema.add_at_root();
        let second = schema.add_at_root();
        assert_eq!(schema.node_at(&first).unwrap().name, "new_node");
        assert_eq!(schema.node_at(&second).unwrap().name, "new_node_2");
        assert_ne!(id_of(&schema, &first), id_of(&schema, &second));
    }

    #[test]
    fn add_relative_to_node() {
        let mut schema = sample();
        let email = id_of(&schema, &[0, 1]);
        let items = id_of(&schema, &[1]);
        assert_eq!(schema.add_before(email).unwrap(), vec![0, 1]);
        assert_eq!(schema.add_after(email).unwrap(), vec![0, 3]);
        assert_eq!(schema.add_within(items).unwrap(), vec![1, 1]);
        assert_eq!(schema.node_at(&[0, 3]).unwrap().name, "new_node_2");

        let issued = id_of(&schema, &[2]);
        assert_eq!(schema.add_within(issued), Err(SchemaError::NotAContainer(vec![2])));
    }

    #[test]
    fn flatten_respects_expansion() {
        let schema = sample();
        let collapsed = schema.flatten(&HashSet::new());
        assert_eq!(collapsed.len(), 3);
        assert!(collapsed[0].has_children);
        assert!(!collapsed[0].expanded);

        let all = schema.flatten(&schema.container_ids());
        let rows: Vec<_> = all.iter().map(|r| (r.name.as_str(), r.depth)).collect();
        assert_eq!(
            rows,
            [
                ("customer", 0),
                ("name", 1),
                ("email", 1),
                ("items", 0),
                ("sku", 1),
                ("issued", 0)
            ]
        );
        assert_eq!(all[4].path, vec![1, 0]);
    }
}
