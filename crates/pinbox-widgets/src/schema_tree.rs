//! Expandable tree view over a [`Schema`], with the editing operations the
//! schema builder needs.
//!
//! The tree owns the schema. Every mutation goes through a method here so the
//! flattened rows and the selection stay in step with the data.

use crate::chrome::focus_block;
use crate::key::{Binding, KeyCombination, KeyMap};
use pinbox_core::{Command, Component};
use pinbox_schema::{FlatNode, KindTag, NodeId, Schema, SchemaError, SchemaNode};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::cell::Cell;
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

/// Messages for the schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press while the tree has focus.
    KeyPress(KeyEvent),
    /// Emitted when the selection moves to a node.
    Selected(NodeId),
    /// Emitted when the user asks for the node's action menu.
    MenuRequested {
        /// The selected node.
        id: NodeId,
        /// Whether "add within" applies.
        is_container: bool,
        /// Screen position just right of the node's label.
        anchor: Position,
    },
    /// Emitted when the user asks for a new node at the root.
    AddRootRequested,
}

/// Key bindings for [`SchemaTree`].
#[derive(Debug, Clone)]
pub struct TreeKeyBindings {
    /// Move selection up.
    pub up: Binding,
    /// Move selection down.
    pub down: Binding,
    /// Collapse the node, or jump to its parent.
    pub collapse: Binding,
    /// Expand the node.
    pub expand: Binding,
    /// Toggle expansion.
    pub toggle: Binding,
    /// Open the action menu.
    pub menu: Binding,
    /// Add a node at the root.
    pub add_root: Binding,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self {
            up: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Up),
                    KeyCombination::new(KeyCode::Char('k')),
                ],
                "up",
            ),
            down: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Down),
                    KeyCombination::new(KeyCode::Char('j')),
                ],
                "down",
            ),
            collapse: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Left),
                    KeyCombination::new(KeyCode::Char('h')),
                ],
                "collapse",
            ),
            expand: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Right),
                    KeyCombination::new(KeyCode::Char('l')),
                ],
                "expand",
            ),
            toggle: Binding::new(KeyCombination::new(KeyCode::Char(' ')), "toggle"),
            menu: Binding::new(KeyCombination::new(KeyCode::Enter), "actions"),
            add_root: Binding::new(KeyCombination::new(KeyCode::Char('n')), "new node"),
        }
    }
}

/// Tree view and owner of a [`Schema`].
pub struct SchemaTree {
    schema: Schema,
    expanded: HashSet<NodeId>,
    rows: Vec<FlatNode>,
    selected: usize,
    offset: Cell<usize>,
    last_area: Cell<Rect>,
    focus: bool,
    keys: TreeKeyBindings,
}

impl SchemaTree {
    /// Show `schema` with every container expanded.
    pub fn new(schema: Schema) -> Self {
        let expanded = schema.container_ids();
        let mut tree = Self {
            schema,
            expanded,
            rows: Vec::new(),
            selected: 0,
            offset: Cell::new(0),
            last_area: Cell::new(Rect::default()),
            focus: false,
            keys: TreeKeyBindings::default(),
        };
        tree.refresh();
        tree
    }

    /// Replace the key bindings.
    pub fn with_keys(mut self, keys: TreeKeyBindings) -> Self {
        self.keys = keys;
        self
    }

    /// Give the tree keyboard focus.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    /// The schema being shown.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Visible rows, top to bottom.
    pub fn rows(&self) -> &[FlatNode] {
        &self.rows
    }

    /// The selected row.
    pub fn selected_row(&self) -> Option<&FlatNode> {
        self.rows.get(self.selected)
    }

    /// The selected node's id.
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selected_row().map(|row| row.id)
    }

    /// Whether `id` is expanded.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Select `id`, expanding its ancestors so it is visible.
    pub fn select(&mut self, id: NodeId) -> bool {
        let Some(path) = self.schema.index_path(id) else {
            return false;
        };
        for depth in 1..path.len() {
            if let Some(ancestor) = self.schema.node_at(&path[..depth]) {
                self.expanded.insert(ancestor.id);
            }
        }
        self.refresh();
        match self.rows.iter().position(|row| row.id == id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Add a fresh node before `id` and select it.
    pub fn add_above(&mut self, id: NodeId) -> Result<NodeId, SchemaError> {
        let path = self.schema.add_before(id)?;
        self.select_path(&path)
    }

    /// Add a fresh node after `id` and select it.
    pub fn add_below(&mut self, id: NodeId) -> Result<NodeId, SchemaError> {
        let path = self.schema.add_after(id)?;
        self.select_path(&path)
    }

    /// Add a fresh node as the last child of `id` and select it.
    pub fn add_within(&mut self, id: NodeId) -> Result<NodeId, SchemaError> {
        let path = self.schema.add_within(id)?;
        self.expanded.insert(id);
        self.select_path(&path)
    }

    /// Add a fresh node at the end of the root group and select it.
    pub fn add_root(&mut self) -> Result<NodeId, SchemaError> {
        let path = self.schema.add_at_root();
        self.select_path(&path)
    }

    /// Delete `id` and its subtree. The selection stays on the same row
    /// index, clamped to the shorter list.
    pub fn delete(&mut self, id: NodeId) -> Result<SchemaNode, SchemaError> {
        let removed = self.schema.delete(id)?;
        self.expanded.remove(&id);
        self.refresh();
        Ok(removed)
    }

    /// Store an edited node at `path` under a sibling-unique name. Returns
    /// the name actually stored.
    pub fn save(&mut self, path: &[usize], node: SchemaNode) -> Result<String, SchemaError> {
        let id = node.id;
        let is_container = node.is_container();
        let name = self.schema.save(path, node)?;
        if is_container {
            self.expanded.insert(id);
        } else {
            self.expanded.remove(&id);
        }
        self.select(id);
        Ok(name)
    }

    fn select_path(&mut self, path: &[usize]) -> Result<NodeId, SchemaError> {
        let id = self
            .schema
            .node_at(path)
            .map(|node| node.id)
            .ok_or_else(|| SchemaError::InvalidPath(path.to_vec()))?;
        self.select(id);
        Ok(id)
    }

    fn refresh(&mut self) {
        self.rows = self.schema.flatten(&self.expanded);
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    fn move_to(&mut self, index: usize) -> Command<Message> {
        if index == self.selected || index >= self.rows.len() {
            return Command::none();
        }
        self.selected = index;
        Command::message(Message::Selected(self.rows[index].id))
    }

    fn set_expanded(&mut self, id: NodeId, open: bool) {
        let changed = if open {
            self.expanded.insert(id)
        } else {
            self.expanded.remove(&id)
        };
        if changed {
            self.refresh();
        }
    }

    fn collapse_or_parent(&mut self) -> Command<Message> {
        let Some(row) = self.selected_row() else {
            return Command::none();
        };
        if row.has_children && row.expanded {
            let id = row.id;
            self.set_expanded(id, false);
            return Command::none();
        }
        let parent_depth = match row.depth.checked_sub(1) {
            Some(d) => d,
            None => return Command::none(),
        };
        let parent = self.rows[..self.selected]
            .iter()
            .rposition(|r| r.depth == parent_depth);
        match parent {
            Some(index) => self.move_to(index),
            None => Command::none(),
        }
    }

    fn menu_anchor(&self, row: &FlatNode) -> Position {
        let area = self.last_area.get();
        let line = self.selected.saturating_sub(self.offset.get()) as u16;
        let label = (row.depth * 2 + 2 + row.name.width() + 1) as u16;
        Position::new(
            area.x.saturating_add(label),
            area.y.saturating_add(line).saturating_add(1),
        )
    }

    fn row_line(&self, row: &FlatNode, selected: bool) -> Line<'static> {
        let marker = match (row.tag, row.expanded) {
            (KindTag::Field, _) => "• ",
            (_, true) => "▾ ",
            (_, false) => "▸ ",
        };
        let suffix = match (row.tag, row.field_type) {
            (KindTag::Group, _) => " {}".to_string(),
            (KindTag::List, _) => " []".to_string(),
            (KindTag::Field, Some(t)) => format!(": {}", t.label()),
            (KindTag::Field, None) => String::new(),
        };
        let name_style = match (selected, self.focus) {
            (true, true) => Style::default().add_modifier(Modifier::REVERSED),
            (true, false) => Style::default().add_modifier(Modifier::BOLD),
            _ => Style::default(),
        };
        Line::from(vec![
            Span::raw("  ".repeat(row.depth)),
            Span::styled(marker, Style::default().fg(Color::DarkGray)),
            Span::styled(row.name.clone(), name_style),
            Span::styled(suffix, Style::default().fg(Color::DarkGray)),
        ])
    }
}

impl Component for SchemaTree {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        let Message::KeyPress(key) = msg else {
            return Command::none();
        };
        if !self.focus {
            return Command::none();
        }

        if self.keys.add_root.matches(&key) {
            return Command::message(Message::AddRootRequested);
        }
        if self.keys.up.matches(&key) {
            return self.move_to(self.selected.saturating_sub(1));
        }
        if self.keys.down.matches(&key) {
            return self.move_to(self.selected + 1);
        }
        if self.keys.collapse.matches(&key) {
            return self.collapse_or_parent();
        }

        let Some(row) = self.selected_row().cloned() else {
            return Command::none();
        };
        if self.keys.expand.matches(&key) && row.tag != KindTag::Field {
            self.set_expanded(row.id, true);
        } else if self.keys.toggle.matches(&key) && row.tag != KindTag::Field {
            self.set_expanded(row.id, !row.expanded);
        } else if self.keys.menu.matches(&key) {
            return Command::message(Message::MenuRequested {
                id: row.id,
                is_container: row.tag != KindTag::Field,
                anchor: self.menu_anchor(&row),
            });
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let block = focus_block("Schema", self.focus);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.last_area.set(inner);

        if self.rows.is_empty() {
            let hint = Line::styled(
                "No nodes yet. Press n to add one.",
                Style::default().fg(Color::DarkGray),
            );
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        }

        let height = inner.height as usize;
        let mut offset = self.offset.get();
        if self.selected < offset {
            offset = self.selected;
        } else if height > 0 && self.selected >= offset + height {
            offset = self.selected + 1 - height;
        }
        self.offset.set(offset);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, row)| self.row_line(row, i == self.selected))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

impl KeyMap for SchemaTree {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.keys.toggle, &self.keys.menu, &self.keys.add_root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinbox_core::testing::buffer_to_string;
    use pinbox_schema::FieldType;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    /// customer { name, email }, tags [ label ], issued: date
    fn sample() -> Schema {
        let mut s = Schema::new();
        let name = s.field("name", FieldType::String);
        let email = s.field("email", FieldType::String);
        let customer = s.group("customer").with_child(name).with_child(email);
        let label = s.field("label", FieldType::String);
        let tags = s.list("tags").with_child(label);
        let issued = s.field("issued", FieldType::Date);
        s.push_root(customer);
        s.push_root(tags);
        s.push_root(issued);
        s
    }

    fn tree() -> SchemaTree {
        let mut tree = SchemaTree::new(sample());
        tree.focus();
        tree
    }

    fn key(code: KeyCode) -> Message {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn names(tree: &SchemaTree) -> Vec<&str> {
        tree.rows().iter().map(|r| r.name.as_str()).collect()
    }

    fn id_of(tree: &SchemaTree, name: &str) -> NodeId {
        tree.rows().iter().find(|r| r.name == name).map(|r| r.id).unwrap()
    }

    #[test]
    fn starts_fully_expanded() {
        let tree = tree();
        assert_eq!(
            names(&tree),
            vec!["customer", "name", "email", "tags", "label", "issued"]
        );
        assert_eq!(tree.selected_row().map(|r| r.name.as_str()), Some("customer"));
    }

    #[test]
    fn navigation_emits_selection() {
        let mut tree = tree();
        let msg = tree.update(key(KeyCode::Down)).into_message();
        assert_eq!(msg, Some(Message::Selected(id_of(&tree, "name"))));
        assert!(tree.update(key(KeyCode::Up)).into_message().is_some());
        assert!(tree.update(key(KeyCode::Up)).is_none());
    }

    #[test]
    fn space_toggles_containers() {
        let mut tree = tree();
        tree.update(key(KeyCode::Char(' ')));
        assert_eq!(names(&tree), vec!["customer", "tags", "label", "issued"]);
        tree.update(key(KeyCode::Char(' ')));
        assert_eq!(tree.rows().len(), 6);
    }

    #[test]
    fn left_collapses_then_jumps_to_parent() {
        let mut tree = tree();
        tree.update(key(KeyCode::Down));
        tree.update(key(KeyCode::Down));
        assert_eq!(tree.selected_row().map(|r| r.name.as_str()), Some("email"));

        tree.update(key(KeyCode::Left));
        assert_eq!(tree.selected_row().map(|r| r.name.as_str()), Some("customer"));
        tree.update(key(KeyCode::Left));
        assert!(!tree.is_expanded(id_of(&tree, "customer")));
    }

    #[test]
    fn enter_requests_menu_for_selection() {
        let mut tree = tree();
        tree.update(key(KeyCode::Down));
        match tree.update(key(KeyCode::Enter)).into_message() {
            Some(Message::MenuRequested { id, is_container, .. }) => {
                assert_eq!(id, id_of(&tree, "name"));
                assert!(!is_container);
            }
            other => panic!("expected menu request, got {other:?}"),
        }
    }

    #[test]
    fn unfocused_tree_ignores_keys() {
        let mut tree = SchemaTree::new(sample());
        assert!(tree.update(key(KeyCode::Down)).is_none());
    }

    #[test]
    fn add_above_below_within() {
        let mut tree = tree();
        let issued = id_of(&tree, "issued");
        let tags = id_of(&tree, "tags");

        let above = tree.add_above(issued).unwrap();
        assert_eq!(tree.selected_id(), Some(above));
        let below = tree.add_below(issued).unwrap();
        let within = tree.add_within(tags).unwrap();
        assert_eq!(tree.selected_id(), Some(within));

        assert_eq!(
            names(&tree),
            vec![
                "customer", "name", "email", "tags", "label", "new_node", "new_node", "issued",
                "new_node_2",
            ]
        );
        assert_eq!(tree.schema().index_path(below), Some(vec![4]));
    }

    #[test]
    fn add_within_a_collapsed_container_expands_it() {
        let mut tree = tree();
        tree.update(key(KeyCode::Char(' ')));
        let customer = id_of(&tree, "customer");
        let added = tree.add_within(customer).unwrap();
        assert!(tree.is_expanded(customer));
        assert_eq!(tree.schema().index_path(added), Some(vec![0, 2]));
    }

    #[test]
    fn add_within_a_field_fails() {
        let mut tree = tree();
        let issued = id_of(&tree, "issued");
        assert!(matches!(tree.add_within(issued), Err(SchemaError::NotAContainer(_))));
    }

    #[test]
    fn delete_keeps_selection_in_range() {
        let mut tree = tree();
        let issued = id_of(&tree, "issued");
        tree.select(issued);
        tree.delete(issued).unwrap();
        assert_eq!(tree.selected_row().map(|r| r.name.as_str()), Some("label"));

        let customer = id_of(&tree, "customer");
        let removed = tree.delete(customer).unwrap();
        assert_eq!(removed.subtree_len(), 3);
        assert_eq!(names(&tree), vec!["tags", "label"]);
    }

    #[test]
    fn save_renames_to_unique_sibling_name() {
        let mut tree = tree();
        let email = id_of(&tree, "email");
        let path = tree.schema().index_path(email).unwrap();
        let mut node = tree.schema().find(email).cloned().unwrap();
        node.name = "name".into();

        assert_eq!(tree.save(&path, node).unwrap(), "name_2");
        assert_eq!(tree.selected_id(), Some(email));
    }

    #[test]
    fn add_root_on_empty_schema() {
        let mut tree = SchemaTree::new(Schema::new());
        assert!(tree.selected_row().is_none());
        let id = tree.add_root().unwrap();
        assert_eq!(tree.selected_id(), Some(id));
        assert_eq!(names(&tree), vec!["new_node"]);
    }

    #[test]
    fn renders_rows_with_type_hints() {
        let tree = tree();
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        terminal.draw(|f| tree.view(f, f.area())).unwrap();
        let screen = buffer_to_string(terminal.backend().buffer());
        assert!(screen.contains("▾ customer {}"));
        assert!(screen.contains("• issued: date"));
        assert!(screen.contains("tags []"));
    }

    #[test]
    fn view_scrolls_to_selection() {
        let mut tree = tree();
        let issued = id_of(&tree, "issued");
        tree.select(issued);
        let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
        terminal.draw(|f| tree.view(f, f.area())).unwrap();
        let screen = buffer_to_string(terminal.backend().buffer());
        assert!(screen.contains("issued"));
        assert!(!screen.contains("customer"));
    }
}
