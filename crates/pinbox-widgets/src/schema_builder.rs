//! The schema builder page: tree on the left, node editor on the right.
//!
//! Keys go to the open context menu first, then to the split pane's resize
//! bindings, then to whichever pane has focus. The editor pane only takes
//! focus while a node is loaded into it, and the tree cannot change until
//! that edit is saved or cancelled.

use crate::context_menu::{self, ContextMenu, MenuAction};
use crate::focus::FocusGroup;
use crate::key::{help_line, KeyMap};
use crate::node_editor::{self, NodeEditor};
use crate::schema_tree::{self, SchemaTree};
use crate::split_pane::{self, SplitPane};
use pinbox_core::{Command, Component};
use pinbox_schema::{NodeId, Schema, SchemaError, SchemaNode};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const TREE: usize = 0;
const EDITOR: usize = 1;

/// Messages for the schema builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press to route.
    KeyPress(KeyEvent),
    /// From the tree.
    Tree(schema_tree::Message),
    /// From the context menu.
    Menu(context_menu::Message),
    /// From the editor.
    Editor(node_editor::Message),
    /// From the split pane.
    Split(split_pane::Message),
}

/// A full schema editing page.
pub struct SchemaBuilder {
    tree: SchemaTree,
    menu: ContextMenu,
    editor: NodeEditor,
    split: SplitPane,
    focus: FocusGroup<2>,
    status: Option<String>,
}

impl SchemaBuilder {
    /// A page editing `schema`, with the tree focused.
    pub fn new(schema: Schema) -> Self {
        let mut focus = FocusGroup::new();
        focus.set_enabled(EDITOR, false);
        let mut builder = Self {
            tree: SchemaTree::new(schema),
            menu: ContextMenu::new(),
            editor: NodeEditor::new(),
            split: SplitPane::new().with_ratio(45),
            focus,
            status: None,
        };
        builder.sync_focus();
        builder
    }

    /// The schema being edited.
    pub fn schema(&self) -> &Schema {
        self.tree.schema()
    }

    /// The tree pane.
    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    /// The editor pane.
    pub fn editor(&self) -> &NodeEditor {
        &self.editor
    }

    /// The context menu.
    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    /// The split between the panes.
    pub fn split(&self) -> &SplitPane {
        &self.split
    }

    /// Whether the editor pane has focus.
    pub fn editor_focused(&self) -> bool {
        self.focus.is_focused(EDITOR)
    }

    /// Last status line, e.g. the name a saved node ended up with.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn sync_focus(&mut self) {
        if self.focus.is_focused(EDITOR) {
            self.tree.blur();
            self.editor.focus();
        } else {
            self.editor.blur();
            self.tree.focus();
        }
    }

    fn focus_editor(&mut self, enabled: bool) {
        self.focus.set_enabled(EDITOR, enabled);
        if enabled {
            self.focus.focus(EDITOR);
        }
        self.sync_focus();
    }

    fn route_key(&mut self, key: KeyEvent) -> Command<Message> {
        if self.menu.is_open() {
            return self
                .menu
                .update(context_menu::Message::KeyPress(key))
                .map(Message::Menu);
        }
        if self.split.handles(&key) {
            return self
                .split
                .update(split_pane::Message::KeyPress(key))
                .map(Message::Split);
        }
        if key.code == KeyCode::Tab && self.focus.is_focused(TREE) {
            self.focus.focus_next();
            self.sync_focus();
            return Command::none();
        }
        if self.focus.is_focused(EDITOR) {
            self.editor
                .update(node_editor::Message::KeyPress(key))
                .map(Message::Editor)
        } else {
            self.tree
                .update(schema_tree::Message::KeyPress(key))
                .map(Message::Tree)
        }
    }

    fn on_tree(&mut self, msg: schema_tree::Message) -> Command<Message> {
        match msg {
            schema_tree::Message::MenuRequested {
                id,
                is_container,
                anchor,
            } => {
                self.menu.open(id, is_container, anchor);
                Command::none()
            }
            schema_tree::Message::AddRootRequested => {
                let result = self.tree.add_root().map(|_| ());
                self.report(result, "Added node");
                Command::none()
            }
            schema_tree::Message::Selected(_) => Command::none(),
            key @ schema_tree::Message::KeyPress(_) => self.tree.update(key).map(Message::Tree),
        }
    }

    fn on_menu(&mut self, msg: context_menu::Message) -> Command<Message> {
        match msg {
            context_menu::Message::Chosen { target, action } => {
                self.apply(target, action);
                Command::none()
            }
            context_menu::Message::Dismissed => Command::none(),
            key @ context_menu::Message::KeyPress(_) => self.menu.update(key).map(Message::Menu),
        }
    }

    fn on_editor(&mut self, msg: node_editor::Message) -> Command<Message> {
        match msg {
            node_editor::Message::Save { path, node } => {
                match self.tree.save(&path, node) {
                    Ok(name) => self.status = Some(format!("Saved \"{name}\"")),
                    Err(err) => self.fail(err),
                }
                self.focus_editor(false);
                Command::none()
            }
            node_editor::Message::Cancel => {
                self.focus_editor(false);
                Command::none()
            }
            key @ node_editor::Message::KeyPress(_) => self.editor.update(key).map(Message::Editor),
        }
    }

    fn apply(&mut self, target: NodeId, action: MenuAction) {
        tracing::debug!(%target, ?action, "menu action");
        match action {
            MenuAction::Edit => self.open_editor(target),
            MenuAction::Delete => {
                let result = self.tree.delete(target).map(|_| ());
                self.report(result, "Deleted node");
            }
            MenuAction::AddAbove => {
                let result = self.tree.add_above(target).map(|_| ());
                self.report(result, "Added node");
            }
            MenuAction::AddWithin => {
                let result = self.tree.add_within(target).map(|_| ());
                self.report(result, "Added node");
            }
            MenuAction::AddBelow => {
                let result = self.tree.add_below(target).map(|_| ());
                self.report(result, "Added node");
            }
        }
    }

    fn open_editor(&mut self, id: NodeId) {
        let schema = self.tree.schema();
        let loaded: Option<(Vec<usize>, SchemaNode)> = schema
            .index_path(id)
            .zip(schema.find(id).cloned());
        match loaded {
            Some((path, node)) => {
                self.editor.edit(path, node);
                self.status = None;
                self.focus_editor(true);
            }
            None => self.fail(SchemaError::NotFound(id)),
        }
    }

    fn report(&mut self, result: Result<(), SchemaError>, done: &str) {
        match result {
            Ok(()) => self.status = Some(done.to_string()),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: SchemaError) {
        tracing::warn!(%err, "schema edit failed");
        self.status = Some(err.to_string());
    }

    fn footer(&self) -> Line<'static> {
        if let Some(status) = &self.status {
            return Line::styled(status.clone(), Style::default().fg(Color::Yellow));
        }
        let mut bindings = self.tree.short_help();
        bindings.extend(self.split.short_help());
        help_line(&bindings)
    }
}

impl Component for SchemaBuilder {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) => self.route_key(key),
            Message::Tree(m) => self.on_tree(m),
            Message::Menu(m) => self.on_menu(m),
            Message::Editor(m) => self.on_editor(m),
            Message::Split(split_pane::Message::Resized(_)) => Command::none(),
            Message::Split(m) => self.split.update(m).map(Message::Split),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let [main, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let (left, right) = self.split.areas(main);
        self.tree.view(frame, left);
        self.split.view(frame, main);
        self.editor.view(frame, right);
        frame.render_widget(Paragraph::new(self.footer()), footer);
        self.menu.view(frame, main);
    }

    fn focused(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinbox_core::testing::buffer_to_string;
    use pinbox_schema::FieldType;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn sample() -> Schema {
        let mut s = Schema::new();
        let sku = s.field("sku", FieldType::String);
        let items = s.list("items").with_child(sku);
        let total = s.field("total", FieldType::Number);
        s.push_root(items);
        s.push_root(total);
        s
    }

    /// Apply `msg` and every message it produces immediately.
    fn run(page: &mut SchemaBuilder, msg: Message) {
        let mut queue = vec![msg];
        while let Some(msg) = queue.pop() {
            let (now, _) = page.update(msg).into_messages();
            queue.extend(now.into_iter().rev());
        }
    }

    fn press(page: &mut SchemaBuilder, code: KeyCode) {
        run(page, Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(page: &mut SchemaBuilder, s: &str) {
        s.chars().for_each(|c| press(page, KeyCode::Char(c)));
    }

    fn root_names(page: &SchemaBuilder) -> Vec<String> {
        page.schema().root().children().iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn enter_opens_menu_and_adds_below() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Enter);
        assert!(page.menu().is_open());
        assert!(page.menu().actions().contains(&MenuAction::AddWithin));

        press(&mut page, KeyCode::Char('b'));
        assert!(!page.menu().is_open());
        assert_eq!(root_names(&page), vec!["items", "new_node", "total"]);
        assert_eq!(page.status(), Some("Added node"));
    }

    #[test]
    fn edit_and_save_with_unique_name() {
        let mut page = SchemaBuilder::new(sample());
        // items, sku, total
        press(&mut page, KeyCode::Down);
        press(&mut page, KeyCode::Down);
        press(&mut page, KeyCode::Enter);
        press(&mut page, KeyCode::Char('e'));
        assert!(page.editor_focused());
        assert_eq!(page.editor().name().as_deref(), Some("total"));

        for _ in 0..5 {
            press(&mut page, KeyCode::Backspace);
        }
        type_str(&mut page, "items");
        press(&mut page, KeyCode::Enter);

        assert!(!page.editor_focused());
        assert_eq!(root_names(&page), vec!["items", "items_2"]);
        assert_eq!(page.status(), Some("Saved \"items_2\""));
    }

    #[test]
    fn escape_in_editor_returns_to_tree() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Enter);
        press(&mut page, KeyCode::Char('e'));
        press(&mut page, KeyCode::Esc);
        assert!(!page.editor_focused());
        assert!(!page.editor().is_editing());
        assert!(page.tree().focused());
    }

    #[test]
    fn tab_does_not_focus_empty_editor() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Tab);
        assert!(!page.editor_focused());
    }

    #[test]
    fn tab_in_editor_moves_between_fields() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Enter);
        press(&mut page, KeyCode::Char('e'));
        press(&mut page, KeyCode::Tab);
        assert!(page.editor_focused());
        assert_eq!(page.editor().active_field(), Some(node_editor::EditorField::Kind));
    }

    #[test]
    fn delete_container_from_menu() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Enter);
        press(&mut page, KeyCode::Char('d'));
        assert_eq!(root_names(&page), vec!["total"]);
        assert_eq!(page.status(), Some("Deleted node"));
    }

    #[test]
    fn menu_swallows_keys_until_dismissed() {
        let mut page = SchemaBuilder::new(sample());
        press(&mut page, KeyCode::Enter);
        press(&mut page, KeyCode::Char('n'));
        assert_eq!(root_names(&page), vec!["items", "total"]);
        press(&mut page, KeyCode::Esc);
        assert!(!page.menu().is_open());
    }

    #[test]
    fn ctrl_arrows_resize_from_any_pane() {
        let mut page = SchemaBuilder::new(sample());
        run(
            &mut page,
            Message::KeyPress(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL)),
        );
        assert_eq!(page.split().ratio(), 50);
        // The tree did not see the key.
        assert_eq!(page.tree().selected_row().map(|r| r.name.as_str()), Some("items"));
    }

    #[test]
    fn n_adds_at_root() {
        let mut page = SchemaBuilder::new(Schema::new());
        press(&mut page, KeyCode::Char('n'));
        press(&mut page, KeyCode::Char('n'));
        assert_eq!(root_names(&page), vec!["new_node", "new_node_2"]);
    }

    #[test]
    fn renders_both_panes_and_footer() {
        let page = SchemaBuilder::new(sample());
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| page.view(f, f.area())).unwrap();
        let screen = buffer_to_string(terminal.backend().buffer());
        assert!(screen.contains("Schema"));
        assert!(screen.contains("Edit node"));
        assert!(screen.contains("items []"));
        assert!(screen.contains("enter actions"));
    }
}
