//! Popup menu of actions on one schema node.
//!
//! The terminal stand-in for a right-click menu: it opens next to the
//! selected tree row and lists Edit, Delete and the three add positions.
//! "Add within" only appears for containers.

use crate::overlay::{anchored, render_overlay};
use pinbox_core::{Command, Component};
use pinbox_schema::NodeId;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::Frame;

const MENU_WIDTH: u16 = 18;

/// An action offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the node in the editor.
    Edit,
    /// Remove the node and its subtree.
    Delete,
    /// Insert a new sibling before the node.
    AddAbove,
    /// Append a new child to the node.
    AddWithin,
    /// Insert a new sibling after the node.
    AddBelow,
}

impl MenuAction {
    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Edit => "Edit",
            MenuAction::Delete => "Delete",
            MenuAction::AddAbove => "Add above",
            MenuAction::AddWithin => "Add within",
            MenuAction::AddBelow => "Add below",
        }
    }

    /// Single-key shortcut.
    pub fn hotkey(self) -> char {
        match self {
            MenuAction::Edit => 'e',
            MenuAction::Delete => 'd',
            MenuAction::AddAbove => 'a',
            MenuAction::AddWithin => 'w',
            MenuAction::AddBelow => 'b',
        }
    }

    /// The actions available for a node.
    pub fn for_node(is_container: bool) -> Vec<MenuAction> {
        let mut actions = vec![MenuAction::Edit, MenuAction::Delete, MenuAction::AddAbove];
        if is_container {
            actions.push(MenuAction::AddWithin);
        }
        actions.push(MenuAction::AddBelow);
        actions
    }
}

/// Messages for the context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press while the menu is open.
    KeyPress(KeyEvent),
    /// Emitted when an action is picked for `target`.
    Chosen {
        /// The node the menu was opened for.
        target: NodeId,
        /// The picked action.
        action: MenuAction,
    },
    /// Emitted when the menu closes without a choice.
    Dismissed,
}

/// A popup listing [`MenuAction`]s for one node.
#[derive(Debug, Default)]
pub struct ContextMenu {
    target: Option<NodeId>,
    actions: Vec<MenuAction>,
    selected: usize,
    anchor: Position,
}

impl ContextMenu {
    /// A closed menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open for `target` with its top-left corner at `anchor`.
    pub fn open(&mut self, target: NodeId, is_container: bool, anchor: Position) {
        tracing::debug!(%target, "context menu opened");
        self.target = Some(target);
        self.actions = MenuAction::for_node(is_container);
        self.selected = 0;
        self.anchor = anchor;
    }

    /// Close without emitting anything.
    pub fn close(&mut self) {
        self.target = None;
    }

    /// Whether the menu is showing.
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// The node the menu is open for.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Actions currently listed.
    pub fn actions(&self) -> &[MenuAction] {
        &self.actions
    }

    /// The highlighted action.
    pub fn selected(&self) -> Option<MenuAction> {
        self.target.and_then(|_| self.actions.get(self.selected).copied())
    }

    fn choose(&mut self, action: MenuAction) -> Command<Message> {
        match self.target.take() {
            Some(target) => Command::message(Message::Chosen { target, action }),
            None => Command::none(),
        }
    }

    fn dismiss(&mut self) -> Command<Message> {
        self.target = None;
        Command::message(Message::Dismissed)
    }
}

impl Component for ContextMenu {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        let Message::KeyPress(key) = msg else {
            return Command::none();
        };
        if !self.is_open() {
            return Command::none();
        }
        let count = self.actions.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = (self.selected + count - 1) % count;
                Command::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % count;
                Command::none()
            }
            KeyCode::Enter => match self.actions.get(self.selected).copied() {
                Some(action) => self.choose(action),
                None => self.dismiss(),
            },
            KeyCode::Esc => self.dismiss(),
            KeyCode::Char(c) => match self.actions.iter().find(|a| a.hotkey() == c).copied() {
                Some(action) => self.choose(action),
                None => Command::none(),
            },
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if !self.is_open() {
            return;
        }
        let height = self.actions.len() as u16 + 2;
        let rect = anchored(MENU_WIDTH, height, self.anchor, area);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = render_overlay(frame, rect, Some(&block));

        let lines: Vec<Line> = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let style = if i == self.selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{} ", action.hotkey()), Style::default().fg(Color::DarkGray)),
                    Span::styled(action.label(), style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn focused(&self) -> bool {
        self.is_open()
    }
}
