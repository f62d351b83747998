//! Edit form for a single schema node.
//!
//! The editor works on a copy. Nothing reaches the schema until the user
//! saves, at which point the parent receives [`Message::Save`] with the
//! node's index path and the edited copy.

use crate::chrome::focus_block;
use pinbox_core::{Command, Component};
use pinbox_schema::{KindTag, SchemaNode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const LABEL_WIDTH: u16 = 8;

/// The form row that receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    /// Node name text.
    Name,
    /// Group / list / field.
    Kind,
    /// Field type, only reachable for fields.
    FieldType,
}

/// Messages for the node editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press while the editor has focus.
    KeyPress(KeyEvent),
    /// Emitted on Enter with the edited copy.
    Save {
        /// Index path of the node being edited.
        path: Vec<usize>,
        /// The edited node.
        node: SchemaNode,
    },
    /// Emitted on Esc.
    Cancel,
}

struct Draft {
    path: Vec<usize>,
    node: SchemaNode,
    name: Vec<char>,
    cursor: usize,
}

/// Form with a name input and kind / field-type selectors.
#[derive(Default)]
pub struct NodeEditor {
    draft: Option<Draft>,
    field: Option<EditorField>,
    focus: bool,
}

impl NodeEditor {
    /// An editor with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a copy of `node`, found at `path`, with the cursor at the end of
    /// its name.
    pub fn edit(&mut self, path: Vec<usize>, node: SchemaNode) {
        tracing::debug!(id = %node.id, ?path, "editing node");
        let name: Vec<char> = node.name.chars().collect();
        self.draft = Some(Draft {
            path,
            cursor: name.len(),
            name,
            node,
        });
        self.field = Some(EditorField::Name);
    }

    /// Drop the loaded node.
    pub fn clear(&mut self) {
        self.draft = None;
        self.field = None;
    }

    /// Whether a node is loaded.
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Give the editor keyboard focus.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    /// The row receiving keys.
    pub fn active_field(&self) -> Option<EditorField> {
        self.field
    }

    /// The edited name as typed.
    pub fn name(&self) -> Option<String> {
        self.draft.as_ref().map(|d| d.name.iter().collect())
    }

    /// The node copy with the current edits applied.
    pub fn draft(&self) -> Option<SchemaNode> {
        self.draft.as_ref().map(|d| {
            let mut node = d.node.clone();
            node.name = d.name.iter().collect();
            node
        })
    }

    fn fields(&self) -> Vec<EditorField> {
        let is_field = self
            .draft
            .as_ref()
            .is_some_and(|d| d.node.tag() == KindTag::Field);
        let mut fields = vec![EditorField::Name, EditorField::Kind];
        if is_field {
            fields.push(EditorField::FieldType);
        }
        fields
    }

    fn step_field(&mut self, forward: bool) {
        let fields = self.fields();
        let current = self
            .field
            .and_then(|f| fields.iter().position(|&x| x == f))
            .unwrap_or(0);
        let n = fields.len();
        let next = if forward {
            (current + 1) % n
        } else {
            (current + n - 1) % n
        };
        self.field = Some(fields[next]);
    }

    fn edit_name(draft: &mut Draft, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                draft.name.insert(draft.cursor, c);
                draft.cursor += 1;
            }
            KeyCode::Backspace if draft.cursor > 0 => {
                draft.cursor -= 1;
                draft.name.remove(draft.cursor);
            }
            KeyCode::Delete if draft.cursor < draft.name.len() => {
                draft.name.remove(draft.cursor);
            }
            KeyCode::Left => draft.cursor = draft.cursor.saturating_sub(1),
            KeyCode::Right => draft.cursor = (draft.cursor + 1).min(draft.name.len()),
            KeyCode::Home => draft.cursor = 0,
            KeyCode::End => draft.cursor = draft.name.len(),
            _ => {}
        }
    }

    fn cycle_kind(draft: &mut Draft) {
        let next = draft.node.tag().cycle();
        draft.node.set_kind(next);
    }

    fn cycle_field_type(draft: &mut Draft) {
        if let Some(t) = draft.node.field_type() {
            draft.node.set_field_type(t.cycle());
        }
    }

    fn row<'a>(&self, field: EditorField, label: &'a str, value: String) -> Line<'a> {
        let active = self.focus && self.field == Some(field);
        let label_style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let padded = format!("{label:<width$}", width = LABEL_WIDTH as usize);
        Line::from(vec![Span::styled(padded, label_style), Span::raw(value)])
    }
}

impl Component for NodeEditor {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        let Message::KeyPress(key) = msg else {
            return Command::none();
        };
        if !self.focus || self.draft.is_none() {
            return Command::none();
        }

        match key.code {
            KeyCode::Esc => {
                self.clear();
                return Command::message(Message::Cancel);
            }
            KeyCode::Enter => {
                let Some(draft) = self.draft.take() else {
                    return Command::none();
                };
                self.field = None;
                let mut node = draft.node;
                node.name = draft.name.into_iter().collect();
                return Command::message(Message::Save {
                    path: draft.path,
                    node,
                });
            }
            KeyCode::Tab | KeyCode::Down => {
                self.step_field(true);
                return Command::none();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.step_field(false);
                return Command::none();
            }
            _ => {}
        }

        let field = self.field;
        let Some(draft) = self.draft.as_mut() else {
            return Command::none();
        };
        match (field, key.code) {
            (Some(EditorField::Name), _) => Self::edit_name(draft, key),
            (Some(EditorField::Kind), KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
                Self::cycle_kind(draft)
            }
            (
                Some(EditorField::FieldType),
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' '),
            ) => Self::cycle_field_type(draft),
            _ => {}
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let block = focus_block("Edit node", self.focus);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(draft) = self.draft.as_ref() else {
            let hint = Line::styled(
                "Select a node and choose Edit.",
                Style::default().fg(Color::DarkGray),
            );
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        };

        let name: String = draft.name.iter().collect();
        let mut lines = vec![
            self.row(EditorField::Name, "Name", name),
            self.row(EditorField::Kind, "Kind", format!("‹ {} ›", draft.node.tag().label())),
        ];
        if let Some(t) = draft.node.field_type() {
            lines.push(self.row(EditorField::FieldType, "Type", format!("‹ {} ›", t.label())));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "enter save • esc cancel • tab next",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(lines), inner);

        if self.focus && self.field == Some(EditorField::Name) {
            let before: String = draft.name[..draft.cursor].iter().collect();
            let x = inner.x + LABEL_WIDTH + before.width() as u16;
            if x < inner.right() && inner.height > 0 {
                frame.set_cursor_position(Position::new(x, inner.y));
            }
        }
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
