//! Two side-by-side panels with a keyboard-resizable divider.

use crate::key::{Binding, KeyCombination, KeyMap};
use pinbox_core::{Command, Component};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Messages for the split pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key press; only the resize bindings are acted on.
    KeyPress(KeyEvent),
    /// Emitted when the left panel's share changes, in percent.
    Resized(u16),
}

/// Key bindings for [`SplitPane`].
#[derive(Debug, Clone)]
pub struct SplitPaneKeys {
    /// Widen the left panel.
    pub grow: Binding,
    /// Narrow the left panel.
    pub shrink: Binding,
}

impl Default for SplitPaneKeys {
    fn default() -> Self {
        Self {
            grow: Binding::new(KeyCombination::ctrl(KeyCode::Right), "widen"),
            shrink: Binding::new(KeyCombination::ctrl(KeyCode::Left), "narrow"),
        }
    }
}

/// Left / right layout whose split is a percentage of the width.
///
/// The split moves in `step` increments and never leaves `[min, max]`
/// (20% to 80% by default).
#[derive(Debug, Clone)]
pub struct SplitPane {
    ratio: u16,
    min: u16,
    max: u16,
    step: u16,
    keys: SplitPaneKeys,
}

impl Default for SplitPane {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitPane {
    /// An even split with 5% steps, bounded to 20%..=80%.
    pub fn new() -> Self {
        Self {
            ratio: 50,
            min: 20,
            max: 80,
            step: 5,
            keys: SplitPaneKeys::default(),
        }
    }

    /// Set the left panel's share, clamped to the bounds.
    pub fn with_ratio(mut self, ratio: u16) -> Self {
        self.ratio = ratio.clamp(self.min, self.max);
        self
    }

    /// Set the bounds. `min` is raised to at least 1 and `max` kept within
    /// `min..=99`; the ratio is clamped into the new range.
    pub fn with_bounds(mut self, min: u16, max: u16) -> Self {
        self.min = min.clamp(1, 99);
        self.max = max.clamp(self.min, 99);
        self.ratio = self.ratio.clamp(self.min, self.max);
        self
    }

    /// Set the resize step in percent.
    pub fn with_step(mut self, step: u16) -> Self {
        self.step = step.max(1);
        self
    }

    /// Replace the key bindings.
    pub fn with_keys(mut self, keys: SplitPaneKeys) -> Self {
        self.keys = keys;
        self
    }

    /// The left panel's share in percent.
    pub fn ratio(&self) -> u16 {
        self.ratio
    }

    /// Whether `key` is one of the resize bindings. Parents check this
    /// before routing keys to a focused child.
    pub fn handles(&self, key: &KeyEvent) -> bool {
        self.keys.grow.matches(key) || self.keys.shrink.matches(key)
    }

    /// The left and right panel areas, with one column between them for the
    /// divider.
    pub fn areas(&self, area: Rect) -> (Rect, Rect) {
        let [left, _, right] = self.split(area);
        (left, right)
    }

    fn split(&self, area: Rect) -> [Rect; 3] {
        Layout::horizontal([
            Constraint::Percentage(self.ratio),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area)
    }

    fn resize(&mut self, grow: bool) -> Command<Message> {
        let next = if grow {
            self.ratio.saturating_add(self.step)
        } else {
            self.ratio.saturating_sub(self.step)
        }
        .clamp(self.min, self.max);
        if next == self.ratio {
            return Command::none();
        }
        tracing::trace!(from = self.ratio, to = next, "split resized");
        self.ratio = next;
        Command::message(Message::Resized(next))
    }
}

impl Component for SplitPane {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) if self.keys.grow.matches(&key) => self.resize(true),
            Message::KeyPress(key) if self.keys.shrink.matches(&key) => self.resize(false),
            _ => Command::none(),
        }
    }

    /// Draws only the divider; the parent renders each panel into
    /// [`areas`](SplitPane::areas).
    fn view(&self, frame: &mut Frame, area: Rect) {
        let [_, divider, _] = self.split(area);
        let block = Block::new()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(block, divider);
    }
}

impl KeyMap for SplitPane {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.keys.shrink, &self.keys.grow]
    }
}
