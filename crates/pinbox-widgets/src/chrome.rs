//! Border helpers shared by the widgets.

use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Borders};

/// Border color for focused chrome.
pub const FOCUS_COLOR: Color = Color::Cyan;
/// Border color for unfocused chrome.
pub const BLUR_COLOR: Color = Color::DarkGray;

/// A titled panel whose border turns cyan when focused.
pub fn focus_block(title: &str, focused: bool) -> Block<'_> {
    Block::new()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border_color(focused)))
}

/// The rounded box drawn around one PIN slot.
pub fn slot_block(border: Style) -> Block<'static> {
    Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
}

fn border_color(focused: bool) -> Color {
    if focused {
        FOCUS_COLOR
    } else {
        BLUR_COLOR
    }
}
