//! Key bindings and the one-line help they render into.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// One or more key combinations mapped to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// Short description shown in help lines.
    pub description: String,
    /// Disabled bindings never match.
    pub enabled: bool,
}

/// A key press plus the modifiers that must accompany it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key.
    pub code: KeyCode,
    /// Required modifiers.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Bind a single key combination.
    pub fn new(key: KeyCombination, description: impl Into<String>) -> Self {
        Self::with_keys(vec![key], description)
    }

    /// Bind several key combinations to the same action.
    pub fn with_keys(keys: Vec<KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    /// Whether `event` triggers this binding.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.enabled && self.keys.iter().any(|k| k.matches(event))
    }

    /// Enable or disable the binding.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Label of the first key, e.g. `ctrl+←`.
    pub fn key_label(&self) -> String {
        self.keys.first().map(KeyCombination::label).unwrap_or_default()
    }
}

impl KeyCombination {
    /// A key with no modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self::with_modifiers(code, KeyModifiers::NONE)
    }

    /// A key held with Ctrl.
    pub fn ctrl(code: KeyCode) -> Self {
        Self::with_modifiers(code, KeyModifiers::CONTROL)
    }

    /// A key with an explicit modifier set.
    pub fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Modifiers must match exactly, so `Left` and `Ctrl+Left` stay distinct.
    /// Shift is ignored for characters, where it is already part of the code.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.code != event.code {
            return false;
        }
        match event.code {
            KeyCode::Char(_) => {
                event.modifiers.difference(KeyModifiers::SHIFT)
                    == self.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => event.modifiers == self.modifiers,
        }
    }

    /// Human-readable label for help lines.
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => "shift+tab".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "del".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("ctrl+{key}")
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            format!("alt+{key}")
        } else {
            key
        }
    }
}

/// Types that expose their key bindings for a help line.
pub trait KeyMap {
    /// The bindings worth showing in a one-line hint.
    fn short_help(&self) -> Vec<&Binding>;
}

/// Render bindings as `key description • key description`.
pub fn help_line(bindings: &[&Binding]) -> Line<'static> {
    let key_style = Style::default().fg(Color::Gray);
    let desc_style = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();
    for (i, binding) in bindings.iter().filter(|b| b.enabled).enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", desc_style));
        }
        spans.push(Span::styled(binding.key_label(), key_style));
        spans.push(Span::styled(format!(" {}", binding.description), desc_style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let left = Binding::new(KeyCombination::new(KeyCode::Left), "Collapse");
        let ctrl_left = Binding::new(KeyCombination::ctrl(KeyCode::Left), "Shrink");

        assert!(left.matches(&press(KeyCode::Left, KeyModifiers::NONE)));
        assert!(!left.matches(&press(KeyCode::Left, KeyModifiers::CONTROL)));
        assert!(ctrl_left.matches(&press(KeyCode::Left, KeyModifiers::CONTROL)));
        assert!(!ctrl_left.matches(&press(KeyCode::Left, KeyModifiers::NONE)));
    }

    #[test]
    fn shift_is_ignored_for_characters() {
        let add = Binding::new(KeyCombination::new(KeyCode::Char('A')), "Add");
        assert!(add.matches(&press(KeyCode::Char('A'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn disabled_binding_never_matches() {
        let b = Binding::new(KeyCombination::new(KeyCode::Enter), "Open").enabled(false);
        assert!(!b.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn labels() {
        assert_eq!(KeyCombination::ctrl(KeyCode::Right).label(), "ctrl+→");
        assert_eq!(KeyCombination::new(KeyCode::Char('a')).label(), "a");
        assert_eq!(KeyCombination::new(KeyCode::Enter).label(), "enter");
    }

    #[test]
    fn help_line_skips_disabled() {
        let open = Binding::new(KeyCombination::new(KeyCode::Enter), "menu");
        let off = Binding::new(KeyCombination::new(KeyCode::Delete), "delete").enabled(false);
        let line = help_line(&[&open, &off]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "enter menu");
    }
}
