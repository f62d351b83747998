use crossterm::event::{Event, KeyEvent, KeyEventKind};

/// Terminal events delivered through the
/// [`terminal_events`](crate::subscriptions::terminal_events) subscription.
///
/// `Paste` only arrives when bracketed paste is enabled (the default in
/// [`ProgramOptions`](crate::ProgramOptions)); it is how a PIN input receives
/// a whole code at once. Mouse events are not captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press or repeat.
    Key(KeyEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Terminal window gained focus.
    FocusGained,
    /// Terminal window lost focus.
    FocusLost,
    /// Bracketed paste content.
    Paste(String),
}

impl TerminalEvent {
    /// Convert a crossterm event.
    ///
    /// Key releases are dropped: terminals that report them (Windows, kitty
    /// protocol) would otherwise type every character twice.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(k) if k.kind == KeyEventKind::Release => None,
            Event::Key(k) => Some(TerminalEvent::Key(k)),
            Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            Event::FocusGained => Some(TerminalEvent::FocusGained),
            Event::FocusLost => Some(TerminalEvent::FocusLost),
            Event::Paste(s) => Some(TerminalEvent::Paste(s)),
            Event::Mouse(_) => None,
        }
    }

    /// The key event, if this is one.
    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            TerminalEvent::Key(k) => Some(k),
            _ => None,
        }
    }
}
