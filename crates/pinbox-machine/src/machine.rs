//! The PIN input state machine.
//!
//! ```text
//!            Focus(i)
//!   Idle ─────────────► Focused ◄─┐ Change / Backspace / Paste
//!    ▲                    │  └────┘
//!    └──────── Blur ──────┘
//! ```
//!
//! Context is the slot values and the focused index. After every event the
//! machine compares the focused index with its previous value and, when it
//! moved to a slot, asks the injected [`SlotFocus`] to focus that slot.

use crate::config::PinInputConfig;
use crate::error::MachineError;
use crate::focus::{NoopFocus, SlotFocus};
use crate::resolve::resolve_value_update;

/// Controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// No slot has focus.
    #[default]
    Idle,
    /// One slot has focus and receives edits.
    Focused,
}

/// Events accepted by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A slot received focus.
    Focus(usize),
    /// The focused slot lost focus.
    Blur,
    /// The focused slot's text changed to `value`, which may briefly hold two
    /// characters.
    Change { index: usize, value: String },
    /// Backspace pressed in a slot.
    Backspace(usize),
    /// Text pasted into the input.
    Paste(String),
}

/// Finite-state controller over a fixed number of character slots.
///
/// The machine owns the slot values and the focused index and never touches
/// a UI toolkit directly. Device focus is delegated to `F`.
///
/// # Example
///
/// ```rust
/// use pinbox_machine::{Event, PinInputMachine, State};
///
/// let mut pin = PinInputMachine::new(4).unwrap();
/// pin.send(Event::Focus(0));
/// pin.send(Event::Paste("12".into()));
/// assert_eq!(pin.value(), ["1", "2", "", ""]);
/// assert_eq!(pin.focused_index(), Some(2));
/// assert_eq!(pin.state(), State::Focused);
/// ```
#[derive(Debug, Clone)]
pub struct PinInputMachine<F: SlotFocus = NoopFocus> {
    state: State,
    value: Vec<String>,
    focused_index: Option<usize>,
    focus: F,
}

impl PinInputMachine<NoopFocus> {
    /// Create a headless machine with `length` empty slots.
    pub fn new(length: usize) -> Result<Self, MachineError> {
        Self::with_focus(length, NoopFocus)
    }
}

impl<F: SlotFocus> PinInputMachine<F> {
    /// Create a machine with `length` empty slots that reports focus moves to `focus`.
    pub fn with_focus(length: usize, focus: F) -> Result<Self, MachineError> {
        if length == 0 {
            return Err(MachineError::NoSlots);
        }
        Ok(Self {
            state: State::Idle,
            value: vec![String::new(); length],
            focused_index: None,
            focus,
        })
    }

    /// Create a machine sized by `config`.
    pub fn from_config(config: &PinInputConfig, focus: F) -> Result<Self, MachineError> {
        Self::with_focus(config.length, focus)
    }

    /// Dispatch an event. Returns `false` when the current state ignores it.
    pub fn send(&mut self, event: Event) -> bool {
        let previous = self.focused_index;
        let handled = match (self.state, event) {
            (State::Idle, Event::Focus(index)) => self.on_focus(index),
            (State::Focused, Event::Blur) => {
                self.state = State::Idle;
                self.focused_index = None;
                true
            }
            (State::Focused, Event::Change { index, value }) => self.on_change(index, &value),
            (State::Focused, Event::Backspace(index)) => self.on_backspace(index),
            (State::Focused, Event::Paste(text)) => self.on_paste(&text),
            (state, event) => {
                tracing::trace!(?state, ?event, "event ignored");
                false
            }
        };

        debug_assert_eq!(self.state == State::Idle, self.focused_index.is_none());

        if self.focused_index != previous {
            tracing::debug!(
                from = ?previous,
                to = ?self.focused_index,
                state = ?self.state,
                "focused slot changed"
            );
            if let Some(index) = self.focused_index {
                self.focus.focus_slot(index);
            }
        }
        handled
    }

    fn on_focus(&mut self, index: usize) -> bool {
        if index >= self.value.len() {
            tracing::debug!(index, slots = self.value.len(), "focus outside slot range");
            return false;
        }
        self.state = State::Focused;
        self.focused_index = Some(index);
        true
    }

    fn on_change(&mut self, index: usize, raw: &str) -> bool {
        let Some(focused) = self.focused_index else {
            return false;
        };
        if index != focused {
            tracing::trace!(index, focused, "change reported for another slot");
        }

        let resolved = resolve_value_update(&self.value[focused], raw);
        // The slot shows one character at most; an unresolved pair keeps
        // the latest keystroke.
        self.value[focused] = resolved.chars().last().map(String::from).unwrap_or_default();
        self.focused_index = Some(self.next_index(focused));
        true
    }

    fn on_backspace(&mut self, index: usize) -> bool {
        let Some(focused) = self.focused_index else {
            return false;
        };
        if index != focused {
            tracing::trace!(index, focused, "backspace reported for another slot");
        }
        if self.value[focused].is_empty() {
            return true;
        }
        self.value[focused].clear();
        self.focused_index = Some(focused.saturating_sub(1));
        true
    }

    fn on_paste(&mut self, text: &str) -> bool {
        for (slot, c) in self.value.iter_mut().zip(text.chars()) {
            slot.clear();
            slot.push(c);
        }
        let target = self
            .value
            .iter()
            .position(String::is_empty)
            .unwrap_or(self.value.len() - 1);
        self.focused_index = Some(target);
        true
    }

    fn next_index(&self, index: usize) -> usize {
        (index + 1).min(self.value.len() - 1)
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Slot values, one entry per slot.
    pub fn value(&self) -> &[String] {
        &self.value
    }

    /// The value of slot `index`, if it exists.
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.value.get(index).map(String::as_str)
    }

    /// The focused slot, or `None` while idle.
    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    /// The focused slot with `-1` standing for "no slot".
    pub fn focused_index_raw(&self) -> isize {
        self.focused_index.map_or(-1, |i| i as isize)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Always `false`; a machine has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// All slot values concatenated.
    pub fn value_string(&self) -> String {
        self.value.concat()
    }

    /// Whether every slot holds a character.
    pub fn is_complete(&self) -> bool {
        self.value.iter().all(|s| !s.is_empty())
    }

    /// Empty every slot in place. State and focus are untouched.
    pub fn clear(&mut self) {
        for slot in &mut self.value {
            slot.clear();
        }
    }

    /// The injected focus capability.
    pub fn focus_capability(&self) -> &F {
        &self.focus
    }

    /// Mutable access to the focus capability, e.g. to take a pending request.
    pub fn focus_capability_mut(&mut self) -> &mut F {
        &mut self.focus
    }
}
