//! Device-focus capability injected into the machine.

/// Moves device focus to a slot.
///
/// The machine calls [`focus_slot`](SlotFocus::focus_slot) after any
/// transition that changes the focused index to a slot. It is never called
/// when focus is cleared.
pub trait SlotFocus {
    /// Give device focus to the slot at `index`.
    fn focus_slot(&mut self, index: usize);
}

/// A capability that ignores focus requests. Used for headless machines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFocus;

impl SlotFocus for NoopFocus {
    fn focus_slot(&mut self, _index: usize) {}
}

/// Holds the latest focus request until someone takes it.
///
/// Presentation layers that must defer focus (for instance until after the
/// next render) use this to pick up the request once `send` returns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingFocus {
    pending: Option<usize>,
}

impl PendingFocus {
    /// Take the pending request, leaving none behind.
    pub fn take(&mut self) -> Option<usize> {
        self.pending.take()
    }

    /// Peek at the pending request.
    pub fn pending(&self) -> Option<usize> {
        self.pending
    }
}

impl SlotFocus for PendingFocus {
    fn focus_slot(&mut self, index: usize) {
        self.pending = Some(index);
    }
}

impl<F: FnMut(usize)> SlotFocus for F {
    fn focus_slot(&mut self, index: usize) {
        self(index)
    }
}
