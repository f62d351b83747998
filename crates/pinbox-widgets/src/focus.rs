//! Keyboard focus across a fixed set of panes.

/// Tracks which of `N` panes receives keys. Panes can be disabled, and
/// cycling skips them; the focused pane is never a disabled one unless every
/// pane is disabled.
#[derive(Debug, Clone)]
pub struct FocusGroup<const N: usize> {
    focused: usize,
    enabled: [bool; N],
}

impl<const N: usize> FocusGroup<N> {
    /// Focus on pane 0, every pane enabled.
    pub fn new() -> Self {
        Self {
            focused: 0,
            enabled: [true; N],
        }
    }

    /// Index of the focused pane.
    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Whether `index` is the focused pane.
    pub fn is_focused(&self, index: usize) -> bool {
        self.focused == index
    }

    /// Focus `index` if it exists and is enabled. Returns whether focus moved.
    pub fn focus(&mut self, index: usize) -> bool {
        if index >= N || !self.enabled[index] || index == self.focused {
            return false;
        }
        self.focused = index;
        true
    }

    /// Enable or disable a pane. Disabling the focused pane moves focus on.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if index >= N {
            return;
        }
        self.enabled[index] = enabled;
        if !enabled && self.focused == index {
            self.focus_next();
        }
    }

    /// Whether `index` can take focus.
    pub fn is_enabled(&self, index: usize) -> bool {
        index < N && self.enabled[index]
    }

    /// Move to the next enabled pane, wrapping.
    pub fn focus_next(&mut self) {
        self.step(1);
    }

    /// Move to the previous enabled pane, wrapping.
    pub fn focus_prev(&mut self) {
        self.step(N - 1);
    }

    fn step(&mut self, by: usize) {
        let mut candidate = self.focused;
        for _ in 0..N {
            candidate = (candidate + by) % N;
            if self.enabled[candidate] {
                self.focused = candidate;
                return;
            }
        }
    }
}

impl<const N: usize> Default for FocusGroup<N> {
    fn default() -> Self {
        Self::new()
    }
}
