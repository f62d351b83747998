/// Which characters a slot accepts from keyboard input and paste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Allowed {
    /// Any non-control character.
    #[default]
    Any,
    /// ASCII digits only.
    Numeric,
    /// ASCII letters and digits.
    Alphanumeric,
}

impl Allowed {
    /// Return whether `c` may be typed into a slot.
    pub fn accepts(self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        match self {
            Allowed::Any => true,
            Allowed::Numeric => c.is_ascii_digit(),
            Allowed::Alphanumeric => c.is_ascii_alphanumeric(),
        }
    }

    /// Drop every character this class rejects.
    pub fn filter(self, text: &str) -> String {
        text.chars().filter(|&c| self.accepts(c)).collect()
    }
}

/// Configuration for a PIN input.
///
/// All fields have defaults matching a four-digit verification code. Override
/// them with the builder methods:
///
/// ```rust
/// use pinbox_machine::{Allowed, PinInputConfig};
///
/// let config = PinInputConfig::default()
///     .with_length(6)
///     .with_allowed(Allowed::Numeric)
///     .with_mask('*');
/// assert_eq!(config.length, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinInputConfig {
    /// Number of character slots (default: 4).
    pub length: usize,
    /// Render every filled slot as this character instead of its value.
    pub mask: Option<char>,
    /// Character drawn in empty slots (default: `○`).
    pub placeholder: char,
    /// Character class accepted from the keyboard and clipboard.
    pub allowed: Allowed,
}

impl Default for PinInputConfig {
    fn default() -> Self {
        Self {
            length: 4,
            mask: None,
            placeholder: '○',
            allowed: Allowed::Any,
        }
    }
}

impl PinInputConfig {
    /// Set the number of slots.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Mask filled slots with `mask`.
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the empty-slot placeholder character.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Restrict accepted characters.
    pub fn with_allowed(mut self, allowed: Allowed) -> Self {
        self.allowed = allowed;
        self
    }
}
