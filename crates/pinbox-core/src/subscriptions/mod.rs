//! Built-in subscription sources.
//!
//! - **Terminal events** ([`terminal_events`]): keys, resize, focus and paste.
//! - **Timers** ([`Every`]): repeating ticks, e.g. for cursor blinking.

mod terminal;
mod timer;

pub use terminal::*;
pub use timer::*;
