//! **pinbox** -- PIN entry and schema editing for [`ratatui`] terminals.
//!
//! This umbrella crate re-exports everything needed to build a pinbox
//! application from a single dependency:
//!
//! * All public items from [`pinbox_core`] at the crate root ([`Model`],
//!   [`Component`], [`Command`], [`Subscription`], [`Program`], [`run`],
//!   [`run_with`], etc.).
//! * [`machine`]: the UI-independent PIN input state machine.
//! * [`schema`]: the schema tree model and its edit operations.
//! * [`widgets`]: the terminal widgets built on both.
//! * [`ratatui`], [`crossterm`] and [`tokio`], so downstream crates do not
//!   need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use pinbox::machine::{Allowed, PinInputConfig};
//! use pinbox::widgets::PinInput;
//!
//! let config = PinInputConfig {
//!     length: 6,
//!     allowed: Allowed::Numeric,
//!     ..PinInputConfig::default()
//! };
//! let pin = PinInput::new(config)?;
//! ```
//!
//! See `demos/pin_input.rs` for a complete program.

pub use pinbox_core::*;

pub mod machine {
    pub use pinbox_machine::*;
}

pub mod schema {
    pub use pinbox_schema::*;
}

pub mod widgets {
    pub use pinbox_widgets::*;
}

pub use crossterm;
pub use ratatui;
pub use tokio;
