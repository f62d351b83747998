//! Headless controller for multi-slot PIN / verification-code inputs.
//!
//! A PIN input is a row of single-character slots. Which slot has focus and
//! what each slot holds is decided by a small state machine:
//!
//! | Event | From | To | Effect |
//! |-------|------|----|--------|
//! | `Focus(i)` | `Idle` | `Focused` | focus slot `i` |
//! | `Blur` | `Focused` | `Idle` | clear focus |
//! | `Change` | `Focused` | `Focused` | resolve the typed character, write it, focus the next slot |
//! | `Backspace` | `Focused` | `Focused` | clear a filled slot and focus the previous one |
//! | `Paste` | `Focused` | `Focused` | fill slots from the start, focus the first empty slot |
//!
//! The crate has no UI dependency. Moving real (device) focus is delegated to
//! a [`SlotFocus`] implementation supplied by the presentation layer.

pub mod config;
pub mod error;
pub mod focus;
pub mod machine;
pub mod resolve;

pub use config::{Allowed, PinInputConfig};
pub use error::MachineError;
pub use focus::{NoopFocus, PendingFocus, SlotFocus};
pub use machine::{Event, PinInputMachine, State};
pub use resolve::resolve_value_update;
