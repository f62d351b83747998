//! Widgets for the **pinbox** runtime.
//!
//! Every widget implements [`pinbox_core::Component`], so it can be embedded
//! in any [`pinbox_core::Model`] and laid out with [`ratatui`].
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pin_input`] | Fixed-length PIN / OTP entry driven by [`pinbox_machine`] |
//! | [`schema_tree`] | Collapsible tree view over a [`pinbox_schema::Schema`] |
//! | [`context_menu`] | Per-node action menu anchored to a tree row |
//! | [`node_editor`] | Form for a node's name, kind and field type |
//! | [`split_pane`] | Left / right panels with a resizable divider |
//! | [`schema_builder`] | The tree, menu, editor and split composed into one page |
//!
//! # Utilities
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chrome`] | Shared borders and focus colours |
//! | [`focus`] | [`FocusGroup`](focus::FocusGroup) for moving focus between panes |
//! | [`key`] | Key bindings and help lines |
//! | [`overlay`] | Positioning and clearing floating popups |

pub mod chrome;
pub mod context_menu;
pub mod focus;
pub mod key;
pub mod node_editor;
pub mod overlay;
pub mod pin_input;
pub mod schema_builder;
pub mod schema_tree;
pub mod split_pane;

pub use pin_input::PinInput;
pub use schema_builder::SchemaBuilder;
