//! Elm-style runtime for the **pinbox** terminal widgets.
//!
//! An application is a [`Model`] driven through an **init -> update -> view**
//! cycle. Side effects leave `update` as [`Command`]s; long-lived event
//! sources enter as [`Subscription`]s. [`Program`] wires a model to a real
//! terminal and [`TestProgram`](testing::TestProgram) drives one headlessly.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application trait |
//! | [`Component`] | Reusable sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | Side effect executed by the runtime |
//! | [`Subscription`] | Terminal events, timers |
//! | [`Program`] | Terminal setup and the event loop |
//!
//! [`Command::next_frame`] delivers a message only after the next frame has
//! been drawn. Widgets use it for work that needs the rendered layout, such as
//! moving the terminal cursor into a box that just appeared.

pub mod command;
pub mod component;
pub mod event;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod subscription;
pub mod subscriptions;
pub mod testing;

pub use command::{Command, TerminalCommand};
pub use component::Component;
pub use event::TerminalEvent;
pub use logging::{init_file_logging, log_to_file};
pub use model::Model;
pub use runtime::{OutputTarget, Program, ProgramError, ProgramOptions};
pub use subscription::{subscribe, Subscription, SubscriptionId, SubscriptionSource};
pub use subscriptions::{terminal_events, Every};

/// Run an application with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
