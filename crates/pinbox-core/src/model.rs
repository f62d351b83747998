use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// A whole application: its state, how messages change it, and how it is
/// drawn.
///
/// [`Program`](crate::Program) calls [`init`](Model::init) once, draws with
/// [`view`](Model::view), then feeds every message from commands and
/// [`subscriptions`](Model::subscriptions) through [`update`](Model::update)
/// and draws again. Messages from [`Command::next_frame`] arrive only after
/// the draw that follows the update which produced them.
pub trait Model: Sized + Send + 'static {
    /// Everything that can happen to the application.
    type Message: Send + 'static;

    /// Startup input handed to [`init`](Model::init), e.g. a configured
    /// widget. `()` when there is none.
    type Flags: Send + 'static;

    /// Build the initial state and the first command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Apply `msg` and return the follow-up work.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Draw the current state. Called once per frame when something changed,
    /// so it must not mutate anything observable.
    fn view(&self, frame: &mut Frame);

    /// The event sources wanted in the current state. Re-read after every
    /// update; sources are kept, started or stopped by
    /// [`SubscriptionId`](crate::SubscriptionId).
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}
