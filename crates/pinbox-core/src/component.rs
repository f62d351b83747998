use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` mirrors [`Model`](crate::Model) except that
/// [`view`](Component::view) receives the area to draw in, so a parent decides
/// where each child goes.
///
/// # Composition pattern
///
/// Wrap the child's message type in a variant of the parent message and lift
/// returned commands with [`Command::map`]:
///
/// ```rust,ignore
/// use pinbox_core::{Command, Component, Model};
/// use pinbox_machine::PinInputConfig;
/// use pinbox_widgets::pin_input::{self, PinInput};
/// use ratatui::Frame;
///
/// struct Verify { pin: PinInput }
///
/// #[derive(Debug)]
/// enum Msg { Pin(pin_input::Message) }
///
/// impl Model for Verify {
///     type Message = Msg;
///     type Flags = PinInput;
///
///     fn init(pin: PinInput) -> (Self, Command<Msg>) {
///         (Verify { pin }, Command::none())
///     }
///
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::Pin(m) => self.pin.update(m).map(Msg::Pin),
///         }
///     }
///
///     fn view(&self, frame: &mut Frame) {
///         self.pin.view(frame, frame.area());
///     }
/// }
///
/// let pin = PinInput::new(PinInputConfig::default())?;
/// pinbox_core::run::<Verify>(pin).await?;
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    ///
    /// The parent should call [`.map()`](Command::map) on the result to lift
    /// it into its own message type.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into `area` of the [`Frame`].
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Declare active subscriptions for this component.
    ///
    /// The parent collects these, maps their messages and returns them from
    /// [`Model::subscriptions`](crate::Model::subscriptions).
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently has focus.
    ///
    /// A routing hint: parents use it to decide which child gets keys.
    fn focused(&self) -> bool {
        false
    }
}
