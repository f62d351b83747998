//! Multi-box PIN / verification-code input.
//!
//! Slot editing and focus movement are delegated to a
//! [`PinInputMachine`]. This module turns key presses and pastes into machine
//! events, and turns the machine's focus requests into terminal cursor
//! placement.
//!
//! The cursor is moved in two steps. When a transition focuses a slot, the
//! machine records the request in its [`PendingFocus`] capability. The
//! component answers with [`Command::next_frame`] carrying
//! [`Message::ExecuteFocus`], so the cursor only moves once the frame showing
//! the new state has been drawn. A request that arrives for another widget,
//! or for a slot that is no longer focused, is dropped.

use crate::chrome::{slot_block, BLUR_COLOR, FOCUS_COLOR};
use pinbox_core::subscription::{subscribe, Subscription};
use pinbox_core::subscriptions::Every;
use pinbox_core::{Command, Component};
use pinbox_machine::{
    Event, MachineError, PendingFocus, PinInputConfig, PinInputMachine, State,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

const SLOT_WIDTH: u16 = 5;
const SLOT_HEIGHT: u16 = 3;
const SLOT_GAP: u16 = 1;
const BLINK_INTERVAL: Duration = Duration::from_millis(530);

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one `PinInput` instance, used to route deferred focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Messages for the PIN input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Focus a slot, as a click on its box would. While another slot is
    /// focused this blurs first, then focuses `slot`.
    Focus(usize),
    /// Drop focus.
    Blur,
    /// A key press to interpret against the focused slot.
    KeyPress(KeyEvent),
    /// Clipboard text. Trimmed before use; blank text is ignored.
    Paste(String),
    /// Place the terminal cursor in `slot` of `widget`. Sent by the component
    /// itself after the next frame.
    ExecuteFocus {
        /// The widget that asked for focus.
        widget: WidgetId,
        /// The slot to focus.
        slot: usize,
    },
    /// Cursor blink timer.
    BlinkTick,
    /// Emitted after any change to the slot values, carrying the full value.
    Changed(String),
    /// Emitted when the last empty slot is filled.
    Completed(String),
}

/// Styles for the slot boxes.
#[derive(Debug, Clone)]
pub struct PinInputStyle {
    /// Border of an unfocused slot.
    pub border: Style,
    /// Border of the focused slot.
    pub focused_border: Style,
    /// A filled slot's character.
    pub text: Style,
    /// The placeholder in an empty slot.
    pub placeholder: Style,
}

impl Default for PinInputStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(BLUR_COLOR),
            focused_border: Style::default().fg(FOCUS_COLOR),
            text: Style::default().add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::DarkGray),
        }
    }
}

/// A row of single-character boxes for entering a PIN or one-time code.
///
/// ```rust,ignore
/// let pin = PinInput::new(PinInputConfig::default().with_allowed(Allowed::Numeric))?;
/// // In update: forward key, paste and focus messages.
/// // In view:   pin.view(frame, area);
/// ```
pub struct PinInput {
    id: WidgetId,
    machine: PinInputMachine<PendingFocus>,
    config: PinInputConfig,
    style: PinInputStyle,
    executed: Option<usize>,
    cursor_on: bool,
}

impl PinInput {
    /// Create a PIN input. Fails if `config.length` is zero.
    pub fn new(config: PinInputConfig) -> Result<Self, MachineError> {
        let machine = PinInputMachine::from_config(&config, PendingFocus::default())?;
        Ok(Self {
            id: WidgetId::next(),
            machine,
            config,
            style: PinInputStyle::default(),
            executed: None,
            cursor_on: true,
        })
    }

    /// Set the slot styles.
    pub fn with_style(mut self, style: PinInputStyle) -> Self {
        self.style = style;
        self
    }

    /// This widget's identity.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The entered code, empty slots skipped.
    pub fn value(&self) -> String {
        self.machine.value_string()
    }

    /// Per-slot values.
    pub fn slots(&self) -> &[String] {
        self.machine.value()
    }

    /// The slot the machine considers focused.
    pub fn focused_slot(&self) -> Option<usize> {
        self.machine.focused_index()
    }

    /// The slot holding the terminal cursor, once focus has been executed.
    pub fn executed_slot(&self) -> Option<usize> {
        self.executed
    }

    /// Whether every slot is filled.
    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    /// The underlying state machine.
    pub fn machine(&self) -> &PinInputMachine<PendingFocus> {
        &self.machine
    }

    /// The configuration this input was built with.
    pub fn config(&self) -> &PinInputConfig {
        &self.config
    }

    /// Empty every slot, keeping focus where it is.
    pub fn clear(&mut self) {
        self.machine.clear();
    }

    /// Width needed to draw every slot, saturating at `u16::MAX`.
    pub fn width(&self) -> u16 {
        let n = u16::try_from(self.machine.len()).unwrap_or(u16::MAX);
        n.saturating_mul(SLOT_WIDTH)
            .saturating_add(n.saturating_sub(1).saturating_mul(SLOT_GAP))
    }

    /// Height of the slot row.
    pub fn height(&self) -> u16 {
        SLOT_HEIGHT
    }

    /// Send one machine event and translate its effects into commands.
    fn dispatch(&mut self, event: Event) -> Command<Message> {
        let before = self.machine.value().to_vec();
        let was_complete = self.machine.is_complete();

        if !self.machine.send(event) {
            return Command::none();
        }
        if self.machine.state() == State::Idle {
            self.executed = None;
        }

        let mut cmds = Vec::new();
        if let Some(slot) = self.machine.focus_capability_mut().take() {
            cmds.push(Command::next_frame(Message::ExecuteFocus {
                widget: self.id,
                slot,
            }));
        }
        if self.machine.value() != before.as_slice() {
            let value = self.machine.value_string();
            cmds.push(Command::message(Message::Changed(value.clone())));
            if !was_complete && self.machine.is_complete() {
                tracing::debug!(widget = self.id.0, "pin completed");
                cmds.push(Command::message(Message::Completed(value)));
            }
        }
        Command::batch(cmds)
    }

    /// Blur then focus another slot, the order a browser reports a click on
    /// a neighbouring box.
    fn refocus(&mut self, slot: usize) -> Command<Message> {
        let blur = self.dispatch(Event::Blur);
        let focus = self.dispatch(Event::Focus(slot));
        Command::batch([blur, focus])
    }

    fn click(&mut self, slot: usize) -> Command<Message> {
        match self.machine.focused_index() {
            None => self.dispatch(Event::Focus(slot)),
            Some(current) if current == slot || slot >= self.machine.len() => Command::none(),
            Some(_) => self.refocus(slot),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        let Some(index) = self.machine.focused_index() else {
            return match key.code {
                KeyCode::Enter | KeyCode::Tab => {
                    let target = self.first_empty_slot();
                    self.dispatch(Event::Focus(target))
                }
                _ => Command::none(),
            };
        };
        let last = self.machine.len() - 1;

        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if !self.config.allowed.accepts(c) {
                    tracing::trace!(%c, "rejected character");
                    return Command::none();
                }
                let mut value = self.machine.slot(index).unwrap_or_default().to_string();
                value.push(c);
                self.dispatch(Event::Change { index, value })
            }
            KeyCode::Backspace => self.dispatch(Event::Backspace(index)),
            KeyCode::Left | KeyCode::BackTab if index > 0 => self.refocus(index - 1),
            KeyCode::Right | KeyCode::Tab if index < last => self.refocus(index + 1),
            KeyCode::Home if index > 0 => self.refocus(0),
            KeyCode::End if index < last => self.refocus(last),
            KeyCode::Esc => self.dispatch(Event::Blur),
            _ => Command::none(),
        }
    }

    fn first_empty_slot(&self) -> usize {
        self.machine
            .value()
            .iter()
            .position(String::is_empty)
            .unwrap_or(0)
    }

    fn slot_area(&self, area: Rect, index: usize) -> Option<Rect> {
        let offset = index.checked_mul(usize::from(SLOT_WIDTH + SLOT_GAP))?;
        let x = area.x.checked_add(u16::try_from(offset).ok()?)?;
        let rect = Rect::new(x, area.y, SLOT_WIDTH, SLOT_HEIGHT);
        (rect.right() <= area.right() && rect.bottom() <= area.bottom()).then_some(rect)
    }

    fn glyph(&self, value: &str) -> (char, Style) {
        match value.chars().next() {
            Some(c) => (self.config.mask.unwrap_or(c), self.style.text),
            None => (self.config.placeholder, self.style.placeholder),
        }
    }
}

impl Component for PinInput {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Focus(slot) => self.click(slot),
            Message::Blur => self.dispatch(Event::Blur),
            Message::KeyPress(key) => self.handle_key(key),
            Message::Paste(text) => {
                let text = self.config.allowed.filter(text.trim());
                if text.is_empty() {
                    return Command::none();
                }
                self.dispatch(Event::Paste(text))
            }
            Message::ExecuteFocus { widget, slot } => {
                if widget != self.id || self.machine.focused_index() != Some(slot) {
                    tracing::trace!(?widget, slot, "stale focus request dropped");
                    return Command::none();
                }
                self.executed = Some(slot);
                self.cursor_on = true;
                Command::none()
            }
            Message::BlinkTick => {
                self.cursor_on = !self.cursor_on;
                Command::none()
            }
            Message::Changed(_) | Message::Completed(_) => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        for (index, value) in self.machine.value().iter().enumerate() {
            let Some(slot) = self.slot_area(area, index) else {
                break;
            };
            let border = if self.machine.focused_index() == Some(index) {
                self.style.focused_border
            } else {
                self.style.border
            };
            let block = slot_block(border);
            let inner = block.inner(slot);
            frame.render_widget(block, slot);

            let (glyph, style) = self.glyph(value);
            let width = glyph.width().unwrap_or(1) as u16;
            let x = inner.x + inner.width.saturating_sub(width) / 2;
            let cell = Rect::new(x, inner.y, width.min(inner.width), 1);
            frame.render_widget(Paragraph::new(Span::styled(glyph.to_string(), style)), cell);

            if self.executed == Some(index) && self.cursor_on {
                frame.set_cursor_position(Position::new(x, inner.y));
            }
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.executed.is_some() {
            let blink = Every::new(BLINK_INTERVAL, "pin-input-blink").keyed(self.id.0);
            vec![subscribe(blink).map(|_| Message::BlinkTick)]
        } else {
            vec![]
        }
    }

    fn focused(&self) -> bool {
        self.machine.state() == State::Focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinbox_core::testing::{buffer_to_string, TestProgram};
    use pinbox_core::Model;
    use pinbox_machine::Allowed;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn pin() -> PinInput {
        PinInput::new(PinInputConfig::default()).unwrap()
    }

    fn key(code: KeyCode) -> Message {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Apply a message and everything it produces immediately. Deferred
    /// messages are returned instead of being applied.
    fn run(pin: &mut PinInput, msg: Message) -> (Vec<Message>, Vec<Message>) {
        let mut emitted = Vec::new();
        let mut deferred = Vec::new();
        let mut queue = vec![msg];
        while let Some(msg) = queue.pop() {
            let (now, later) = pin.update(msg).into_messages();
            deferred.extend(later);
            for m in now {
                emitted.push(m.clone());
                queue.push(m);
            }
        }
        (emitted, deferred)
    }

    fn draw(pin: &PinInput) -> (String, Position) {
        let mut terminal = Terminal::new(TestBackend::new(24, 3)).unwrap();
        terminal.draw(|f| pin.view(f, f.area())).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        (buffer_to_string(terminal.backend().buffer()), cursor)
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = PinInput::new(PinInputConfig::default().with_length(0));
        assert!(matches!(err, Err(MachineError::NoSlots)));
    }

    #[test]
    fn focus_defers_cursor_to_next_frame() {
        let mut pin = pin();
        let (_, deferred) = run(&mut pin, Message::Focus(1));
        assert_eq!(pin.focused_slot(), Some(1));
        assert_eq!(pin.executed_slot(), None);
        assert_eq!(
            deferred,
            vec![Message::ExecuteFocus { widget: pin.id(), slot: 1 }]
        );

        run(&mut pin, deferred[0].clone());
        assert_eq!(pin.executed_slot(), Some(1));
    }

    #[test]
    fn typing_fills_and_advances() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        let (emitted, deferred) = run(&mut pin, key(KeyCode::Char('7')));
        assert_eq!(pin.slots(), ["7", "", "", ""]);
        assert_eq!(pin.focused_slot(), Some(1));
        assert_eq!(emitted, vec![Message::Changed("7".into())]);
        assert_eq!(
            deferred,
            vec![Message::ExecuteFocus { widget: pin.id(), slot: 1 }]
        );
    }

    #[test]
    fn typing_over_a_filled_slot_keeps_new_char() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        run(&mut pin, Message::Paste("12".into()));
        run(&mut pin, key(KeyCode::Home));
        assert_eq!(pin.focused_slot(), Some(0));
        run(&mut pin, key(KeyCode::Char('9')));
        assert_eq!(pin.slots(), ["9", "2", "", ""]);
    }

    #[test]
    fn completion_is_emitted_once() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        for c in ['1', '2', '3'] {
            run(&mut pin, key(KeyCode::Char(c)));
        }
        let (emitted, _) = run(&mut pin, key(KeyCode::Char('4')));
        assert!(emitted.contains(&Message::Completed("1234".into())));

        let (emitted, _) = run(&mut pin, key(KeyCode::Char('5')));
        assert_eq!(pin.value(), "1235");
        assert!(!emitted.iter().any(|m| matches!(m, Message::Completed(_))));
    }

    #[test]
    fn backspace_clears_and_moves_back() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        run(&mut pin, Message::Paste("12".into()));
        run(&mut pin, key(KeyCode::Left));
        assert_eq!(pin.focused_slot(), Some(1));

        run(&mut pin, key(KeyCode::Backspace));
        assert_eq!(pin.slots(), ["1", "", "", ""]);
        assert_eq!(pin.focused_slot(), Some(0));
    }

    #[test]
    fn backspace_on_empty_slot_does_not_move() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(2));
        let (emitted, deferred) = run(&mut pin, key(KeyCode::Backspace));
        assert_eq!(pin.focused_slot(), Some(2));
        assert!(emitted.is_empty());
        assert!(deferred.is_empty());
    }

    #[test]
    fn paste_is_trimmed_and_filtered() {
        let mut pin = PinInput::new(PinInputConfig::default().with_allowed(Allowed::Numeric))
            .unwrap();
        run(&mut pin, Message::Focus(0));
        run(&mut pin, Message::Paste("  12-34 \n".into()));
        assert_eq!(pin.slots(), ["1", "2", "3", "4"]);
        assert_eq!(pin.focused_slot(), Some(3));
    }

    #[test]
    fn blank_paste_is_ignored() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        let (emitted, deferred) = run(&mut pin, Message::Paste("   ".into()));
        assert!(emitted.is_empty() && deferred.is_empty());
        assert_eq!(pin.value(), "");
    }

    #[test]
    fn disallowed_key_is_dropped() {
        let mut pin = PinInput::new(PinInputConfig::default().with_allowed(Allowed::Numeric))
            .unwrap();
        run(&mut pin, Message::Focus(0));
        run(&mut pin, key(KeyCode::Char('x')));
        assert_eq!(pin.value(), "");
        assert_eq!(pin.focused_slot(), Some(0));
    }

    #[test]
    fn arrow_keys_blur_then_focus() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        let (_, deferred) = run(&mut pin, key(KeyCode::Right));
        assert_eq!(pin.focused_slot(), Some(1));
        assert_eq!(
            deferred,
            vec![Message::ExecuteFocus { widget: pin.id(), slot: 1 }]
        );

        run(&mut pin, key(KeyCode::Left));
        run(&mut pin, key(KeyCode::Left));
        assert_eq!(pin.focused_slot(), Some(0));
    }

    #[test]
    fn escape_blurs_and_hides_cursor() {
        let mut pin = pin();
        let (_, deferred) = run(&mut pin, Message::Focus(0));
        run(&mut pin, deferred[0].clone());
        assert!(pin.executed_slot().is_some());

        run(&mut pin, key(KeyCode::Esc));
        assert_eq!(pin.focused_slot(), None);
        assert_eq!(pin.executed_slot(), None);
        assert!(!pin.focused());
    }

    #[test]
    fn stale_focus_requests_are_dropped() {
        let mut pin = pin();
        let (_, first) = run(&mut pin, Message::Focus(0));
        run(&mut pin, key(KeyCode::Right));
        // The request for slot 0 arrives after focus already moved on.
        run(&mut pin, first[0].clone());
        assert_eq!(pin.executed_slot(), None);

        let other = PinInput::new(PinInputConfig::default()).unwrap();
        run(
            &mut pin,
            Message::ExecuteFocus { widget: other.id(), slot: 1 },
        );
        assert_eq!(pin.executed_slot(), None);
    }

    #[test]
    fn enter_focuses_first_empty_slot_when_idle() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        run(&mut pin, Message::Paste("1".into()));
        run(&mut pin, key(KeyCode::Esc));
        run(&mut pin, key(KeyCode::Enter));
        assert_eq!(pin.focused_slot(), Some(1));
    }

    #[test]
    fn renders_placeholder_mask_and_cursor() {
        let mut pin = PinInput::new(PinInputConfig::default().with_mask('•')).unwrap();
        let (_, deferred) = run(&mut pin, Message::Focus(0));
        run(&mut pin, deferred[0].clone());
        let (_, deferred) = run(&mut pin, key(KeyCode::Char('5')));
        run(&mut pin, deferred[0].clone());

        let (screen, cursor) = draw(&pin);
        let middle = screen.lines().nth(1).unwrap();
        assert!(middle.contains('•'));
        assert!(!middle.contains('5'));
        assert_eq!(middle.matches('○').count(), 3);
        // Slot 1 starts at x = 6; its inner cell is centred at x = 8.
        assert_eq!(cursor, Position::new(8, 1));
    }

    #[test]
    fn width_covers_all_slots() {
        assert_eq!(pin().width(), 4 * 5 + 3);
    }

    #[test]
    fn long_inputs_saturate_geometry() {
        let mut pin = PinInput::new(PinInputConfig::default().with_length(20_000)).unwrap();
        assert_eq!(pin.width(), u16::MAX);

        let (_, deferred) = run(&mut pin, Message::Focus(19_999));
        run(&mut pin, deferred[0].clone());
        let (screen, _) = draw(&pin);
        // Only the slots that fit are drawn.
        assert_eq!(screen.lines().nth(1).unwrap().matches('○').count(), 4);
        assert_eq!(pin.slot_area(Rect::new(0, 0, u16::MAX, 3), 19_999), None);
    }

    #[test]
    fn focus_message_moves_between_slots() {
        let mut pin = pin();
        run(&mut pin, Message::Focus(0));
        let (_, deferred) = run(&mut pin, Message::Focus(2));
        assert_eq!(pin.focused_slot(), Some(2));
        assert_eq!(
            deferred,
            vec![Message::ExecuteFocus { widget: pin.id(), slot: 2 }]
        );

        let (emitted, deferred) = run(&mut pin, Message::Focus(2));
        assert!(emitted.is_empty() && deferred.is_empty());
        run(&mut pin, Message::Focus(9));
        assert_eq!(pin.focused_slot(), Some(2));
    }

    #[test]
    fn each_input_blinks_on_its_own_timer() {
        let mut a = pin();
        let mut b = pin();
        for input in [&mut a, &mut b] {
            let (_, deferred) = run(input, Message::Focus(0));
            run(input, deferred[0].clone());
        }
        let a_ids: Vec<_> = a.subscriptions().iter().map(|sub| sub.id().clone()).collect();
        let b_ids: Vec<_> = b.subscriptions().iter().map(|sub| sub.id().clone()).collect();
        assert_eq!(a_ids.len(), 1);
        assert_ne!(a_ids, b_ids);
    }

    #[test]
    fn blink_subscription_follows_executed_focus() {
        let mut pin = pin();
        assert!(pin.subscriptions().is_empty());
        let (_, deferred) = run(&mut pin, Message::Focus(0));
        run(&mut pin, deferred[0].clone());
        assert_eq!(pin.subscriptions().len(), 1);

        run(&mut pin, Message::BlinkTick);
        let (_, cursor) = draw(&pin);
        assert_ne!(cursor, Position::new(2, 1));
    }

    struct Verify {
        pin: PinInput,
        completed: Option<String>,
    }

    #[derive(Debug)]
    enum VerifyMsg {
        Pin(Message),
    }

    impl Model for Verify {
        type Message = VerifyMsg;
        type Flags = ();

        fn init(_: ()) -> (Self, Command<VerifyMsg>) {
            let mut verify = Verify {
                pin: PinInput::new(PinInputConfig::default()).unwrap(),
                completed: None,
            };
            let cmd = verify.pin.update(Message::Focus(0)).map(VerifyMsg::Pin);
            (verify, cmd)
        }

        fn update(&mut self, msg: VerifyMsg) -> Command<VerifyMsg> {
            match msg {
                VerifyMsg::Pin(Message::Completed(code)) => {
                    self.completed = Some(code);
                    Command::none()
                }
                VerifyMsg::Pin(m) => self.pin.update(m).map(VerifyMsg::Pin),
            }
        }

        fn view(&self, frame: &mut Frame) {
            self.pin.view(frame, frame.area());
        }
    }

    #[test]
    fn program_delivers_focus_after_frame() {
        let mut prog = TestProgram::<Verify>::new(());
        assert_eq!(prog.model().pin.executed_slot(), None);
        assert_eq!(prog.frame_pending(), 1);

        prog.flush_frame();
        assert_eq!(prog.model().pin.executed_slot(), Some(0));

        prog.send(VerifyMsg::Pin(Message::Paste("4321".into())));
        prog.flush_frame();
        assert_eq!(prog.model().completed.as_deref(), Some("4321"));
        assert_eq!(prog.model().pin.executed_slot(), Some(3));
    }
}
