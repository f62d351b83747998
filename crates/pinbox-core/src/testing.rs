use crate::command::Command;
use crate::model::Model;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// A headless harness that drives a [`Model`] without a real terminal.
///
/// Immediate messages from [`Command::message`] are queued and processed by
/// [`drain_messages`](TestProgram::drain_messages). Messages from
/// [`Command::next_frame`] wait until [`flush_frame`](TestProgram::flush_frame)
/// draws a frame, mirroring the runtime. Async and terminal commands are
/// ignored.
///
/// ```rust,ignore
/// use pinbox_core::testing::TestProgram;
///
/// let mut prog = TestProgram::<Verify>::new(4);
/// prog.send(Msg::Pin(PinInputMessage::Focus(0)));
/// prog.flush_frame();                          // delivers ExecuteFocus
/// assert_eq!(prog.model().pin.executed_slot(), Some(0));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    frame_messages: Vec<M::Message>,
    quit_requested: bool,
    size: (u16, u16),
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            frame_messages: Vec::new(),
            quit_requested: false,
            size: DEFAULT_SIZE,
        };
        program.collect(init_cmd);
        program
    }

    /// Set the frame size used by [`flush_frame`](TestProgram::flush_frame).
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = (width, height);
        self
    }

    /// Send a message, triggering a single update. Resulting commands are
    /// queued, not processed.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Process queued immediate messages until none are left.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Drain immediate messages, draw a frame, then deliver the messages that
    /// were waiting for it (and anything they produce immediately).
    pub fn flush_frame(&mut self) {
        self.drain_messages();
        let (width, height) = self.size;
        draw(&self.model, width, height);
        let waiting: Vec<_> = self.frame_messages.drain(..).collect();
        self.pending_messages.extend(waiting);
        self.drain_messages();
    }

    /// Number of messages waiting for the next frame.
    pub fn frame_pending(&self) -> usize {
        self.frame_messages.len()
    }

    /// Whether any command so far asked the program to quit.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable reference to the model, bypassing the update cycle.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        draw(&self.model, width, height)
    }

    /// Render the model and return the visible content, one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        if cmd.is_quit() {
            self.quit_requested = true;
        }
        let (now, later) = cmd.into_messages();
        self.pending_messages.extend(now);
        self.frame_messages.extend(later);
    }
}

fn draw<M: Model>(model: &M, width: u16, height: u16) -> Buffer {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| model.view(frame)).unwrap();
    terminal.backend().buffer().clone()
}

/// Flatten a buffer into text, rows separated by newlines.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    struct Steps {
        log: Vec<String>,
    }

    #[derive(Debug)]
    enum StepMsg {
        Start,
        Now(&'static str),
        AfterFrame(&'static str),
        Stop,
    }

    impl Model for Steps {
        type Message = StepMsg;
        type Flags = ();

        fn init(_: ()) -> (Self, Command<StepMsg>) {
            (Steps { log: vec![] }, Command::none())
        }

        fn update(&mut self, msg: StepMsg) -> Command<StepMsg> {
            match msg {
                StepMsg::Start => Command::batch([
                    Command::next_frame(StepMsg::AfterFrame("late")),
                    Command::message(StepMsg::Now("early")),
                ]),
                StepMsg::Now(s) | StepMsg::AfterFrame(s) => {
                    self.log.push(s.to_string());
                    Command::none()
                }
                StepMsg::Stop => Command::quit(),
            }
        }

        fn view(&self, frame: &mut ratatui::Frame) {
            frame.render_widget(Paragraph::new(self.log.join(",")), frame.area());
        }
    }

    #[test]
    fn drain_processes_immediate_messages_only() {
        let mut prog = TestProgram::<Steps>::new(());
        prog.send(StepMsg::Start);
        prog.drain_messages();
        assert_eq!(prog.model().log, vec!["early"]);
        assert_eq!(prog.frame_pending(), 1);
    }

    #[test]
    fn flush_frame_delivers_deferred_messages_after_draw() {
        let mut prog = TestProgram::<Steps>::new(());
        prog.send(StepMsg::Start);
        prog.flush_frame();
        assert_eq!(prog.model().log, vec!["early", "late"]);
        assert_eq!(prog.frame_pending(), 0);
    }

    #[test]
    fn render_string_shows_model() {
        let mut prog = TestProgram::<Steps>::new(());
        prog.send(StepMsg::Now("hello"));
        assert!(prog.render_string(20, 1).starts_with("hello"));
    }

    #[test]
    fn quit_is_recorded() {
        let mut prog = TestProgram::<Steps>::new(());
        assert!(!prog.quit_requested());
        prog.send(StepMsg::Stop);
        assert!(prog.quit_requested());
    }
}
