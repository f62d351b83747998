use crate::command::{Command, CommandInner, TerminalCommand};
use crate::logging::init_file_logging;
use crate::model::Model;
use crate::subscription::SubscriptionManager;
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// Where the terminal UI is drawn.
///
/// Render to [`Stderr`](OutputTarget::Stderr) when stdout is piped, e.g. when
/// a verification prompt prints the entered code for a calling script.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout (default).
    #[default]
    Stdout,
    /// Write to stderr.
    Stderr,
}

impl OutputTarget {
    fn writer(self) -> Output {
        match self {
            OutputTarget::Stdout => Output::Stdout(io::stdout()),
            OutputTarget::Stderr => Output::Stderr(io::stderr()),
        }
    }
}

enum Output {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(w) => w.write(buf),
            Output::Stderr(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(w) => w.flush(),
            Output::Stderr(w) => w.flush(),
        }
    }
}

type Screen = Terminal<CrosstermBackend<Output>>;

/// Errors that can occur while initializing or running a [`Program`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// An I/O error from terminal setup, rendering, or teardown.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The log subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Configuration options for a [`Program`].
///
/// Override only what you need with struct update syntax:
///
/// ```rust,ignore
/// use pinbox_core::{OutputTarget, ProgramOptions};
///
/// let opts = ProgramOptions {
///     title: Some("Verify".into()),
///     log_file: Some("pinbox.log".into()),
///     output: OutputTarget::Stderr,
///     ..ProgramOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Frames per second, clamped to `1..=120` (default: 60).
    pub fps: u32,
    /// Draw on the alternate screen (default: true).
    pub alt_screen: bool,
    /// Deliver pasted text as a single event (default: true).
    pub bracketed_paste: bool,
    /// Report terminal focus gained / lost (default: false).
    pub focus_reporting: bool,
    /// Terminal window title.
    pub title: Option<String>,
    /// Restore the terminal before a panic message is printed (default: true).
    pub catch_panics: bool,
    /// End the program on Ctrl+C signals (default: true).
    pub handle_signals: bool,
    /// Write `tracing` output to this file.
    pub log_file: Option<PathBuf>,
    /// Output target: stdout (default) or stderr.
    pub output: OutputTarget,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            alt_screen: true,
            bracketed_paste: true,
            focus_reporting: false,
            title: None,
            catch_panics: true,
            handle_signals: true,
            log_file: None,
            output: OutputTarget::default(),
        }
    }
}

impl ProgramOptions {
    fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.clamp(1, 120)))
    }
}

/// The terminal modes a program switches on at start and back off at exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TerminalModes {
    alt_screen: bool,
    bracketed_paste: bool,
    focus_reporting: bool,
    output: OutputTarget,
}

impl From<&ProgramOptions> for TerminalModes {
    fn from(options: &ProgramOptions) -> Self {
        Self {
            alt_screen: options.alt_screen,
            bracketed_paste: options.bracketed_paste,
            focus_reporting: options.focus_reporting,
            output: options.output,
        }
    }
}

impl TerminalModes {
    fn enter(self, title: Option<&str>) -> io::Result<Screen> {
        enable_raw_mode()?;
        let mut out = self.output.writer();
        if self.alt_screen {
            execute!(out, EnterAlternateScreen)?;
        }
        if self.bracketed_paste {
            execute!(out, EnableBracketedPaste)?;
        }
        if self.focus_reporting {
            execute!(out, EnableFocusChange)?;
        }
        if let Some(title) = title {
            execute!(out, SetTitle(title))?;
        }
        execute!(out, cursor::Hide)?;
        tracing::trace!(modes = ?self, "terminal modes entered");
        Terminal::new(CrosstermBackend::new(out))
    }

    /// Undo [`enter`](Self::enter). Every step runs even if an earlier one
    /// fails; only the raw-mode result is reported.
    fn leave(self) -> io::Result<()> {
        let raw = disable_raw_mode();
        let mut out = self.output.writer();
        if self.bracketed_paste {
            execute!(out, DisableBracketedPaste).ok();
        }
        if self.focus_reporting {
            execute!(out, DisableFocusChange).ok();
        }
        execute!(out, cursor::Show).ok();
        if self.alt_screen {
            execute!(out, LeaveAlternateScreen).ok();
        }
        raw
    }

    /// Leave these modes before the previous panic hook prints. Installed
    /// once per process.
    fn restore_on_panic(self) {
        static HOOK: Once = Once::new();
        HOOK.call_once(move || {
            let previous = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = self.leave();
                previous(info);
            }));
        });
    }
}

/// The program runtime: terminal setup, the event loop, and the [`Model`]
/// lifecycle.
///
/// Messages are processed one at a time on a single task. Messages produced
/// by [`Command::next_frame`] are held until the next frame has been drawn
/// and then enqueued like any other message.
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> Result<(), pinbox_core::ProgramError> {
///     let model = pinbox_core::Program::<Verify>::new(pin)?.run().await?;
///     Ok(())
/// }
/// ```
pub struct Program<M: Model> {
    model: M,
    screen: Screen,
    modes: TerminalModes,
    options: ProgramOptions,
    msg_tx: mpsc::UnboundedSender<M::Message>,
    msg_rx: mpsc::UnboundedReceiver<M::Message>,
    subscriptions: SubscriptionManager<M::Message>,
    after_frame: Vec<M::Message>,
    needs_redraw: bool,
    should_quit: bool,
}

impl<M: Model> Program<M> {
    /// Create a new program with default options.
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Create a new program with custom options.
    ///
    /// Installs the file logger first when [`ProgramOptions::log_file`] is
    /// set, so terminal setup is logged too.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        if let Some(path) = &options.log_file {
            init_file_logging(path)?;
        }

        let modes = TerminalModes::from(&options);
        if options.catch_panics {
            modes.restore_on_panic();
        }
        let screen = modes.enter(options.title.as_deref())?;

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            screen,
            modes,
            subscriptions: SubscriptionManager::new(msg_tx.clone()),
            msg_tx,
            msg_rx,
            options,
            after_frame: Vec::new(),
            needs_redraw: true,
            should_quit: false,
        };
        tracing::debug!(fps = program.options.fps, modes = ?program.modes, "program initialized");

        program.execute(init_cmd);
        program.reconcile();
        Ok(program)
    }

    /// A sender for injecting messages from outside the program.
    pub fn sender(&self) -> mpsc::UnboundedSender<M::Message> {
        self.msg_tx.clone()
    }

    /// Run until a quit command or Ctrl+C, returning the final model.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let result = self.event_loop().await;

        tracing::debug!(ok = result.is_ok(), "shutting down");
        self.subscriptions.shutdown();
        let restored = self.modes.leave();
        settle(result, restored).map(|()| self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        self.render()?;
        let mut frames = frame_clock(self.options.frame_period());
        let handle_signals = self.options.handle_signals;

        loop {
            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c(), if handle_signals => {
                    tracing::debug!("received ctrl+c signal");
                    return Ok(());
                }

                Some(msg) = self.msg_rx.recv() => {
                    if self.drain(msg).is_break() {
                        return Ok(());
                    }
                }

                _ = frames.tick(), if self.needs_redraw => self.render()?,
            }
        }
    }

    /// Process `first` and everything already queued behind it, stopping
    /// early on quit.
    fn drain(&mut self, first: M::Message) -> ControlFlow<()> {
        let mut handled = 0usize;
        let mut next = Some(first);
        while let Some(msg) = next {
            self.process(msg);
            handled += 1;
            if self.should_quit {
                tracing::debug!(handled, "quit requested");
                return ControlFlow::Break(());
            }
            next = self.msg_rx.try_recv().ok();
        }
        tracing::trace!(handled, "messages processed");
        ControlFlow::Continue(())
    }

    fn process(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute(cmd);
        self.reconcile();
        self.needs_redraw = true;
    }

    fn reconcile(&mut self) {
        let subs = self.model.subscriptions();
        self.subscriptions.reconcile(subs);
    }

    fn execute(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Message(msg) => self.enqueue(msg),
            CommandInner::Quit => self.should_quit = true,
            CommandInner::Future(fut) => {
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(fut.await);
                });
            }
            CommandInner::NextFrame(msg) => {
                self.after_frame.push(msg);
                self.needs_redraw = true;
            }
            CommandInner::Batch(cmds) => cmds.into_iter().for_each(|cmd| self.execute(cmd)),
            CommandInner::Terminal(tcmd) => self.execute_terminal(tcmd),
        }
    }

    fn enqueue(&self, msg: M::Message) {
        // The receiver lives as long as `self`.
        let _ = self.msg_tx.send(msg);
    }

    fn execute_terminal(&mut self, cmd: TerminalCommand) {
        tracing::trace!(?cmd, "terminal command");
        let mut out = self.options.output.writer();
        match cmd {
            TerminalCommand::SetTitle(title) => {
                if let Err(err) = execute!(out, SetTitle(title)) {
                    tracing::warn!(%err, "setting terminal title failed");
                }
            }
            TerminalCommand::Suspend => self.suspend(),
        }
    }

    /// Hand the terminal back to the shell (SIGTSTP) and take it over again
    /// once resumed.
    fn suspend(&mut self) {
        if let Err(err) = self.modes.leave() {
            tracing::warn!(%err, "terminal restore before suspend failed");
        }

        #[cfg(unix)]
        // SAFETY: raise only signals the current process.
        unsafe {
            libc::raise(libc::SIGTSTP);
        }

        match self.modes.enter(self.options.title.as_deref()) {
            Ok(screen) => {
                self.screen = screen;
                self.needs_redraw = true;
            }
            Err(err) => {
                tracing::error!(%err, "terminal re-init after suspend failed");
                self.should_quit = true;
            }
        }
    }

    /// Draw a frame, then release the messages that were waiting for it.
    fn render(&mut self) -> Result<(), ProgramError> {
        self.screen.draw(|frame| self.model.view(frame))?;
        self.needs_redraw = false;
        if !self.after_frame.is_empty() {
            tracing::trace!(count = self.after_frame.len(), "releasing next-frame messages");
        }
        for msg in std::mem::take(&mut self.after_frame) {
            self.enqueue(msg);
        }
        Ok(())
    }
}

/// Combine the event loop's outcome with the terminal restore. An error from
/// the loop is reported over a failed restore, which is only logged.
fn settle(run: Result<(), ProgramError>, restored: io::Result<()>) -> Result<(), ProgramError> {
    match run {
        Err(err) => {
            if let Err(restore_err) = restored {
                tracing::warn!(error = %restore_err, "terminal restore failed after loop error");
            }
            Err(err)
        }
        Ok(()) => restored.map_err(ProgramError::from),
    }
}

fn frame_clock(period: Duration) -> Interval {
    let mut clock = tokio::time::interval(period);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    clock
}
