use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A side effect returned from [`Model::update`](crate::Model::update) or
/// [`Model::init`](crate::Model::init).
///
/// Commands carry immediate messages, async work, messages deferred until
/// after the next render, terminal management and program exit.
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Deliver a message once the next frame has been drawn:
/// let cmd = Command::next_frame(Msg::FocusSlot(2));
///
/// // Quit the program:
/// let cmd = Command::quit();
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Message(Msg),
    Quit,
    Future(BoxFuture<'static, Msg>),
    /// Delivered after the next successful render.
    NextFrame(Msg),
    Batch(Vec<Command<Msg>>),
    Terminal(TerminalCommand),
}

/// Terminal management commands executed by the runtime.
///
/// Cursor visibility is not here: a frame that sets a cursor position shows
/// the cursor, any other frame hides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Set the terminal window title.
    SetTitle(String),
    /// Suspend the process (SIGTSTP on Unix), restoring the terminal first.
    Suspend,
}

impl<Msg: Send + 'static> From<TerminalCommand> for Command<Msg> {
    fn from(cmd: TerminalCommand) -> Self {
        Self::wrap(CommandInner::Terminal(cmd))
    }
}

impl<Msg: Send + 'static> Command<Msg> {
    fn wrap(inner: CommandInner<Msg>) -> Self {
        Command { inner }
    }

    /// No-op command.
    pub fn none() -> Self {
        Self::wrap(CommandInner::None)
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Self::wrap(CommandInner::Message(msg))
    }

    /// Send a message right after the next frame is drawn.
    ///
    /// Use this for effects that depend on what is on screen, such as
    /// placing the terminal cursor in a widget that was just re-rendered.
    pub fn next_frame(msg: Msg) -> Self {
        Self::wrap(CommandInner::NextFrame(msg))
    }

    /// Run `future` on the runtime and deliver its mapped output.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::wrap(CommandInner::Future(Box::pin(async move { map(future.await) })))
    }

    /// Quit the program.
    pub fn quit() -> Self {
        Self::wrap(CommandInner::Quit)
    }

    /// Run several commands. No-ops are dropped and a single survivor is
    /// returned as is.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        if cmds.len() > 1 {
            return Self::wrap(CommandInner::Batch(cmds));
        }
        cmds.pop().unwrap_or_else(Command::none)
    }

    /// Set the terminal window title.
    pub fn set_title(title: impl Into<String>) -> Self {
        TerminalCommand::SetTitle(title.into()).into()
    }

    /// Suspend the process until it is resumed from the shell.
    pub fn suspend() -> Self {
        TerminalCommand::Suspend.into()
    }

    /// Transform the message type, for lifting a component's commands into
    /// its parent's message space.
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        let f: Arc<dyn Fn(Msg) -> NewMsg + Send + Sync> = Arc::new(f);
        self.map_shared(&f)
    }

    fn map_shared<NewMsg: Send + 'static>(
        self,
        f: &Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        let inner = match self.inner {
            CommandInner::None => CommandInner::None,
            CommandInner::Quit => CommandInner::Quit,
            CommandInner::Message(msg) => CommandInner::Message(f(msg)),
            CommandInner::NextFrame(msg) => CommandInner::NextFrame(f(msg)),
            CommandInner::Future(fut) => {
                let f = Arc::clone(f);
                CommandInner::Future(Box::pin(async move { f(fut.await) }))
            }
            CommandInner::Batch(cmds) => {
                CommandInner::Batch(cmds.into_iter().map(|cmd| cmd.map_shared(f)).collect())
            }
            CommandInner::Terminal(tcmd) => CommandInner::Terminal(tcmd),
        };
        Command::wrap(inner)
    }

    /// Whether this is a no-op.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Whether this quits the program, directly or inside a batch.
    pub fn is_quit(&self) -> bool {
        match &self.inner {
            CommandInner::Quit => true,
            CommandInner::Batch(cmds) => cmds.iter().any(Command::is_quit),
            _ => false,
        }
    }

    /// The message, if this is a single immediate message.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// The message, if this is a single next-frame message.
    pub fn into_next_frame(self) -> Option<Msg> {
        match self.inner {
            CommandInner::NextFrame(msg) => Some(msg),
            _ => None,
        }
    }

    /// Split into immediate and next-frame messages, in order, dropping
    /// everything else.
    pub fn into_messages(self) -> (Vec<Msg>, Vec<Msg>) {
        let mut now = Vec::new();
        let mut later = Vec::new();
        self.collect_into(&mut now, &mut later);
        (now, later)
    }

    fn collect_into(self, now: &mut Vec<Msg>, later: &mut Vec<Msg>) {
        match self.inner {
            CommandInner::Message(msg) => now.push(msg),
            CommandInner::NextFrame(msg) => later.push(msg),
            CommandInner::Batch(cmds) => cmds.into_iter().for_each(|c| c.collect_into(now, later)),
            CommandInner::None
            | CommandInner::Quit
            | CommandInner::Future(_)
            | CommandInner::Terminal(_) => {}
        }
    }
}
