//! # PIN Input Example
//!
//! A six-digit verification code entry:
//! - Passing a prepared [`PinInput`] to the model through `Flags`
//! - Routing key and paste events into a component
//! - Merging the component's blink subscription with the terminal's
//! - Writing `tracing` output to a file while the TUI owns the terminal
//!
//! Run with: `cargo run --example pin_input`
//! Log with: `PINBOX_LOG=pin.log RUST_LOG=trace cargo run --example pin_input`

use pinbox::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pinbox::machine::{Allowed, PinInputConfig};
use pinbox::ratatui::layout::{Alignment, Constraint, Layout};
use pinbox::ratatui::style::{Color, Style};
use pinbox::ratatui::text::{Line, Span};
use pinbox::ratatui::widgets::Paragraph;
use pinbox::ratatui::Frame;
use pinbox::widgets::overlay::centered_fixed;
use pinbox::widgets::pin_input::{self, PinInput};
use pinbox::{
    terminal_events, Command, Component, Model, ProgramOptions, Subscription, TerminalEvent,
};

struct Verify {
    pin: PinInput,
    code: Option<String>,
}

#[derive(Debug)]
enum Msg {
    Key(KeyEvent),
    Pin(pin_input::Message),
    Quit,
}

impl Model for Verify {
    type Message = Msg;
    type Flags = PinInput;

    fn init(pin: PinInput) -> (Self, Command<Msg>) {
        (
            Verify { pin, code: None },
            Command::message(Msg::Pin(pin_input::Message::Focus(0))),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Key(key) if key.code == KeyCode::Char('q') && !self.pin.focused() => {
                Command::quit()
            }
            Msg::Key(key) => self
                .pin
                .update(pin_input::Message::KeyPress(key))
                .map(Msg::Pin),
            // The widget reports completion; everything else goes back in.
            Msg::Pin(pin_input::Message::Completed(code)) => {
                self.code = Some(code);
                Command::quit()
            }
            Msg::Pin(pin_input::Message::Changed(_)) => Command::none(),
            Msg::Pin(m) => self.pin.update(m).map(Msg::Pin),
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = centered_fixed(self.pin.width().max(40), self.pin.height() + 4, frame.area());
        let [title, boxes, _, hint] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(self.pin.height()),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new("Enter the 6-digit code").alignment(Alignment::Center),
            title,
        );
        self.pin
            .view(frame, centered_fixed(self.pin.width(), self.pin.height(), boxes));

        let key = Style::default().fg(Color::Cyan);
        let dim = Style::default().fg(Color::DarkGray);
        let help = if self.pin.focused() {
            Line::from(vec![
                Span::styled("←/→", key),
                Span::styled(" move  ", dim),
                Span::styled("esc", key),
                Span::styled(" leave  ", dim),
                Span::styled("ctrl+c", key),
                Span::styled(" quit", dim),
            ])
        } else {
            Line::from(vec![
                Span::styled("enter", key),
                Span::styled(" edit  ", dim),
                Span::styled("q", key),
                Span::styled(" quit", dim),
            ])
        };
        frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), hint);
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|ev| match ev {
            TerminalEvent::Key(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Msg::Quit)
            }
            TerminalEvent::Key(key) => Some(Msg::Key(key)),
            TerminalEvent::Paste(text) => Some(Msg::Pin(pin_input::Message::Paste(text))),
            _ => None,
        })];
        subs.extend(
            self.pin
                .subscriptions()
                .into_iter()
                .map(|sub| sub.map(Msg::Pin)),
        );
        subs
    }
}

#[pinbox::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PinInputConfig {
        length: 6,
        allowed: Allowed::Numeric,
        ..PinInputConfig::default()
    };
    let pin = PinInput::new(config)?;
    let options = ProgramOptions {
        title: Some("pinbox".into()),
        log_file: std::env::var_os("PINBOX_LOG").map(Into::into),
        ..ProgramOptions::default()
    };

    let model = pinbox::run_with::<Verify>(pin, options).await?;
    match model.code {
        Some(code) => println!("Code: {code}"),
        None => println!("Cancelled"),
    }
    Ok(())
}
