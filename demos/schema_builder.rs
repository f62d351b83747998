//! # Schema Builder Example
//!
//! The full schema editing page:
//! - Embedding a composite [`SchemaBuilder`] component in a model
//! - Letting the component route keys between its panes
//! - Reading the edited data back out after the program exits
//!
//! Run with: `cargo run --example schema_builder`

use pinbox::crossterm::event::{KeyCode, KeyModifiers};
use pinbox::ratatui::Frame;
use pinbox::schema::{FieldType, Schema};
use pinbox::widgets::schema_builder::{self, SchemaBuilder};
use pinbox::{terminal_events, Command, Component, Model, ProgramOptions, Subscription, TerminalEvent};

struct Page {
    builder: SchemaBuilder,
}

#[derive(Debug)]
enum Msg {
    Builder(schema_builder::Message),
    Quit,
}

impl Model for Page {
    type Message = Msg;
    type Flags = Schema;

    fn init(schema: Schema) -> (Self, Command<Msg>) {
        (
            Page {
                builder: SchemaBuilder::new(schema),
            },
            Command::set_title("pinbox schema builder"),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Builder(m) => self.builder.update(m).map(Msg::Builder),
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        self.builder.view(frame, frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        vec![terminal_events(|ev| match ev {
            TerminalEvent::Key(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Msg::Quit)
            }
            TerminalEvent::Key(key) => Some(Msg::Builder(schema_builder::Message::KeyPress(key))),
            _ => None,
        })]
    }
}

fn sample() -> Schema {
    let mut schema = Schema::new();
    let street = schema.field("street", FieldType::String);
    let city = schema.field("city", FieldType::String);
    let address = schema.group("address").with_child(street).with_child(city);
    let sku = schema.field("sku", FieldType::String);
    let quantity = schema.field("quantity", FieldType::Number);
    let items = schema.list("items").with_child(sku).with_child(quantity);
    let placed = schema.field("placed_at", FieldType::Date);
    schema.push_root(address);
    schema.push_root(items);
    schema.push_root(placed);
    schema
}

#[pinbox::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = ProgramOptions {
        log_file: std::env::var_os("PINBOX_LOG").map(Into::into),
        ..ProgramOptions::default()
    };
    let page = pinbox::run_with::<Page>(sample(), options).await?;

    let schema = page.builder.schema();
    for row in schema.flatten(&schema.container_ids()) {
        let indent = "  ".repeat(row.depth);
        match row.field_type {
            Some(t) => println!("{indent}{}: {}", row.name, t.label()),
            None => println!("{indent}{} ({})", row.name, row.tag.label()),
        }
    }
    Ok(())
}
