use crate::event::TerminalEvent;
use crate::subscription::{Subscription, SubscriptionId};
use crossterm::event::EventStream;
use futures::future;
use futures::StreamExt;

/// Marker type identifying the terminal event subscription.
///
/// Only one terminal subscription is ever active: every call to
/// [`terminal_events`] shares this identity, so returning a fresh one from
/// each `subscriptions()` call keeps the running stream.
pub struct TerminalEvents;

/// Subscribe to terminal events, mapping each through `map`.
///
/// Return `Some(msg)` to forward the event, `None` to discard it.
///
/// ```rust,ignore
/// fn subscriptions(&self) -> Vec<Subscription<Msg>> {
///     vec![terminal_events(|event| match event {
///         TerminalEvent::Key(key) => Some(Msg::Key(key)),
///         TerminalEvent::Paste(text) => Some(Msg::Paste(text)),
///         _ => None,
///     })]
/// }
/// ```
pub fn terminal_events<Msg: Send + 'static>(
    map: impl Fn(TerminalEvent) -> Option<Msg> + Send + Sync + 'static,
) -> Subscription<Msg> {
    // Opened lazily: an EventStream built on every subscriptions() call would
    // poke crossterm's global reader while the live one is polling it.
    Subscription::lazy(SubscriptionId::of::<TerminalEvents>(), move || {
        EventStream::new()
            .filter_map(move |read| {
                let msg = match read {
                    Ok(event) => TerminalEvent::from_crossterm(event).and_then(&map),
                    Err(err) => {
                        tracing::warn!(%err, "terminal event read failed");
                        None
                    }
                };
                future::ready(msg)
            })
            .boxed()
    })
}
