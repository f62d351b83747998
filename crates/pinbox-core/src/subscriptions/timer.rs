use crate::subscription::{SubscriptionId, SubscriptionSource};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

/// A repeating timer that fires at a fixed interval.
///
/// Each tick emits the current [`Instant`]. Timers with different `id`s
/// coexist; two timers with the same `id` and key are the same
/// subscription. Give each instance of a component its own
/// [`keyed`](Every::keyed) timer.
///
/// ```rust,ignore
/// use std::time::Duration;
/// use pinbox_core::{subscribe, Every};
///
/// let blink = subscribe(Every::new(Duration::from_millis(530), "cursor-blink"))
///     .map(|_| Msg::Blink);
/// ```
pub struct Every {
    /// The interval between ticks.
    pub interval: Duration,
    /// Identifier distinguishing this timer from others.
    pub id: &'static str,
    /// Per-instance key, `0` unless set with [`keyed`](Every::keyed).
    pub key: u64,
}

impl Every {
    /// Create a new repeating timer with the given interval and identifier.
    pub fn new(interval: Duration, id: &'static str) -> Self {
        Self { interval, id, key: 0 }
    }

    /// Separate this timer from others sharing its `id`.
    pub fn keyed(mut self, key: u64) -> Self {
        self.key = key;
        self
    }
}

impl SubscriptionSource for Every {
    type Output = Instant;

    fn id(&self) -> SubscriptionId {
        let mut hasher = std::hash::DefaultHasher::new();
        (self.id, self.key).hash(&mut hasher);
        SubscriptionId::new::<Self>(hasher.finish())
    }

    fn stream(self) -> BoxStream<'static, Instant> {
        let mut interval = tokio::time::interval(self.interval);
        // The first tick of a tokio interval completes immediately.
        interval.reset();
        Box::pin(tokio_stream::wrappers::IntervalStream::new(interval).map(|t| t.into_std()))
    }
}
