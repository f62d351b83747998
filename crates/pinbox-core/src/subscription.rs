use futures::stream::BoxStream;
use futures::StreamExt;
use std::any::TypeId;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// A long-lived event source managed by the runtime.
///
/// Subscriptions are declared in [`Model::subscriptions`](crate::Model::subscriptions)
/// after every update. The runtime keeps the ones whose [`SubscriptionId`] is
/// still present, starts new ones and aborts the rest. A subscription's
/// stream is only opened when it starts, so declaring one is cheap.
pub struct Subscription<Msg: Send + 'static> {
    pub(crate) id: SubscriptionId,
    open: Box<dyn FnOnce() -> BoxStream<'static, Msg> + Send>,
}

/// Identity used to diff subscriptions between update cycles: a [`TypeId`]
/// plus a numeric discriminant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    discriminant: u64,
}

impl SubscriptionId {
    /// Create an ID from a type and a numeric discriminant.
    pub fn new<T: 'static>(discriminant: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            discriminant,
        }
    }

    /// Create an ID from a type alone (for singletons).
    pub fn of<T: 'static>() -> Self {
        Self::new::<T>(0)
    }

    /// Create an ID from a type and a string discriminant.
    pub fn with_str<T: 'static>(s: &str) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        s.hash(&mut hasher);
        Self::new::<T>(hasher.finish())
    }
}

/// A source of values that can back a [`Subscription`].
pub trait SubscriptionSource: Send + 'static {
    /// The type of values this source emits.
    type Output: Send + 'static;

    /// Unique ID for this subscription instance.
    fn id(&self) -> SubscriptionId;

    /// Create the stream of values. Called once, when the subscription starts.
    fn stream(self) -> BoxStream<'static, Self::Output>;
}

/// Create a [`Subscription`] from a [`SubscriptionSource`].
pub fn subscribe<S>(source: S) -> Subscription<S::Output>
where
    S: SubscriptionSource,
{
    Subscription::lazy(source.id(), move || source.stream())
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// A subscription whose stream is built by `open` when it starts.
    pub fn lazy(
        id: SubscriptionId,
        open: impl FnOnce() -> BoxStream<'static, Msg> + Send + 'static,
    ) -> Self {
        Subscription {
            id,
            open: Box::new(open),
        }
    }

    /// A subscription over an existing stream.
    pub fn from_stream(id: SubscriptionId, stream: BoxStream<'static, Msg>) -> Self {
        Self::lazy(id, move || stream)
    }

    /// The subscription's identity.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Transform the message type (for component composition). The id is
    /// unchanged.
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Subscription<NewMsg> {
        let open = self.open;
        Subscription::lazy(self.id, move || open().map(f).boxed())
    }

    /// Open the stream and forward it to `tx` on a new task until the
    /// receiver is gone.
    fn start(self, tx: mpsc::UnboundedSender<Msg>) -> AbortHandle {
        let mut stream = (self.open)();
        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                if tx.send(msg).is_err() {
                    break;
                }
            }
        })
        .abort_handle()
    }
}

/// Manages active subscriptions, diffing them between cycles.
pub(crate) struct SubscriptionManager<Msg: Send + 'static> {
    active: HashMap<SubscriptionId, AbortHandle>,
    msg_tx: mpsc::UnboundedSender<Msg>,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    pub fn new(msg_tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            active: HashMap::new(),
            msg_tx,
        }
    }

    /// Start new subscriptions, stop removed ones, keep unchanged ones.
    pub fn reconcile(&mut self, subs: Vec<Subscription<Msg>>) {
        let mut wanted: HashMap<SubscriptionId, Subscription<Msg>> =
            subs.into_iter().map(|s| (s.id.clone(), s)).collect();

        self.active.retain(|id, handle| {
            let keep = wanted.contains_key(id);
            if !keep {
                tracing::trace!(?id, "subscription stopped");
                handle.abort();
            }
            keep
        });

        for (id, sub) in wanted.drain() {
            if !self.active.contains_key(&id) {
                tracing::trace!(?id, "subscription started");
                let handle = sub.start(self.msg_tx.clone());
                self.active.insert(id, handle);
            }
        }
    }

    /// Abort all active subscriptions.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
