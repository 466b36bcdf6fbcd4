//! In-process broadcast bus for domain events.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use domain::{DomainEvent, EventPublisher};
use tokio::sync::broadcast;

use crate::Result;
use crate::envelope::EventEnvelope;
use crate::projection::Projection;
use crate::runner::SubscriptionHandle;

/// Bus tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Events buffered per subscriber before the slowest one starts lagging.
    pub capacity: usize,

    /// Failures remembered by each subscription handle.
    pub failure_history: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            failure_history: 32,
        }
    }
}

struct Inner<E> {
    sender: broadcast::Sender<EventEnvelope<E>>,
    sequence: Mutex<u64>,
    config: BusConfig,
}

/// Broadcasts events to every subscribed projection.
///
/// Publishing never waits for subscribers. Events published through one bus
/// reach each subscriber in sequence order. A subscriber that falls more than
/// `capacity` events behind skips the overwritten events and is told how many
/// it missed.
pub struct EventBus<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> EventBus<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                sender,
                sequence: Mutex::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> BusConfig {
        self.inner.config
    }

    /// Publishes an event and returns its sequence number.
    pub fn publish(&self, event: E) -> u64 {
        self.send(event).sequence
    }

    /// Sequence of the most recently published event, 0 if none.
    pub fn last_sequence(&self) -> u64 {
        *self
            .inner
            .sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Runs `projection` on its own task for every event published from now on.
    ///
    /// Must be called within a tokio runtime.
    pub fn subscribe(&self, projection: Arc<dyn Projection<E>>) -> SubscriptionHandle {
        let receiver = self.inner.sender.subscribe();
        tracing::info!(projection = projection.name(), "projection subscribed");
        SubscriptionHandle::spawn(projection, receiver, self.inner.config.failure_history)
    }

    /// Subscribes a closure, called for every event matching `predicate`.
    pub fn subscribe_fn<P, H, Fut>(
        &self,
        name: &'static str,
        predicate: P,
        handler: H,
    ) -> SubscriptionHandle
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
        H: Fn(EventEnvelope<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.subscribe(Arc::new(FnProjection {
            name,
            predicate,
            handler,
            _future: PhantomData,
        }))
    }

    fn send(&self, event: E) -> EventEnvelope<E> {
        let mut sequence = self
            .inner
            .sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *sequence += 1;
        let envelope = EventEnvelope::new(*sequence, event);

        // No receivers is not an error: nobody is listening yet.
        let receivers = self.inner.sender.send(envelope.clone()).unwrap_or(0);
        drop(sequence);

        metrics::counter!("events_published_total").increment(1);
        tracing::debug!(sequence = envelope.sequence, receivers, "event published");
        envelope
    }
}

impl<E> Default for EventBus<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBus<DomainEvent> {
    fn publish(&self, event: DomainEvent) {
        let event_type = event.event_type();
        let envelope = self.send(event);
        tracing::debug!(sequence = envelope.sequence, event_type, "domain event published");
    }
}

struct FnProjection<P, H, Fut> {
    name: &'static str,
    predicate: P,
    handler: H,
    _future: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<E, P, H, Fut> Projection<E> for FnProjection<P, H, Fut>
where
    E: Clone + Send + Sync + 'static,
    P: Fn(&E) -> bool + Send + Sync + 'static,
    H: Fn(EventEnvelope<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn interested_in(&self, event: &E) -> bool {
        (self.predicate)(event)
    }

    async fn handle(&self, envelope: &EventEnvelope<E>) -> Result<()> {
        (self.handler)(envelope.clone()).await
    }
}
