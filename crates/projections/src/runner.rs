//! Subscription task driving one projection.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::EventId;
use futures_util::FutureExt;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::envelope::EventEnvelope;
use crate::error::ProjectionError;
use crate::projection::{Projection, ProjectionPosition};

/// One event a projection failed to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionFailure {
    pub sequence: u64,
    pub event_id: EventId,
    pub error: ProjectionError,
    pub failed_at: DateTime<Utc>,
}

/// State shared between a running subscription and its handle.
///
/// The position sender is owned by the subscription task, so watchers see the
/// channel close once the loop exits.
struct RunnerState {
    name: &'static str,
    failures: Mutex<VecDeque<ProjectionFailure>>,
    failure_history: usize,
}

impl RunnerState {
    async fn record_failure(&self, sequence: u64, event_id: EventId, error: ProjectionError) {
        if self.failure_history == 0 {
            return;
        }
        let mut failures = self.failures.lock().await;
        if failures.len() == self.failure_history {
            failures.pop_front();
        }
        failures.push_back(ProjectionFailure {
            sequence,
            event_id,
            error,
            failed_at: Utc::now(),
        });
    }
}

/// Handle to a running projection.
///
/// Dropping the handle cancels the subscription without waiting for it.
pub struct SubscriptionHandle {
    state: Arc<RunnerState>,
    position: watch::Receiver<ProjectionPosition>,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Spawns the subscription loop. `receiver` must already be subscribed.
    pub(crate) fn spawn<E>(
        projection: Arc<dyn Projection<E>>,
        receiver: Receiver<EventEnvelope<E>>,
        failure_history: usize,
    ) -> Self
    where
        E: Clone + Send + Sync + 'static,
    {
        let (cancel, cancelled) = watch::channel(false);
        let (position_tx, position) = watch::channel(ProjectionPosition::zero());
        let state = Arc::new(RunnerState {
            name: projection.name(),
            failures: Mutex::new(VecDeque::with_capacity(failure_history)),
            failure_history,
        });

        let task = tokio::spawn(run(
            projection,
            receiver,
            cancelled,
            position_tx,
            Arc::clone(&state),
        ));
        tracing::debug!(projection = state.name, "subscription started");

        Self {
            state,
            position,
            cancel,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.state.name
    }

    /// Returns the current position of the projection.
    pub fn position(&self) -> ProjectionPosition {
        *self.position.borrow()
    }

    /// Returns the most recent failures, oldest first.
    pub async fn failures(&self) -> Vec<ProjectionFailure> {
        self.state.failures.lock().await.iter().cloned().collect()
    }

    /// Waits until the event with `sequence` has been received and its
    /// handler has finished.
    ///
    /// Returns early with the final position if the subscription stops
    /// before reaching `sequence`.
    pub async fn wait_until_seen(&self, sequence: u64) -> ProjectionPosition {
        let mut position = self.position.clone();
        match position.wait_for(|p| p.has_seen(sequence)).await {
            Ok(current) => *current,
            Err(_) => self.position(),
        }
    }

    /// Returns true once the subscription loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops delivery and waits for the loop to exit.
    ///
    /// A handler that is already running completes first; no later event is
    /// delivered. Returns the final position.
    pub async fn cancel(mut self) -> ProjectionPosition {
        let _ = self.cancel.send(true);
        if let Some(task) = self.task.take()
            && let Err(error) = task.await
        {
            tracing::error!(projection = self.state.name, %error, "subscription task failed");
        }
        self.position()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.cancel.send(true);
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("name", &self.state.name)
            .field("position", &self.position())
            .finish()
    }
}

async fn run<E>(
    projection: Arc<dyn Projection<E>>,
    mut receiver: Receiver<EventEnvelope<E>>,
    mut cancelled: watch::Receiver<bool>,
    position: watch::Sender<ProjectionPosition>,
    state: Arc<RunnerState>,
) where
    E: Clone + Send + Sync + 'static,
{
    let name = state.name;
    loop {
        let envelope = tokio::select! {
            biased;
            _ = cancelled.changed() => break,
            received = receiver.recv() => match received {
                Ok(envelope) => envelope,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(projection = name, missed, "projection lagged behind the bus");
                    metrics::counter!("projection_events_lagged_total", "projection" => name)
                        .increment(missed);
                    position.send_modify(|p| p.lagged(missed));
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(projection = name, "event bus closed");
                    break;
                }
            },
        };

        deliver(projection.as_ref(), &envelope, &position, &state).await;
    }
    tracing::debug!(projection = name, position = %*position.borrow(), "subscription stopped");
}

async fn deliver<E>(
    projection: &dyn Projection<E>,
    envelope: &EventEnvelope<E>,
    position: &watch::Sender<ProjectionPosition>,
    state: &RunnerState,
) where
    E: Clone + Send + Sync + 'static,
{
    let name = state.name;
    let sequence = envelope.sequence;

    if !projection.interested_in(&envelope.event) {
        position.send_modify(|p| p.skipped(sequence));
        return;
    }

    let outcome = AssertUnwindSafe(projection.handle(envelope))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ProjectionError::Panicked(panic_message(panic.as_ref()))));

    match outcome {
        Ok(()) => {
            metrics::counter!("projection_events_processed_total", "projection" => name)
                .increment(1);
            position.send_modify(|p| p.processed(sequence));
        }
        Err(error) => {
            tracing::warn!(
                projection = name,
                sequence,
                event_id = %envelope.event_id,
                %error,
                "projection failed to handle event"
            );
            metrics::counter!("projection_events_failed_total", "projection" => name)
                .increment(1);
            state
                .record_failure(sequence, envelope.event_id, error)
                .await;
            position.send_modify(|p| p.failed(sequence));
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
