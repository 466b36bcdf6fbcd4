//! Core projection trait and position tracking.

use async_trait::async_trait;

use crate::Result;
use crate::envelope::EventEnvelope;

/// Counters describing how far a running projection has come.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Events the handler completed successfully.
    pub events_processed: u64,

    /// Events whose handler returned an error or panicked.
    pub events_failed: u64,

    /// Events the projection was not interested in.
    pub events_skipped: u64,

    /// Events overwritten on the bus before this projection could receive
    /// them. They were never handled.
    pub events_lagged: u64,

    /// Sequence of the last event received, whatever its outcome.
    pub last_sequence: Option<u64>,
}

impl ProjectionPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Total number of events accounted for, including those lost to lag.
    pub fn events_seen(&self) -> u64 {
        self.events_processed + self.events_failed + self.events_skipped + self.events_lagged
    }

    /// Returns true once the event with `sequence` (or a later one) was received.
    pub fn has_seen(&self, sequence: u64) -> bool {
        self.last_sequence.is_some_and(|last| last >= sequence)
    }

    pub(crate) fn processed(&mut self, sequence: u64) {
        self.events_processed += 1;
        self.last_sequence = Some(sequence);
    }

    pub(crate) fn failed(&mut self, sequence: u64) {
        self.events_failed += 1;
        self.last_sequence = Some(sequence);
    }

    pub(crate) fn skipped(&mut self, sequence: u64) {
        self.events_skipped += 1;
        self.last_sequence = Some(sequence);
    }

    pub(crate) fn lagged(&mut self, missed: u64) {
        self.events_lagged += missed;
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last_sequence {
            Some(sequence) => write!(
                f,
                "position({}, ok={}, failed={}, skipped={}, lagged={})",
                sequence,
                self.events_processed,
                self.events_failed,
                self.events_skipped,
                self.events_lagged
            ),
            None if self.events_lagged > 0 => {
                write!(f, "position(none, lagged={})", self.events_lagged)
            }
            None => write!(f, "position(none)"),
        }
    }
}

/// A consumer of events published on an [`EventBus`](crate::EventBus).
///
/// Each subscribed projection runs on its own task. A handler error affects
/// only the event being handled.
#[async_trait]
pub trait Projection<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Returns true if `handle` should be called for this event.
    fn interested_in(&self, _event: &E) -> bool {
        true
    }

    /// Handles a single event.
    async fn handle(&self, envelope: &EventEnvelope<E>) -> Result<()>;
}
