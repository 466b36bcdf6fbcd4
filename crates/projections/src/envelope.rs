//! Envelope wrapping every event delivered through the bus.

use chrono::{DateTime, Utc};
use common::EventId;
use serde::{Deserialize, Serialize};

/// An event together with its delivery metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    /// Unique identifier of this publication.
    pub event_id: EventId,

    /// Position in the bus, starting at 1 and increasing by one per publish.
    pub sequence: u64,

    /// When the event was published.
    pub occurred_at: DateTime<Utc>,

    pub event: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(sequence: u64, event: E) -> Self {
        Self {
            event_id: EventId::new(),
            sequence,
            occurred_at: Utc::now(),
            event,
        }
    }
}
