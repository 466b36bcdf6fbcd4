//! Versioned aggregate store.
//!
//! Every aggregate owns an append-only history of immutable snapshots.
//! Writers go through atomic per-aggregate read-modify-write operations,
//! readers get clones of snapshots and never a reference into the history.

pub mod error;
pub mod history;
pub mod memory;
pub mod store;
pub mod version;

pub use common::AggregateId;
pub use error::{Result, StoreError};
pub use history::History;
pub use memory::InMemoryVersionedStore;
pub use store::{VersionedStore, VersionedStoreExt};
pub use version::{Version, Versioned, VersionedId};
