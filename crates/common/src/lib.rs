//! Identifier newtypes shared by every crate in the workspace.

// Lets `uuid_id!` name this crate as `common` when expanded here too.
extern crate self as common;

mod types;

pub use types::{AggregateId, EventId};
#[doc(hidden)]
pub use types::{__serde, __uuid};
