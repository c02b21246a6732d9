//! Core identifier and instant types.
//!
//! Everything the engine indexes by is a dense integer newtype, so per-id
//! state can live in flat vectors and iteration order is deterministic.
//! Instants are signed 64-bit milliseconds behind the [`Timestamp`] newtype.

mod ids;
mod time;

pub use ids::{EdgeId, LabelId, NodeId, ValidityId};
pub use time::{DAY_MILLIS, TimeError, TimeOfDay, Timestamp};
