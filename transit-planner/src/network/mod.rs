//! The graph side of the engine: edges, adjacency, calendar and the
//! realtime overlay.
//!
//! The search core only ever reads these collaborators. Building them from a
//! timetable feed is the job of an ingestion pipeline outside this crate;
//! [`NetworkBuilder`] exists so embedders and tests can assemble networks
//! directly.

mod calendar;
mod edge;
mod graph;
mod realtime;

pub use calendar::Calendar;
pub use edge::{Edge, EdgeKind};
pub use graph::{Network, NetworkBuilder, TransitNetwork};
pub use realtime::RealtimeOverlay;
