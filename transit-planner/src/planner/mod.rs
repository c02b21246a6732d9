//! The multi-criteria label-setting search core.
//!
//! Generalizes single-objective shortest-path search to a partial order:
//! each node keeps a set of mutually non-dominated partial journeys, and
//! the frontier queue drives expansion in lexicographic key order. Point
//! queries return the Pareto set over arrival time and transfers; profile
//! queries additionally rank by departure time over a bounded window.

mod config;
mod explorer;
mod frontier;
mod itinerary;
mod label;
mod search;

pub use config::{Direction, QueryMode, SearchOptions};
pub use explorer::{EdgeExplorer, Successors};
pub use frontier::{FrontierError, FrontierQueue, QueueKey};
pub use itinerary::edge_path;
pub use label::{Label, LabelArena};
pub use search::{Planner, SearchError, SearchRequest, SearchResult, Solution};
