//! Query configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Which way the search walks through time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// From an origin forward in time towards targets.
    Forward,
    /// From a destination backward in time, for meet-in-the-middle setups.
    Reverse,
}

impl Direction {
    /// +1 forward, -1 reverse; multiplies time offsets so "later along the
    /// search" is always positive.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// What kind of answer the query wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryMode {
    /// One departure instant; the Pareto set over arrival and transfers.
    Point,
    /// A window of departure instants; the evolving Pareto frontier, ranked
    /// additionally by departure time.
    Profile,
}

/// Per-query knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Search direction.
    pub direction: Direction,

    /// Point or profile query.
    pub mode: QueryMode,

    /// Maximum number of labels the search may expand before giving up.
    /// Exhausting it is reported as an incomplete search, never as an empty
    /// result.
    pub node_budget: usize,

    /// Maximum number of labels the query may allocate. Bounds the label
    /// arena and the frontier together; exhausting it is reported like the
    /// node budget.
    pub label_capacity: usize,

    /// Maximum number of target solutions to retain.
    pub limit_solutions: usize,

    /// Width of the departure window for profile queries (minutes).
    pub max_profile_window_mins: i64,
}

impl SearchOptions {
    /// Returns the profile window as a Duration.
    pub fn max_profile_window(&self) -> Duration {
        Duration::minutes(self.max_profile_window_mins)
    }

    /// The profile window in milliseconds.
    pub(crate) fn max_profile_window_millis(&self) -> i64 {
        self.max_profile_window_mins * 60_000
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            mode: QueryMode::Point,
            node_budget: 1_000_000,
            label_capacity: 2_000_000,
            limit_solutions: 50,
            max_profile_window_mins: 240, // 4 hours
        }
    }
}
