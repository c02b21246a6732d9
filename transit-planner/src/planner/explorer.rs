//! Enumerates the legal successor edges of a label.
//!
//! Stateless across calls: every rule reads only the label and the read-only
//! collaborators (network, calendar, realtime overlay). The graph is never
//! mutated.

use crate::domain::Timestamp;
use crate::network::{Calendar, Edge, EdgeKind, RealtimeOverlay, TransitNetwork};

use super::config::Direction;
use super::label::Label;

/// Filters a node's adjacency down to the edges a label may traverse.
#[derive(Debug, Clone, Copy)]
pub struct EdgeExplorer<'a, G> {
    network: &'a G,
    calendar: &'a Calendar,
    realtime: &'a RealtimeOverlay,
    direction: Direction,
}

impl<'a, G: TransitNetwork> EdgeExplorer<'a, G> {
    pub fn new(
        network: &'a G,
        calendar: &'a Calendar,
        realtime: &'a RealtimeOverlay,
        direction: Direction,
    ) -> Self {
        Self {
            network,
            calendar,
            realtime,
            direction,
        }
    }

    /// The edges `label` may traverse next, in stable adjacency order.
    ///
    /// Skips edges whose calendar validity is off for the traffic day
    /// implied by the label's time, edges blocked by the realtime overlay,
    /// schedule-bound edges whose scheduled time has already passed (in the
    /// traversal direction), and, within one expansion, every schedule-entry
    /// edge after the first accepted one. Later departures are reached through
    /// the time-expanded structure of the label created here, not by
    /// fanning out into every boarding at once.
    pub fn successors<'e>(&'e self, label: &Label) -> Successors<'a, 'e, G> {
        let edges = match self.direction {
            Direction::Forward => self.network.outgoing(label.node),
            Direction::Reverse => self.network.incoming(label.node),
        };
        Successors {
            explorer: self,
            edges: edges.iter(),
            at: label.time,
            entered_schedule: false,
        }
    }

    /// Time cost of traversing `edge` at instant `at`, in milliseconds.
    ///
    /// For the schedule-entry side being traversed this is the waiting time
    /// until the scheduled time of day; the opposite side costs nothing.
    /// Callers must only pass edges admitted by [`Self::successors`] for the
    /// same instant, so waits are never negative.
    pub fn traversal_time(&self, edge: &Edge, at: Timestamp) -> i64 {
        let Some(scheduled) = edge.schedule else {
            return edge.duration_millis;
        };
        let wait = match self.direction {
            Direction::Forward => at.time_of_day().millis_until(scheduled),
            Direction::Reverse => scheduled.millis_until(at.time_of_day()),
        };
        match (self.direction, edge.kind) {
            // Entering the schedule waits forward, costs nothing backward.
            (Direction::Forward, EdgeKind::EnterSchedule) => wait,
            (Direction::Reverse, EdgeKind::EnterSchedule) => 0,
            // Leaving is the mirror image.
            (Direction::Forward, EdgeKind::LeaveSchedule) => 0,
            (Direction::Reverse, EdgeKind::LeaveSchedule) => wait,
            // Boards and alights snap to their scheduled instant either way.
            _ => wait,
        }
    }

    /// Whether `edge` is traversable at `at`, ignoring the one-shot rule.
    fn admits(&self, edge: &Edge, at: Timestamp) -> bool {
        if let Some(validity) = edge.validity {
            if !self.calendar.is_active_at(validity, at) {
                return false;
            }
        }
        if self.realtime.is_blocked(edge.id) {
            return false;
        }
        self.schedule_admits(edge, at)
    }

    /// Time gate for schedule-bound edges: the scheduled instant must still
    /// be ahead in the traversal direction.
    fn schedule_admits(&self, edge: &Edge, at: Timestamp) -> bool {
        let Some(scheduled) = edge.schedule else {
            return true;
        };
        match (self.direction, edge.kind) {
            // The zero-cost side of a schedule boundary is never gated.
            (Direction::Reverse, EdgeKind::EnterSchedule)
            | (Direction::Forward, EdgeKind::LeaveSchedule) => true,
            (Direction::Forward, _) => at.time_of_day() <= scheduled,
            (Direction::Reverse, _) => at.time_of_day() >= scheduled,
        }
    }

    /// Whether `edge` is the schedule-entry kind for this direction, subject
    /// to the one-shot rule.
    fn is_schedule_entry(&self, edge: &Edge) -> bool {
        match self.direction {
            Direction::Forward => edge.kind == EdgeKind::EnterSchedule,
            Direction::Reverse => edge.kind == EdgeKind::LeaveSchedule,
        }
    }
}

/// Iterator over a label's viable successor edges.
pub struct Successors<'a, 'e, G> {
    explorer: &'e EdgeExplorer<'a, G>,
    edges: std::slice::Iter<'a, Edge>,
    at: Timestamp,
    entered_schedule: bool,
}

impl<'a, G: TransitNetwork> Iterator for Successors<'a, '_, G> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<&'a Edge> {
        for edge in self.edges.by_ref() {
            if self.explorer.is_schedule_entry(edge) {
                if self.entered_schedule {
                    continue;
                }
                if !self.explorer.admits(edge, self.at) {
                    continue;
                }
                self.entered_schedule = true;
                return Some(edge);
            }
            if self.explorer.admits(edge, self.at) {
                return Some(edge);
            }
        }
        None
    }
}
