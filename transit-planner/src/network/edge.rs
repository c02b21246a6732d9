//! The tagged edge model of the time-expanded network.
//!
//! Every edge carries a small, fixed rule set selected by its kind, matched
//! explicitly in the explorer and the cost function. Schedule-bound kinds
//! carry the time of day they happen at; time-cost kinds carry a duration.

use serde::{Deserialize, Serialize};

use crate::domain::{EdgeId, NodeId, TimeOfDay, ValidityId};

/// What traversing an edge means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// A walk along the street network. Fixed duration.
    Street,
    /// A footpath between two stop areas. Fixed duration.
    Transfer,
    /// Staying on a vehicle between consecutive timed events. Fixed duration.
    Dwell,
    /// Boarding a vehicle at a scheduled departure.
    Board,
    /// Leaving a vehicle at a scheduled arrival.
    Alight,
    /// Entering the schedule network from the waiting area, waiting until
    /// the scheduled departure. At most one of these is taken per expansion
    /// in forward mode.
    EnterSchedule,
    /// Leaving the schedule network back to the waiting area. The one-shot
    /// rule applies to this kind in reverse mode.
    LeaveSchedule,
}

impl EdgeKind {
    /// Whether this kind snaps the journey to a scheduled time of day.
    pub fn is_scheduled(self) -> bool {
        matches!(
            self,
            EdgeKind::Board | EdgeKind::Alight | EdgeKind::EnterSchedule | EdgeKind::LeaveSchedule
        )
    }
}

/// One directed edge of the time-expanded network.
///
/// Owned by the base graph; the engine only ever borrows these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    /// Traversal cost in milliseconds for time-cost kinds; zero for
    /// schedule-bound kinds, whose cost is waiting time.
    pub duration_millis: i64,
    /// The scheduled time of day, for schedule-bound kinds.
    pub schedule: Option<TimeOfDay>,
    /// Calendar pattern gating this edge; `None` means always valid.
    pub validity: Option<ValidityId>,
    /// Whether traversing this edge counts as boarding after a different
    /// trip, incrementing the transfer count.
    pub boards: bool,
}

impl Edge {
    /// A street walk of the given duration.
    pub fn street(id: EdgeId, from: NodeId, to: NodeId, duration_millis: i64) -> Self {
        Self {
            id,
            from,
            to,
            kind: EdgeKind::Street,
            duration_millis,
            schedule: None,
            validity: None,
            boards: false,
        }
    }

    /// A stop-to-stop footpath of the given duration.
    pub fn transfer(id: EdgeId, from: NodeId, to: NodeId, duration_millis: i64) -> Self {
        Self {
            kind: EdgeKind::Transfer,
            ..Self::street(id, from, to, duration_millis)
        }
    }

    /// Staying aboard between two timed events.
    pub fn dwell(id: EdgeId, from: NodeId, to: NodeId, duration_millis: i64) -> Self {
        Self {
            kind: EdgeKind::Dwell,
            ..Self::street(id, from, to, duration_millis)
        }
    }

    /// Boarding a vehicle departing at `departure` on days where `validity`
    /// is active.
    pub fn board(
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        departure: TimeOfDay,
        validity: ValidityId,
    ) -> Self {
        Self {
            id,
            from,
            to,
            kind: EdgeKind::Board,
            duration_millis: 0,
            schedule: Some(departure),
            validity: Some(validity),
            boards: true,
        }
    }

    /// Leaving a vehicle arriving at `arrival` on days where `validity` is
    /// active.
    pub fn alight(
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        arrival: TimeOfDay,
        validity: ValidityId,
    ) -> Self {
        Self {
            id,
            from,
            to,
            kind: EdgeKind::Alight,
            duration_millis: 0,
            schedule: Some(arrival),
            validity: Some(validity),
            boards: false,
        }
    }

    /// Entering the schedule network, waiting for the departure at
    /// `departure`.
    pub fn enter_schedule(id: EdgeId, from: NodeId, to: NodeId, departure: TimeOfDay) -> Self {
        Self {
            id,
            from,
            to,
            kind: EdgeKind::EnterSchedule,
            duration_millis: 0,
            schedule: Some(departure),
            validity: None,
            boards: false,
        }
    }

    /// Leaving the schedule network at the scheduled arrival `arrival`.
    pub fn leave_schedule(id: EdgeId, from: NodeId, to: NodeId, arrival: TimeOfDay) -> Self {
        Self {
            id,
            from,
            to,
            kind: EdgeKind::LeaveSchedule,
            duration_millis: 0,
            schedule: Some(arrival),
            validity: None,
            boards: false,
        }
    }
}
