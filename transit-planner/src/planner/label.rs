//! Partial-journey labels, their arena, and the dominance partial order.
//!
//! A label is an immutable snapshot: where the journey is, when, how many
//! transfers it took, and when it first boarded. Labels reference their
//! parent by arena handle, forming a tree rooted at the query's start label;
//! the whole arena is dropped when the query ends.

use crate::domain::{EdgeId, LabelId, NodeId, Timestamp};

use super::config::Direction;

/// One partial journey, frozen at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// Instant the journey has reached. Non-decreasing along forward parent
    /// chains, non-increasing along reverse ones.
    pub time: Timestamp,
    /// Node the label resides at.
    pub node: NodeId,
    /// Edge just traversed; `None` for the root label.
    pub edge: Option<EdgeId>,
    /// Boardings after a different trip so far.
    pub transfers: u32,
    /// Instant of the first boarding; `None` until the journey first boards,
    /// then frozen.
    pub first_departure: Option<Timestamp>,
    /// Label this one was extended from; `None` for the root.
    pub parent: Option<LabelId>,
}

impl Label {
    /// The start label of a query.
    pub fn root(node: NodeId, time: Timestamp) -> Self {
        Self {
            time,
            node,
            edge: None,
            transfers: 0,
            first_departure: None,
            parent: None,
        }
    }

    /// Whether this journey never boarded a scheduled vehicle.
    pub fn is_pure_walk(&self) -> bool {
        self.transfers == 0 && self.first_departure.is_none()
    }

    /// Whether `self` dominates `other`: at least as good on every
    /// criterion, strictly better on arrival or transfers, or, at equal
    /// arrival and transfers, strictly better on the first departure.
    ///
    /// Reverse mode mirrors the two time-valued comparisons; fewer transfers
    /// is better either way. Labels with equal criteria do not dominate each
    /// other.
    pub fn dominates(&self, other: &Label, direction: Direction) -> bool {
        let (earlier, later) = match direction {
            Direction::Forward => (self.time <= other.time, self.time < other.time),
            Direction::Reverse => (self.time >= other.time, self.time > other.time),
        };
        if !earlier {
            return false;
        }
        if self.transfers > other.transfers {
            return false;
        }

        // A set departure is comparable only against another set departure;
        // an unset one is compatible with anything.
        let (departure_ok, departure_better) = match (self.first_departure, other.first_departure)
        {
            (Some(mine), Some(theirs)) => match direction {
                Direction::Forward => (mine >= theirs, mine > theirs),
                Direction::Reverse => (mine <= theirs, mine < theirs),
            },
            _ => (true, false),
        };
        if !departure_ok {
            return false;
        }

        later
            || self.transfers < other.transfers
            || (self.time == other.time && self.transfers == other.transfers && departure_better)
    }

    /// Whether the two labels carry identical criteria.
    pub fn criteria_eq(&self, other: &Label) -> bool {
        self.time == other.time
            && self.transfers == other.transfers
            && self.first_departure == other.first_departure
    }
}

/// Arena of labels, indexed by dense [`LabelId`] handles.
///
/// Owned by a single query; bulk cleanup is dropping the arena.
#[derive(Debug, Default)]
pub struct LabelArena {
    labels: Vec<Label>,
}

impl LabelArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a label, returning its handle.
    pub fn push(&mut self, label: Label) -> LabelId {
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(label);
        id
    }

    /// Look up a label. Panics on a handle from another arena; handles are
    /// never invalidated otherwise.
    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id.index()]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
