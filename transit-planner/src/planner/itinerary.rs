//! Reconstructing an itinerary from a label's parent chain.

use crate::domain::{EdgeId, LabelId};

use super::config::Direction;
use super::label::LabelArena;

/// The ordered edge ids making up the journey that ends (forward) or starts
/// (reverse) at `leaf`.
///
/// Parent links run from the leaf back to the query root, so a forward
/// chain is reversed into travel order; a reverse-mode chain is already in
/// travel order because its root is the destination.
pub fn edge_path(arena: &LabelArena, leaf: LabelId, direction: Direction) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let mut current = Some(leaf);
    while let Some(id) = current {
        let label = arena.get(id);
        if let Some(edge) = label.edge {
            edges.push(edge);
        }
        current = label.parent;
    }
    if direction.is_forward() {
        edges.reverse();
    }
    edges
}
