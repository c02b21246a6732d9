//! The frontier priority queue.
//!
//! An array-backed binary min-heap over dense label ids with a parallel
//! position array, so any queued id's heap slot is found in O(1). That makes
//! `update` and `remove` O(log n) without a linear scan, the property that
//! lets the search evict dominated labels from the middle of the queue.
//! Slot 0 of the heap holds a sentinel minimum key, so percolate-up
//! terminates without a bounds check.

use crate::domain::LabelId;

/// Marker in the position array for ids not currently queued.
const NOT_QUEUED: u32 = u32::MAX;

/// Composite ordering key, compared lexicographically. All fields are
/// direction-normalized by the caller so that smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueueKey {
    /// Time progressed since the query start, milliseconds.
    pub time: i64,
    /// Transfer count.
    pub transfers: u32,
    /// Departure-time criterion; zero when no departure is fixed yet.
    pub departure: i64,
}

impl QueueKey {
    /// The smallest possible key; used as the heap sentinel.
    pub const MIN: QueueKey = QueueKey {
        time: i64::MIN,
        transfers: 0,
        departure: i64::MIN,
    };

    pub fn new(time: i64, transfers: u32, departure: i64) -> Self {
        Self {
            time,
            transfers,
            departure,
        }
    }
}

/// Misuse of the queue surface.
///
/// Since ids are dense in `[0, capacity)` and each can be queued at most
/// once, pushing beyond capacity always manifests as one of these two id
/// errors. The search treats them as fatal bookkeeping faults; it bounds
/// label allocation before ids ever leave the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrontierError {
    #[error("label id {0} is outside the queue's id range")]
    IdOutOfRange(LabelId),

    #[error("label {0} is already queued")]
    AlreadyQueued(LabelId),

    #[error("label {0} is not queued")]
    NotQueued(LabelId),
}

/// Fixed-capacity indexed min-heap keyed by [`QueueKey`].
///
/// Ids must be dense integers in `[0, capacity)`; each id can be queued at
/// most once at a time.
#[derive(Debug)]
pub struct FrontierQueue {
    /// Heap-ordered keys, 1-based; slot 0 is the sentinel.
    keys: Vec<QueueKey>,
    /// Ids parallel to `keys`; slot 0 is unused.
    ids: Vec<LabelId>,
    /// id -> heap slot, or `NOT_QUEUED`.
    positions: Vec<u32>,
}

impl FrontierQueue {
    /// A queue admitting ids `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: vec![QueueKey::MIN],
            ids: vec![LabelId(u32::MAX)],
            positions: vec![NOT_QUEUED; capacity],
        }
    }

    /// Maximum number of ids this queue can hold.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.keys.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is currently queued.
    pub fn contains(&self, id: LabelId) -> bool {
        self.positions
            .get(id.index())
            .is_some_and(|&p| p != NOT_QUEUED)
    }

    /// Insert a new entry. The id must not already be present.
    pub fn push(&mut self, id: LabelId, key: QueueKey) -> Result<(), FrontierError> {
        if id.index() >= self.positions.len() {
            return Err(FrontierError::IdOutOfRange(id));
        }
        if self.positions[id.index()] != NOT_QUEUED {
            return Err(FrontierError::AlreadyQueued(id));
        }
        self.keys.push(key);
        self.ids.push(id);
        let slot = self.keys.len() - 1;
        self.positions[id.index()] = slot as u32;
        self.sift_up(slot);
        Ok(())
    }

    /// Change the key of a present entry.
    pub fn update(&mut self, id: LabelId, key: QueueKey) -> Result<(), FrontierError> {
        let slot = self.slot_of(id)?;
        let old = self.keys[slot];
        self.keys[slot] = key;
        if key < old {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
        Ok(())
    }

    /// The minimum entry, without removing it.
    pub fn peek(&self) -> Option<(LabelId, QueueKey)> {
        if self.is_empty() {
            None
        } else {
            Some((self.ids[1], self.keys[1]))
        }
    }

    /// Remove and return the minimum entry.
    pub fn pop(&mut self) -> Option<(LabelId, QueueKey)> {
        if self.is_empty() {
            return None;
        }
        let id = self.ids[1];
        let key = self.keys[1];
        self.positions[id.index()] = NOT_QUEUED;
        self.fill_hole(1);
        Some((id, key))
    }

    /// Remove an entry from anywhere in the queue.
    pub fn remove(&mut self, id: LabelId) -> Result<(), FrontierError> {
        let slot = self.slot_of(id)?;
        self.positions[id.index()] = NOT_QUEUED;
        self.fill_hole(slot);
        Ok(())
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        for i in 1..self.ids.len() {
            self.positions[self.ids[i].index()] = NOT_QUEUED;
        }
        self.keys.truncate(1);
        self.ids.truncate(1);
    }

    fn slot_of(&self, id: LabelId) -> Result<usize, FrontierError> {
        if id.index() >= self.positions.len() {
            return Err(FrontierError::IdOutOfRange(id));
        }
        match self.positions[id.index()] {
            NOT_QUEUED => Err(FrontierError::NotQueued(id)),
            slot => Ok(slot as usize),
        }
    }

    /// Move the last entry into the hole at `slot` and restore heap order.
    fn fill_hole(&mut self, slot: usize) {
        let last_key = self.keys.pop().expect("heap is never empty here");
        let last_id = self.ids.pop().expect("heap is never empty here");
        if slot < self.keys.len() {
            self.keys[slot] = last_key;
            self.ids[slot] = last_id;
            self.positions[last_id.index()] = slot as u32;
            // The moved entry may belong above or below its new slot.
            self.sift_up(slot);
            self.sift_down(self.positions[last_id.index()] as usize);
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        let key = self.keys[slot];
        let id = self.ids[slot];
        // keys[0] is QueueKey::MIN, so this loop stops at the root on its own.
        while key < self.keys[slot >> 1] {
            let parent = slot >> 1;
            self.keys[slot] = self.keys[parent];
            self.ids[slot] = self.ids[parent];
            self.positions[self.ids[slot].index()] = slot as u32;
            slot = parent;
        }
        self.keys[slot] = key;
        self.ids[slot] = id;
        self.positions[id.index()] = slot as u32;
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.keys.len();
        let key = self.keys[slot];
        let id = self.ids[slot];
        loop {
            let mut child = slot << 1;
            if child >= len {
                break;
            }
            if child + 1 < len && self.keys[child + 1] < self.keys[child] {
                child += 1;
            }
            if self.keys[child] >= key {
                break;
            }
            self.keys[slot] = self.keys[child];
            self.ids[slot] = self.ids[child];
            self.positions[self.ids[slot].index()] = slot as u32;
            slot = child;
        }
        self.keys[slot] = key;
        self.ids[slot] = id;
        self.positions[id.index()] = slot as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: i64) -> QueueKey {
        QueueKey::new(time, 0, 0)
    }

    #[test]
    fn pops_in_key_order() {
        let mut q = FrontierQueue::new(8);
        for (i, t) in [50, 10, 40, 20, 30].iter().enumerate() {
            q.push(LabelId(i as u32), key(*t)).unwrap();
        }

        let times: Vec<i64> = std::iter::from_fn(|| q.pop()).map(|(_, k)| k.time).collect();
        assert_eq!(times, vec![10, 20, 30, 40, 50]);
        assert!(q.is_empty());
    }

    #[test]
    fn key_order_is_lexicographic() {
        let mut q = FrontierQueue::new(4);
        q.push(LabelId(0), QueueKey::new(10, 2, 0)).unwrap();
        q.push(LabelId(1), QueueKey::new(10, 1, 0)).unwrap();
        q.push(LabelId(2), QueueKey::new(10, 1, -5)).unwrap();

        assert_eq!(q.pop().unwrap().0, LabelId(2));
        assert_eq!(q.pop().unwrap().0, LabelId(1));
        assert_eq!(q.pop().unwrap().0, LabelId(0));
    }

    #[test]
    fn update_moves_entries_both_ways() {
        let mut q = FrontierQueue::new(4);
        q.push(LabelId(0), key(10)).unwrap();
        q.push(LabelId(1), key(20)).unwrap();
        q.push(LabelId(2), key(30)).unwrap();

        // Decrease: last becomes first.
        q.update(LabelId(2), key(5)).unwrap();
        assert_eq!(q.peek().unwrap().0, LabelId(2));

        // Increase: first drops behind.
        q.update(LabelId(2), key(25)).unwrap();
        assert_eq!(q.peek().unwrap().0, LabelId(0));

        let order: Vec<LabelId> = std::iter::from_fn(|| q.pop()).map(|(id, _)| id).collect();
        assert_eq!(order, vec![LabelId(0), LabelId(1), LabelId(2)]);
    }

    #[test]
    fn remove_from_middle() {
        let mut q = FrontierQueue::new(8);
        for i in 0..6 {
            q.push(LabelId(i), key(i64::from(i) * 10)).unwrap();
        }

        q.remove(LabelId(2)).unwrap();
        assert!(!q.contains(LabelId(2)));
        assert_eq!(q.len(), 5);

        let times: Vec<i64> = std::iter::from_fn(|| q.pop()).map(|(_, k)| k.time).collect();
        assert_eq!(times, vec![0, 10, 30, 40, 50]);
    }

    #[test]
    fn push_errors() {
        let mut q = FrontierQueue::new(2);
        q.push(LabelId(0), key(1)).unwrap();

        assert_eq!(
            q.push(LabelId(0), key(2)),
            Err(FrontierError::AlreadyQueued(LabelId(0)))
        );
        // Pushing beyond capacity is an out-of-range id by construction.
        assert_eq!(
            q.push(LabelId(5), key(2)),
            Err(FrontierError::IdOutOfRange(LabelId(5)))
        );

        q.push(LabelId(1), key(2)).unwrap();
        let (popped, _) = q.pop().unwrap();
        q.push(popped, key(3)).unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn update_and_remove_require_presence() {
        let mut q = FrontierQueue::new(4);
        assert_eq!(
            q.update(LabelId(1), key(1)),
            Err(FrontierError::NotQueued(LabelId(1)))
        );
        assert_eq!(q.remove(LabelId(1)), Err(FrontierError::NotQueued(LabelId(1))));
        assert_eq!(
            q.remove(LabelId(9)),
            Err(FrontierError::IdOutOfRange(LabelId(9)))
        );
    }

    #[test]
    fn pop_frees_the_id_for_reuse() {
        let mut q = FrontierQueue::new(1);
        q.push(LabelId(0), key(1)).unwrap();
        assert!(q.contains(LabelId(0)));
        q.pop().unwrap();
        assert!(!q.contains(LabelId(0)));
        q.push(LabelId(0), key(2)).unwrap();
        assert_eq!(q.peek().unwrap().1, key(2));
    }

    #[test]
    fn clear_resets_positions() {
        let mut q = FrontierQueue::new(4);
        q.push(LabelId(0), key(1)).unwrap();
        q.push(LabelId(1), key(2)).unwrap();
        q.clear();
        assert!(q.is_empty());
        assert!(!q.contains(LabelId(0)));
        q.push(LabelId(0), key(3)).unwrap();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn new_minimum_percolates_to_root() {
        let mut q = FrontierQueue::new(16);
        for i in 0..10 {
            q.push(LabelId(i), key(100 + i64::from(i))).unwrap();
        }
        q.push(LabelId(10), key(-7)).unwrap();
        assert_eq!(q.peek(), Some((LabelId(10), key(-7))));
    }
}
