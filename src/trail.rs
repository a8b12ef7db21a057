// Bounded short-horizon memory of cells the agent itself stepped on
//
// Independent of the server-reported trail: a cell can be empty on the board
// and still be vetoed here because we were there within the last `capacity` moves.

use std::collections::{HashMap, VecDeque};

use crate::types::Position;

/// FIFO recency record with O(1) membership
///
/// `order` and `counts` always describe the same multiset of positions, and
/// `order.len()` never exceeds `capacity`.
#[derive(Debug, Clone)]
pub struct TrailMemory {
    order: VecDeque<Position>,
    counts: HashMap<Position, usize>,
    capacity: usize,
}

impl TrailMemory {
    pub fn new(capacity: usize) -> Self {
        TrailMemory {
            order: VecDeque::with_capacity(capacity + 1),
            counts: HashMap::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends a position, evicting the oldest entry once over capacity
    pub fn remember(&mut self, pos: Position) {
        self.order.push_back(pos);
        *self.counts.entry(pos).or_insert(0) += 1;

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.forget_one(oldest);
            }
        }
    }

    pub fn recently_visited(&self, pos: &Position) -> bool {
        self.counts.contains_key(pos)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.counts.clear();
    }

    fn forget_one(&mut self, pos: Position) {
        if let Some(count) = self.counts.get_mut(&pos) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&pos);
            }
        }
    }
}
