// Last-resort greedy scan over all four directions

use rand::seq::SliceRandom;
use rand::Rng;

use crate::trail::TrailMemory;
use crate::types::{Direction, Player, Position, WorldSnapshot};
use crate::validator::MoveValidator;

/// Scans directions for the first one that is both valid and not recently visited
#[derive(Debug, Clone, Copy)]
pub struct FallbackSelector {
    shuffle: bool,
}

impl FallbackSelector {
    pub fn new(shuffle: bool) -> Self {
        FallbackSelector { shuffle }
    }

    /// Order in which directions are tried
    ///
    /// Canonical north, east, south, west unless shuffling is enabled.
    pub fn scan_order<R: Rng>(&self, rng: &mut R) -> [Direction; 4] {
        let mut order = Direction::all();
        if self.shuffle {
            order.shuffle(rng);
        }
        order
    }

    /// Returns the first acceptable direction with its destination
    ///
    /// `trail` is `None` when trail memory is not consulted.
    pub fn select<R: Rng>(
        &self,
        snapshot: &WorldSnapshot,
        me: &Player,
        validator: &MoveValidator,
        trail: Option<&TrailMemory>,
        rng: &mut R,
    ) -> Option<(Direction, Position)> {
        self.scan_order(rng).into_iter().find_map(|dir| {
            let dest = validator.check(snapshot, me, dir).ok()?;
            if trail.is_some_and(|t| t.recently_visited(&dest)) {
                return None;
            }
            Some((dir, dest))
        })
    }
}
