// Move validation: the single authority for "safe to step there"
//
// Every hazard is an independent predicate so each one can be exercised in
// isolation. `check` evaluates all of them and reports the first one found.

use log::debug;
use std::fmt;

use crate::types::{Direction, Player, Position, WorldSnapshot};

/// Reasons a candidate cell is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    OutOfBounds,
    SelfCollision,
    Occupied,
    PlayerCollision,
    NearEdge,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Hazard::OutOfBounds => "move out of bounds",
            Hazard::SelfCollision => "self-collision",
            Hazard::Occupied => "cell occupied",
            Hazard::PlayerCollision => "collision with another player",
            Hazard::NearEdge => "move near grid edge is risky",
        };
        f.write_str(text)
    }
}

/// Pure move validator parameterized by the risky-edge margin
#[derive(Debug, Clone, Copy)]
pub struct MoveValidator {
    edge_margin: i32,
}

impl MoveValidator {
    pub fn new(edge_margin: i32) -> Self {
        MoveValidator { edge_margin }
    }

    pub fn edge_margin(&self) -> i32 {
        self.edge_margin
    }

    /// Returns true if stepping from `me` in `direction` passes every hazard check
    pub fn is_valid_move(&self, snapshot: &WorldSnapshot, me: &Player, direction: Direction) -> bool {
        self.check(snapshot, me, direction).is_ok()
    }

    /// Evaluates all hazards for a candidate move
    ///
    /// # Returns
    /// * `Ok(Position)` - the destination cell when the move is safe
    /// * `Err(Hazard)` - the first hazard found
    pub fn check(
        &self,
        snapshot: &WorldSnapshot,
        me: &Player,
        direction: Direction,
    ) -> Result<Position, Hazard> {
        let candidate = direction.apply(&me.position);

        let hazard = if is_out_of_bounds(snapshot, &candidate) {
            Some(Hazard::OutOfBounds)
        } else if is_self_collision(snapshot, me, &candidate) {
            Some(Hazard::SelfCollision)
        } else if is_occupied(snapshot, &candidate) {
            Some(Hazard::Occupied)
        } else if collides_with_player(snapshot, me, &candidate) {
            Some(Hazard::PlayerCollision)
        } else if is_near_edge(snapshot, &candidate, self.edge_margin) {
            Some(Hazard::NearEdge)
        } else {
            None
        };

        match hazard {
            Some(hazard) => {
                debug!(
                    "{}: {} at ({}, {}) moving {}",
                    me.name,
                    hazard,
                    candidate.x,
                    candidate.y,
                    direction.as_str()
                );
                Err(hazard)
            }
            None => Ok(candidate),
        }
    }
}

/// Candidate lies outside [0, width) x [0, height)
pub fn is_out_of_bounds(snapshot: &WorldSnapshot, candidate: &Position) -> bool {
    !snapshot.is_inside(candidate)
}

/// Any trail or body occupies the candidate cell
///
/// Cells missing from the occupancy data count as occupied.
pub fn is_occupied(snapshot: &WorldSnapshot, candidate: &Position) -> bool {
    snapshot.occupancy(candidate).map_or(true, |owner| owner != 0)
}

/// Another player's current position equals the candidate
pub fn collides_with_player(snapshot: &WorldSnapshot, me: &Player, candidate: &Position) -> bool {
    snapshot
        .players
        .iter()
        .any(|p| p.id != me.id && p.position == *candidate)
}

/// The candidate cell carries our own id
pub fn is_self_collision(snapshot: &WorldSnapshot, me: &Player, candidate: &Position) -> bool {
    snapshot.occupancy(candidate) == Some(me.id)
}

/// Candidate falls within `margin` cells of any border
pub fn is_near_edge(snapshot: &WorldSnapshot, candidate: &Position, margin: i32) -> bool {
    candidate.x < margin
        || candidate.x >= snapshot.width - margin
        || candidate.y < margin
        || candidate.y >= snapshot.height - margin
}
