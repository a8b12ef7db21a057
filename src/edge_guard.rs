// Border override: near an edge, step back toward the interior

use log::info;

use crate::types::{Direction, Player, WorldSnapshot};
use crate::validator::MoveValidator;

#[derive(Debug, Clone, Copy)]
pub struct EdgeGuard {
    border_margin: i32,
}

impl EdgeGuard {
    pub fn new(border_margin: i32) -> Self {
        EdgeGuard { border_margin }
    }

    /// Returns a forced inward direction when `me` is within the border margin
    ///
    /// Edges are checked right, left, top, bottom; the first one whose inward
    /// move passes the validator wins. `None` when not near an edge or when no
    /// inward move is safe.
    pub fn force_inward(
        &self,
        snapshot: &WorldSnapshot,
        me: &Player,
        validator: &MoveValidator,
    ) -> Option<Direction> {
        let pos = me.position;
        let margin = self.border_margin;

        let near_right = pos.x >= snapshot.width - margin;
        let near_left = pos.x < margin;
        let near_top = pos.y < margin;
        let near_bottom = pos.y >= snapshot.height - margin;

        if !(near_right || near_left || near_top || near_bottom) {
            return None;
        }

        info!("{}: near border, adjusting movement", me.name);

        [
            (near_right, Direction::West),
            (near_left, Direction::East),
            (near_top, Direction::South),
            (near_bottom, Direction::North),
        ]
        .into_iter()
        .find(|&(near, dir)| near && validator.is_valid_move(snapshot, me, dir))
        .map(|(_, dir)| dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn me_at(x: i32, y: i32) -> Player {
        Player {
            id: 1,
            name: "laura".to_string(),
            position: Position::new(x, y),
        }
    }

    #[test]
    fn test_interior_position_is_left_alone() {
        let me = me_at(10, 10);
        let snapshot = WorldSnapshot::empty(20, 20, vec![me.clone()]);
        let guard = EdgeGuard::new(2);

        assert_eq!(guard.force_inward(&snapshot, &me, &MoveValidator::new(2)), None);
    }

    #[test]
    fn test_each_edge_pushes_inward() {
        let guard = EdgeGuard::new(2);
        let validator = MoveValidator::new(0);
        let cases = [
            ((19, 10), Direction::West),
            ((0, 10), Direction::East),
            ((10, 0), Direction::South),
            ((10, 19), Direction::North),
        ];

        for ((x, y), expected) in cases {
            let me = me_at(x, y);
            let snapshot = WorldSnapshot::empty(20, 20, vec![me.clone()]);
            assert_eq!(
                guard.force_inward(&snapshot, &me, &validator),
                Some(expected),
                "at ({}, {})",
                x,
                y
            );
        }
    }

    #[test]
    fn test_right_edge_checked_before_top() {
        // Top-right corner: both right and top apply, right wins
        let me = me_at(19, 0);
        let snapshot = WorldSnapshot::empty(20, 20, vec![me.clone()]);
        let guard = EdgeGuard::new(2);

        assert_eq!(
            guard.force_inward(&snapshot, &me, &MoveValidator::new(0)),
            Some(Direction::West)
        );
    }

    #[test]
    fn test_blocked_inward_move_falls_through_to_next_edge() {
        let me = me_at(19, 0);
        let mut snapshot = WorldSnapshot::empty(20, 20, vec![me.clone()]);
        snapshot.set_occupancy(&Position::new(18, 0), 5);
        let guard = EdgeGuard::new(2);

        assert_eq!(
            guard.force_inward(&snapshot, &me, &MoveValidator::new(0)),
            Some(Direction::South)
        );
    }

    #[test]
    fn test_validator_margin_can_veto_guard() {
        // West lands on x = 18, still inside the validator's risky band
        let me = me_at(19, 10);
        let snapshot = WorldSnapshot::empty(20, 20, vec![me.clone()]);
        let guard = EdgeGuard::new(2);

        assert_eq!(guard.force_inward(&snapshot, &me, &MoveValidator::new(2)), None);
    }
}
