// Expanding square spiral
//
// Sides grow by one cell every four completed sides: 1,1,1,1,2,2,2,2,3,...
// The spiral can wrap around onto its own earlier trail once it grows large
// enough; that entrapment is left to the validator and fallback to handle.

use crate::types::Direction;

/// Persistent state of the spiral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternState {
    pub direction: Direction,
    pub square_size: u32,
    pub steps_on_side: u32,
    pub sides_completed: u32,
}

impl Default for PatternState {
    fn default() -> Self {
        PatternState {
            direction: Direction::North,
            square_size: 1,
            steps_on_side: 0,
            sides_completed: 0,
        }
    }
}

impl PatternState {
    /// Turns clockwise once the current side is complete
    ///
    /// Completing the fourth side grows the square by one.
    pub fn advance(&mut self) {
        if self.steps_on_side < self.square_size {
            return;
        }

        self.direction = self.direction.clockwise();
        self.steps_on_side = 0;
        self.sides_completed += 1;
        if self.sides_completed == 4 {
            self.square_size += 1;
            self.sides_completed = 0;
        }
    }

    /// Direction the spiral wants to move this tick
    pub fn proposal(&self) -> Direction {
        self.direction
    }

    /// Records that the proposed step was taken
    pub fn record_step(&mut self) {
        self.steps_on_side += 1;
    }
}
