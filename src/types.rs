// Arena types shared by the decision engine and its transports
// Coordinates follow screen convention: x grows east, y grows south

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D grid coordinate
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal movement directions
///
/// Declaration order is the canonical total order used for every tie-break:
/// north, east, south, west.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Returns all directions in canonical order
    pub fn all() -> [Direction; 4] {
        [Direction::North, Direction::East, Direction::South, Direction::West]
    }

    /// Next direction going clockwise (north -> east -> south -> west -> north)
    pub fn clockwise(&self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Converts direction to the lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Parses a direction name, case-insensitively
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "east" => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    /// Unit vector as (dx, dy)
    pub fn unit_vector(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Calculates the adjacent position when moving in this direction
    pub fn apply(&self, pos: &Position) -> Position {
        let (dx, dy) = self.unit_vector();
        Position {
            x: pos.x + dx,
            y: pos.y + dy,
        }
    }
}

/// A player in the arena
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: Position,
}

/// Complete per-tick view of the arena
///
/// `cells` is row-major (`cells[y * width + x]`); 0 means empty, any other
/// value is the id of the player whose trail occupies the cell.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub players: Vec<Player>,
    pub cells: Vec<u32>,
}

impl WorldSnapshot {
    /// Creates an empty arena with the given players and no trails
    pub fn empty(width: i32, height: i32, players: Vec<Player>) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        WorldSnapshot {
            tick: 0,
            width,
            height,
            players,
            cells: vec![0; len],
        }
    }

    pub fn is_inside(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Occupancy of a cell, `None` outside the grid
    pub fn occupancy(&self, pos: &Position) -> Option<u32> {
        if !self.is_inside(pos) {
            return None;
        }
        let index = pos.y as usize * self.width as usize + pos.x as usize;
        self.cells.get(index).copied()
    }

    /// Marks a cell as occupied by a player; out-of-grid positions are ignored
    pub fn set_occupancy(&mut self, pos: &Position, owner: u32) {
        if self.is_inside(pos) {
            let index = pos.y as usize * self.width as usize + pos.x as usize;
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = owner;
            }
        }
    }

    /// Finds the player with the given name
    pub fn find_player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Checks that the snapshot is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 || self.height <= 0 {
            return Err(format!(
                "Grid dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }

        let expected = self.width as usize * self.height as usize;
        if self.cells.len() != expected {
            return Err(format!(
                "Occupancy covers {} cells, expected {} for a {}x{} grid",
                self.cells.len(),
                expected,
                self.width,
                self.height
            ));
        }

        if let Some(player) = self.players.iter().find(|p| !self.is_inside(&p.position)) {
            return Err(format!(
                "Player '{}' is outside the grid at ({}, {})",
                player.name, player.position.x, player.position.y
            ));
        }

        Ok(())
    }
}
