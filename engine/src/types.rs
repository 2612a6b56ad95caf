// ═══════════════════════════════════════════════════════════════════════
// Core types — teams and hex coordinates
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

// ── Team ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Sun,
    Leaf,
    Forest,
    Earth,
    Stone,
}

impl Team {
    /// Turn order. Play cycles through this list and wraps around.
    pub const ALL: [Team; 5] = [Team::Sun, Team::Leaf, Team::Forest, Team::Earth, Team::Stone];

    /// The team that acts after this one.
    pub fn next(self) -> Team {
        let idx = Team::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Team::ALL[(idx + 1) % Team::ALL.len()]
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Sun => write!(f, "Sun"),
            Team::Leaf => write!(f, "Leaf"),
            Team::Forest => write!(f, "Forest"),
            Team::Earth => write!(f, "Earth"),
            Team::Stone => write!(f, "Stone"),
        }
    }
}

impl std::str::FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" => Ok(Team::Sun),
            "leaf" => Ok(Team::Leaf),
            "forest" => Ok(Team::Forest),
            "earth" => Ok(Team::Earth),
            "stone" => Ok(Team::Stone),
            other => Err(format!("unknown team '{}'", other)),
        }
    }
}

// ── Coord ──────────────────────────────────────────────────────────────
// Axial hex coordinate. Compact and copyable; the grid maps it to an index.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub q: i32,
    pub r: i32,
}

/// Axial offsets of the six neighbours, in ring-walk order.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl Coord {
    pub const fn new(q: i32, r: i32) -> Self {
        Coord { q, r }
    }

    /// Flat-top "odd-q" offset → axial.
    pub fn from_offset(col: i32, row: i32) -> Self {
        Coord { q: col, r: row - (col - (col & 1)) / 2 }
    }

    /// Axial → flat-top "odd-q" offset `(col, row)`.
    pub fn to_offset(self) -> (i32, i32) {
        (self.q, self.r + (self.q - (self.q & 1)) / 2)
    }

    /// Third cube component.
    pub fn s(self) -> i32 {
        -self.q - self.r
    }

    pub fn offset_by(self, dq: i32, dr: i32) -> Self {
        Coord { q: self.q + dq, r: self.r + dr }
    }

    /// All six neighbouring coordinates, whether or not they exist on a grid.
    pub fn neighbors(self) -> [Coord; 6] {
        DIRECTIONS.map(|(dq, dr)| self.offset_by(dq, dr))
    }

    pub fn distance(self, other: Coord) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// Coordinates at exactly `radius` steps from `self`, walked in a fixed order.
    pub fn ring(self, radius: u32) -> Vec<Coord> {
        if radius == 0 {
            return vec![self];
        }
        let r = radius as i32;
        let mut current = self.offset_by(-r, r);
        let mut out = Vec::with_capacity(6 * radius as usize);
        for &(dq, dr) in &DIRECTIONS {
            for _ in 0..radius {
                current = current.offset_by(dq, dr);
                out.push(current);
            }
        }
        out
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}
