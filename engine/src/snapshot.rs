// ═══════════════════════════════════════════════════════════════════════
// Snapshot — owned, serializable copy of a whole game session
//
// Used for undo/redo and for persistence. Only visible cells are stored;
// everything else is rebuilt from the grid dimensions and layout.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::IslandError;
use crate::grid::{Grid, GridLayout};
use crate::hand::Hand;
use crate::piece::Piece;
use crate::types::{Coord, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub coord: Coord,
    pub team: Team,
    pub piece: Piece,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub layout: GridLayout,
    /// Visible cells sorted by coordinate.
    pub cells: Vec<CellState>,
    pub team: Team,
    pub round: u32,
    pub seed: u64,
    /// Capital of the selected territory.
    pub selected: Option<Coord>,
    pub hand: Option<Hand>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, IslandError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, IslandError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuilds the grid described by this snapshot.
    pub fn build_grid(&self) -> Result<Grid, IslandError> {
        let mut grid = Grid::new(self.width, self.height, self.layout)?;
        let mut seen: HashSet<Coord> = HashSet::with_capacity(self.cells.len());
        for state in &self.cells {
            if !seen.insert(state.coord) {
                return Err(IslandError::DuplicateCell(state.coord));
            }
            grid.enable(state.coord, state.team, state.piece)?;
        }
        Ok(grid)
    }

    pub fn cell(&self, coord: Coord) -> Option<&CellState> {
        self.cells
            .binary_search_by(|c| c.coord.cmp(&coord))
            .ok()
            .map(|i| &self.cells[i])
    }
}

/// Visible cells of a grid in the order snapshots store them.
pub fn cell_states(grid: &Grid) -> Vec<CellState> {
    let mut cells: Vec<CellState> = grid
        .visible_coords()
        .filter_map(|coord| {
            grid.cell(coord).map(|c| CellState { coord, team: c.team, piece: c.piece })
        })
        .collect();
    cells.sort_by_key(|c| c.coord);
    cells
}
