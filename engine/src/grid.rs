// ═══════════════════════════════════════════════════════════════════════
// Hex grid — owned storage of every cell on the board
//
// Cells live in a flat Vec indexed by flat-top odd-q offset position.
// Hexagonal layouts leave the corners of that box unused. Cells that
// have fewer than six in-grid neighbours are edge cells: they exist for
// bookkeeping but are never visible or playable.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::IslandError;
use crate::piece::Piece;
use crate::types::{Coord, Team};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridLayout {
    Rectangular,
    /// A regular hexagon; requires `width == height` and an odd width.
    Hexagonal,
}

// ── Cell ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub team: Team,
    pub piece: Piece,
    /// Not part of the playable island.
    pub disabled: bool,
    /// Grid-boundary cell. Never visible.
    pub edge: bool,
}

impl Cell {
    pub fn visible(&self) -> bool {
        !self.edge && !self.disabled
    }

    pub fn invisible(&self) -> bool {
        !self.visible()
    }
}

// ── Grid ───────────────────────────────────────────────────────────────

/// Largest width or height a grid may have.
pub const MAX_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    layout: GridLayout,
    cells: Vec<Option<Cell>>,
}

impl Grid {
    /// Builds a grid where every non-edge cell is disabled and owned by `Team::Stone`.
    pub fn new(width: u32, height: u32, layout: GridLayout) -> Result<Self, IslandError> {
        let invalid = IslandError::InvalidDimensions { width, height, layout };
        if width < 3 || height < 3 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(invalid);
        }
        if layout == GridLayout::Hexagonal && (width != height || width % 2 == 0) {
            return Err(invalid);
        }
        let Some(size) = (width as usize).checked_mul(height as usize) else {
            return Err(invalid);
        };

        let mut grid = Grid {
            width,
            height,
            layout,
            cells: vec![None; size],
        };

        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let coord = Coord::from_offset(col, row);
                if grid.in_layout(coord) {
                    let idx = row as usize * width as usize + col as usize;
                    grid.cells[idx] = Some(Cell {
                        team: Team::Stone,
                        piece: Piece::Empty,
                        disabled: true,
                        edge: false,
                    });
                }
            }
        }

        // Edge detection needs the full set of cells present.
        let coords: Vec<Coord> = grid.coords().collect();
        for coord in coords {
            let present = coord.neighbors().iter().filter(|n| grid.contains(**n)).count();
            if present != 6 {
                if let Some(cell) = grid.cell_mut(coord) {
                    cell.edge = true;
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    fn in_layout(&self, coord: Coord) -> bool {
        let (col, row) = coord.to_offset();
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return false;
        }
        match self.layout {
            GridLayout::Rectangular => true,
            GridLayout::Hexagonal => {
                let radius = (self.width / 2) as i32;
                let center = Coord::from_offset(radius, radius);
                coord.distance(center) <= radius as u32
            }
        }
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.in_layout(coord) {
            return None;
        }
        let (col, row) = coord.to_offset();
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Whether the coordinate names a cell of this grid (edge cells included).
    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some_and(|i| self.cells[i].is_some())
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        match self.index(coord) {
            Some(i) => self.cells[i].as_mut(),
            None => None,
        }
    }

    /// The cell if it exists and is part of the playable island.
    pub fn visible_cell(&self, coord: Coord) -> Option<&Cell> {
        self.cell(coord).filter(|c| c.visible())
    }

    pub fn is_visible(&self, coord: Coord) -> bool {
        self.visible_cell(coord).is_some()
    }

    /// Every coordinate of the grid in row-major storage order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height as i32).flat_map(move |row| {
            (0..self.width as i32)
                .map(move |col| Coord::from_offset(col, row))
                .filter(move |c| self.contains(*c))
        })
    }

    pub fn visible_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords().filter(move |c| self.is_visible(*c))
    }

    /// Raw neighbours that exist in the grid, edge cells included.
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        coord.neighbors().into_iter().filter(|n| self.contains(*n)).collect()
    }

    /// Neighbours that are part of the playable island.
    pub fn visible_neighbors(&self, coord: Coord) -> Vec<Coord> {
        coord.neighbors().into_iter().filter(|n| self.is_visible(*n)).collect()
    }

    /// Cells of the ring at `radius` around `center`, skipping edge and missing cells.
    pub fn ring(&self, center: Coord, radius: u32) -> Vec<Coord> {
        center
            .ring(radius)
            .into_iter()
            .filter(|c| self.cell(*c).is_some_and(|cell| !cell.edge))
            .collect()
    }

    /// Upper bound on the distance between any two cells.
    pub fn max_radius(&self) -> u32 {
        3 * self.width.max(self.height) + 1
    }

    /// Makes a non-edge cell part of the playable island with the given team and piece.
    pub fn enable(&mut self, coord: Coord, team: Team, piece: Piece) -> Result<(), IslandError> {
        let cell = self.cell_mut(coord).ok_or(IslandError::OutOfBounds(coord))?;
        if cell.edge {
            return Err(IslandError::EdgeCell(coord));
        }
        cell.disabled = false;
        cell.team = team;
        cell.piece = piece;
        Ok(())
    }

    pub fn disable(&mut self, coord: Coord) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.disabled = true;
            cell.piece = Piece::Empty;
        }
    }
}
