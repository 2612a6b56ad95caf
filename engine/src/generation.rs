// ═══════════════════════════════════════════════════════════════════════
// Island generation — seeded random islands for new games
//
// Land is kept where the normalised distance to the grid centre plus a
// per-cell jitter stays under the land threshold. Each land cell gets a
// random team and sometimes a tree. Only the largest land mass survives;
// capitals are placed afterwards by `Island::new`.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::error::IslandError;
use crate::grid::{Grid, GridLayout};
use crate::island::Island;
use crate::piece::Piece;
use crate::territory;
use crate::types::{Coord, Team};
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub width: u32,
    pub height: u32,
    pub layout: GridLayout,
    pub seed: u64,
    /// Teams that land is handed out to.
    pub teams: Vec<Team>,
    /// Cells whose jittered distance from the centre (0 at the centre, 1 at
    /// the border) is at most this become land.
    pub land_threshold: f64,
    /// Maximum absolute jitter added to each cell's distance.
    pub jitter: f64,
    pub tree_chance: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            width: 25,
            height: 25,
            layout: GridLayout::Hexagonal,
            seed: 0,
            teams: Team::ALL.to_vec(),
            land_threshold: 0.8,
            jitter: 0.25,
            tree_chance: 0.05,
        }
    }
}

/// Builds the grid of a random island. The grid has no capitals yet.
pub fn generate(params: &GenerationParams) -> Result<Grid, IslandError> {
    let mut grid = Grid::new(params.width, params.height, params.layout)?;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let teams: &[Team] = if params.teams.is_empty() { &Team::ALL } else { &params.teams };

    let half_w = f64::from(params.width) / 2.0;
    let half_h = f64::from(params.height) / 2.0;
    let coords: Vec<Coord> = grid.coords().collect();

    for coord in coords {
        if grid.cell(coord).is_some_and(|c| c.edge) {
            continue;
        }
        let (col, row) = coord.to_offset();
        let dx = (f64::from(col) + 0.5 - half_w) / half_w;
        let dy = (f64::from(row) + 0.5 - half_h) / half_h;
        let distance = (dx * dx + dy * dy).sqrt();
        let jitter = if params.jitter > 0.0 { rng.gen_range(-params.jitter..=params.jitter) } else { 0.0 };
        if distance + jitter > params.land_threshold {
            continue;
        }

        let team = teams.choose(&mut rng).copied().unwrap_or(Team::Sun);
        let piece = if rng.gen_bool(params.tree_chance.clamp(0.0, 1.0)) {
            Piece::Tree { has_grown: false }
        } else {
            Piece::Empty
        };
        grid.enable(coord, team, piece)?;
    }

    let masses = territory::land_masses(&grid);
    let Some(largest) = masses.first() else {
        return Err(IslandError::NoVisibleCells);
    };
    let sunk: Vec<Coord> = masses.iter().skip(1).flatten().copied().collect();
    for coord in &sunk {
        grid.disable(*coord);
    }
    debug!(
        "generated island of {} cells from seed {} ({} cells sunk)",
        largest.len(),
        params.seed,
        sunk.len()
    );
    Ok(grid)
}

/// Generates a grid and starts a game on it.
pub fn generate_island(params: &GenerationParams, config: GameConfig) -> Result<Island, IslandError> {
    let grid = generate(params)?;
    Island::new(grid, config, params.seed)
}
