// ═══════════════════════════════════════════════════════════════════════
// Territory resolution — connected same-team regions and their capitals
//
// A territory is a maximal set of visible cells of one team connected
// through visible same-team neighbours, with at least
// MIN_CELLS_IN_TERRITORY cells and exactly one capital. The index is
// always rebuilt from scratch; it is never patched incrementally.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::piece::{Piece, NO_STRENGTH};
use crate::types::{Coord, Team};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Smaller groups of cells are not territories and cannot hold a capital.
pub const MIN_CELLS_IN_TERRITORY: usize = 2;

// ── Territory ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    pub team: Team,
    pub capital: Coord,
    pub cells: BTreeSet<Coord>,
}

impl Territory {
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sum of the income of every piece in the territory.
    pub fn income(&self, grid: &Grid) -> i32 {
        self.cells
            .iter()
            .filter_map(|c| grid.cell(*c))
            .map(|cell| cell.piece.income())
            .sum()
    }

    pub fn balance(&self, grid: &Grid) -> i32 {
        grid.cell(self.capital).and_then(|c| c.piece.balance()).unwrap_or(0)
    }

    /// Visible cells of other teams adjacent to this territory.
    pub fn enemy_border(&self, grid: &Grid) -> BTreeSet<Coord> {
        let mut border = BTreeSet::new();
        for &coord in &self.cells {
            for n in grid.visible_neighbors(coord) {
                if grid.cell(n).is_some_and(|c| c.team != self.team) {
                    border.insert(n);
                }
            }
        }
        border
    }

    /// Cells of the territory whose piece matches the predicate, in coordinate order.
    pub fn cells_where<F>(&self, grid: &Grid, pred: F) -> Vec<Coord>
    where
        F: Fn(&Piece) -> bool,
    {
        self.cells
            .iter()
            .copied()
            .filter(|c| grid.cell(*c).is_some_and(|cell| pred(&cell.piece)))
            .collect()
    }
}

// ── Connectivity ───────────────────────────────────────────────────────

/// All visible cells of `start`'s team reachable from `start` through visible
/// same-team neighbours. Empty when `start` is not visible.
pub fn connected_cells(grid: &Grid, start: Coord) -> BTreeSet<Coord> {
    let mut found = BTreeSet::new();
    let team = match grid.visible_cell(start) {
        Some(cell) => cell.team,
        None => return found,
    };

    let mut queue: VecDeque<Coord> = VecDeque::new();
    queue.push_back(start);
    found.insert(start);

    while let Some(current) = queue.pop_front() {
        for n in grid.visible_neighbors(current) {
            if found.contains(&n) {
                continue;
            }
            if grid.cell(n).is_some_and(|c| c.team == team) {
                found.insert(n);
                queue.push_back(n);
            }
        }
    }
    found
}

/// Every connected same-team component of visible cells, in storage order of
/// their first cell.
pub fn components(grid: &Grid) -> Vec<BTreeSet<Coord>> {
    let mut seen: HashSet<Coord> = HashSet::new();
    let mut out = Vec::new();
    for coord in grid.visible_coords() {
        if seen.contains(&coord) {
            continue;
        }
        let component = connected_cells(grid, coord);
        seen.extend(component.iter().copied());
        out.push(component);
    }
    out
}

/// Connected groups of visible cells, ignoring teams. Largest first.
pub fn land_masses(grid: &Grid) -> Vec<BTreeSet<Coord>> {
    let mut seen: HashSet<Coord> = HashSet::new();
    let mut out: Vec<BTreeSet<Coord>> = Vec::new();
    for start in grid.visible_coords() {
        if !seen.insert(start) {
            continue;
        }
        let mut mass = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for n in grid.visible_neighbors(current) {
                if seen.insert(n) {
                    mass.insert(n);
                    queue.push_back(n);
                }
            }
        }
        out.push(mass);
    }
    out.sort_by(|a, b| b.len().cmp(&a.len()));
    out
}

/// Whether every visible cell can reach every other visible cell, ignoring teams.
pub fn is_single_island(grid: &Grid) -> bool {
    land_masses(grid).len() <= 1
}

/// A cell belongs to a territory-sized region when it has at least one visible
/// neighbour of its own team.
pub fn is_part_of_territory(grid: &Grid, coord: Coord) -> bool {
    let Some(cell) = grid.visible_cell(coord) else {
        return false;
    };
    grid.visible_neighbors(coord)
        .iter()
        .any(|n| grid.cell(*n).is_some_and(|c| c.team == cell.team))
}

// ── Protection ─────────────────────────────────────────────────────────

/// Strength needed to exceed in order to take `coord`: the strongest piece on
/// the cell itself or on any visible neighbour of the same team.
pub fn effective_strength(grid: &Grid, coord: Coord) -> u8 {
    let Some(cell) = grid.cell(coord) else {
        return NO_STRENGTH;
    };
    grid.visible_neighbors(coord)
        .iter()
        .filter_map(|n| grid.cell(*n))
        .filter(|c| c.team == cell.team)
        .map(|c| c.piece.strength())
        .fold(cell.piece.strength(), u8::max)
}

pub fn can_attack(grid: &Grid, coord: Coord, strength: u8) -> bool {
    grid.is_visible(coord) && strength > effective_strength(grid, coord)
}

// ── Capital placement ──────────────────────────────────────────────────

/// Distance from `coord` to the closest visible cell of another team, searching
/// no closer than `min_radius`. `None` when no enemy cell exists.
fn distance_to_enemy(grid: &Grid, coord: Coord, team: Team, min_radius: u32) -> Option<u32> {
    (min_radius.max(1)..=grid.max_radius()).find(|&r| {
        grid.ring(coord, r)
            .iter()
            .filter_map(|c| grid.visible_cell(*c))
            .any(|c| c.team != team)
    })
}

/// Score of the ring at `radius`: own cells count 2, cells missing from the
/// grid count 2, invisible cells count 1.
fn ring_score(grid: &Grid, coord: Coord, team: Team, radius: u32) -> u32 {
    let ring = grid.ring(coord, radius);
    let expected = 6 * radius as usize;
    let missing = expected.saturating_sub(ring.len()) as u32;
    let present: u32 = ring
        .iter()
        .filter_map(|c| grid.cell(*c))
        .map(|c| {
            if c.invisible() {
                1
            } else if c.team == team {
                2
            } else {
                0
            }
        })
        .sum();
    2 * missing + present
}

/// Picks where a capital should stand among `candidates` (all of one team).
///
/// Preference order: best capital-placement tier, then the weakest piece to
/// overwrite, then the cell furthest from any enemy, then the best surrounding
/// ring, then the smallest coordinate.
pub fn best_capital_placement(grid: &Grid, candidates: &BTreeSet<Coord>) -> Option<Coord> {
    let team = grid.cell(*candidates.iter().next()?)?.team;

    let tier = candidates
        .iter()
        .filter_map(|c| grid.cell(*c))
        .map(|c| c.piece.capital_placement())
        .min()?;
    let feasible: Vec<Coord> = candidates
        .iter()
        .copied()
        .filter(|c| grid.cell(*c).is_some_and(|cell| cell.piece.capital_placement() == tier))
        .collect();

    let weakest = feasible
        .iter()
        .filter_map(|c| grid.cell(*c))
        .map(|c| c.piece.strength())
        .min()?;
    let feasible: Vec<Coord> = feasible
        .into_iter()
        .filter(|c| grid.cell(*c).is_some_and(|cell| cell.piece.strength() == weakest))
        .collect();

    if feasible.len() == 1 {
        return feasible.first().copied();
    }

    // No enemy at all sorts as the furthest possible distance.
    let unreachable = grid.max_radius() + 1;
    let mut greatest = 1;
    let mut contenders: Vec<Coord> = Vec::new();
    for &coord in &feasible {
        let dist = distance_to_enemy(grid, coord, team, greatest).unwrap_or(unreachable);
        if dist > greatest {
            greatest = dist;
            contenders.clear();
        }
        if dist >= greatest {
            contenders.push(coord);
        }
    }

    log::trace!(
        "{} capital contenders for {} at minimum enemy distance {}",
        contenders.len(),
        team,
        greatest
    );

    let radius = greatest.min(grid.max_radius());
    contenders
        .into_iter()
        .map(|c| (ring_score(grid, c, team, radius), c))
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(_, c)| c)
}

// ── Territory index ────────────────────────────────────────────────────

/// Derived lookup of every territory on the island.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerritoryIndex {
    territories: Vec<Territory>,
    by_cell: HashMap<Coord, usize>,
}

impl TerritoryIndex {
    /// Indexes every component that already satisfies the territory invariant
    /// (large enough, exactly one capital). Does not modify the grid.
    pub fn build(grid: &Grid) -> Self {
        let mut index = TerritoryIndex::default();
        for cells in components(grid) {
            if cells.len() < MIN_CELLS_IN_TERRITORY {
                continue;
            }
            let capitals: Vec<Coord> = cells
                .iter()
                .copied()
                .filter(|c| grid.cell(*c).is_some_and(|cell| cell.piece.is_capital()))
                .collect();
            if capitals.len() != 1 {
                continue;
            }
            let Some(team) = grid.cell(capitals[0]).map(|c| c.team) else {
                continue;
            };
            let id = index.territories.len();
            for &c in &cells {
                index.by_cell.insert(c, id);
            }
            index.territories.push(Territory { team, capital: capitals[0], cells });
        }
        index
    }

    pub fn territory_at(&self, coord: Coord) -> Option<&Territory> {
        self.by_cell.get(&coord).map(|&i| &self.territories[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter()
    }

    pub fn of_team(&self, team: Team) -> impl Iterator<Item = &Territory> {
        self.territories.iter().filter(move |t| t.team == team)
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Teams owning at least one territory, in turn order.
    pub fn teams(&self) -> Vec<Team> {
        Team::ALL
            .iter()
            .copied()
            .filter(|t| self.territories.iter().any(|terr| terr.team == *t))
            .collect()
    }
}
