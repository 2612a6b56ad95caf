// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that all AI players implement
//
// KEY DESIGN PRINCIPLE:
//   Agents play through `GameInteraction`, the same entry points a human
//   uses (click, buy, select). They never write to the island directly,
//   so every rule check applies to them exactly as it does to players.
//
//   The runner owns the loop: it calls `action` for the team to move and
//   then ends the turn.
// ═══════════════════════════════════════════════════════════════════════

use hex_engine::territory;
use hex_engine::{Coord, GameInteraction, Island, Piece, Team, Territory};

pub trait Agent: Send {
    /// Human-readable name for this agent (e.g., "Heuristic", "Random").
    fn name(&self) -> &str;

    /// The team this agent is playing.
    fn team(&self) -> Team;

    /// Plays the team's turn. Returns whether the team still owns territory.
    fn action(&mut self, game: &mut GameInteraction) -> bool;
}

/// Capitals of every territory the team owns, in coordinate order.
pub fn territory_capitals(island: &Island, team: Team) -> Vec<Coord> {
    let mut capitals: Vec<Coord> = island.territories().of_team(team).map(|t| t.capital).collect();
    capitals.sort();
    capitals
}

pub fn is_alive(island: &Island, team: Team) -> bool {
    island.territories().of_team(team).next().is_some()
}

/// Enemy border cells the held piece is strong enough to take.
pub fn attackable_cells(island: &Island, territory: &Territory, held: &Piece) -> Vec<Coord> {
    territory
        .enemy_border(island.grid())
        .into_iter()
        .filter(|c| territory::can_attack(island.grid(), *c, held.strength()))
        .collect()
}
