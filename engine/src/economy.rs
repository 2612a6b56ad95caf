// ═══════════════════════════════════════════════════════════════════════
// Economy — turn start bookkeeping
//
// Runs when a team's turn begins: graves rot into trees, units become
// ready again and every territory collects its income. A territory that
// cannot pay its upkeep goes bankrupt and all of its units die.
// Tree growth runs once per round when play wraps to the starting team.
// ═══════════════════════════════════════════════════════════════════════

use crate::island::Island;
use crate::piece::Piece;
use crate::territory::Territory;
use crate::types::{Coord, Team};
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Mixes the round into the session seed so every round grows differently.
const ROUND_SEED_STRIDE: u64 = 999_961;

/// Whether a treasury of `balance` fails to cover `income` this turn.
pub fn is_bankrupt(balance: i32, income: i32) -> bool {
    balance + income < 0
}

/// Balance after collecting `income`. Never negative.
pub fn settle(balance: i32, income: i32) -> i32 {
    (balance + income).max(0)
}

pub fn begin_turn(island: &mut Island, team: Team) {
    let own: Vec<Coord> = island
        .grid()
        .visible_coords()
        .filter(|c| island.team_at(*c) == Some(team))
        .collect();
    for coord in own {
        match island.piece_at(coord) {
            Some(Piece::Grave) => island.set_piece(coord, Piece::Tree { has_grown: false }),
            Some(p) if p.moved() => island.set_piece(coord, p.with_moved(false)),
            _ => {}
        }
    }

    let territories: Vec<Territory> = island.territories().of_team(team).cloned().collect();
    for territory in territories {
        collect_income(island, &territory);
    }
}

fn collect_income(island: &mut Island, territory: &Territory) {
    let income = island.income_of(territory);
    let balance = island.balance_of(territory);

    if is_bankrupt(balance, income) {
        let units = territory.cells_where(island.grid(), Piece::is_living);
        debug!(
            "{} territory at {} is bankrupt ({} + {}), {} units die",
            territory.team,
            territory.capital,
            balance,
            income,
            units.len()
        );
        for coord in units {
            island.set_piece(coord, Piece::Grave);
        }
    }
    island.set_piece(territory.capital, Piece::Capital { balance: settle(balance, income) });
}

/// Each tree that did not grow last round may spread to one empty neighbour
/// of its own team. Trees grown this round are marked and skipped.
pub fn grow_trees(island: &mut Island) {
    let chance = island.config().tree_growth_chance;
    let seed = island.seed().wrapping_add(u64::from(island.round()).wrapping_mul(ROUND_SEED_STRIDE));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let coords: Vec<Coord> = island.grid().visible_coords().collect();
    for &coord in &coords {
        if let Some(Piece::Tree { has_grown: true }) = island.piece_at(coord) {
            island.set_piece(coord, Piece::Tree { has_grown: false });
        }
    }
    if chance <= 0.0 {
        return;
    }

    let mut grown = 0;
    for coord in coords {
        if island.piece_at(coord) != Some(Piece::Tree { has_grown: false }) {
            continue;
        }
        if !rng.gen_bool(chance.min(1.0)) {
            continue;
        }
        let team = island.team_at(coord);
        let spots: Vec<Coord> = island
            .grid()
            .visible_neighbors(coord)
            .into_iter()
            .filter(|n| island.team_at(*n) == team && island.piece_at(*n).is_some_and(|p| p.is_empty()))
            .collect();
        if let Some(&spot) = spots.choose(&mut rng) {
            island.set_piece(spot, Piece::Tree { has_grown: true });
            grown += 1;
        }
    }
    if grown > 0 {
        debug!("{} trees spread in round {}", grown, island.round());
    }
}
