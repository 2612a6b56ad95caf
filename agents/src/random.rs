// ═══════════════════════════════════════════════════════════════════════
// Random Agent — buys and places at random among legal moves.
// Serves as the easy opponent and for testing engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{attackable_cells, is_alive, territory_capitals, Agent};
use hex_engine::piece::can_merge;
use hex_engine::{Coord, GameInteraction, Piece, PieceKind, Team};
use log::trace;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Purchases are drawn from this list, so cheap units come up more often.
const BUYABLE: [PieceKind; 7] = [
    PieceKind::Castle,
    PieceKind::Peasant,
    PieceKind::Spearman,
    PieceKind::Knight,
    PieceKind::Baron,
    PieceKind::Peasant,
    PieceKind::Spearman,
];

const STOP_PROBABILITY: f64 = 0.005;
const MAX_ITERATIONS: u32 = 400;

pub struct RandomAgent {
    team: Team,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(team: Team, seed: u64) -> Self {
        RandomAgent {
            team,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Makes sure something is in hand. Returns false when nothing can be held.
    fn pick_up(&mut self, game: &mut GameInteraction) -> bool {
        if game.island().hand().is_some() {
            return true;
        }
        let Some(territory) = game.island().selected_territory() else {
            return false;
        };
        let ready = territory.cells_where(game.island().grid(), Piece::is_ready);
        if let Some(&coord) = ready.choose(&mut self.rng) {
            return game.click(coord, false);
        }

        let balance = game.island().balance_of(territory);
        let affordable: Vec<PieceKind> = BUYABLE
            .iter()
            .copied()
            .filter(|k| game.island().price_of(*k).is_some_and(|p| p <= balance))
            .collect();
        match affordable.choose(&mut self.rng) {
            Some(&kind) => {
                trace!("[{}] buying {} with {}", self.team, kind, balance);
                game.buy_unit(kind)
            }
            None => false,
        }
    }

    fn place(&mut self, game: &mut GameInteraction) -> bool {
        let island = game.island();
        let (Some(hand), Some(territory)) = (island.hand().copied(), island.selected_territory()) else {
            return false;
        };
        let candidates: Vec<Coord> = if hand.piece.kind() == PieceKind::Castle {
            territory.cells_where(island.grid(), Piece::is_empty)
        } else {
            let mut cells = territory.cells_where(island.grid(), |p| match p {
                Piece::Capital { .. } | Piece::Castle => false,
                p if p.is_living() => !p.moved() && can_merge(p.kind(), hand.piece.kind()),
                _ => true,
            });
            cells.extend(attackable_cells(island, territory, &hand.piece));
            cells
        };
        match candidates.choose(&mut self.rng) {
            Some(&coord) => game.click(coord, false),
            None => false,
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn team(&self) -> Team {
        self.team
    }

    fn action(&mut self, game: &mut GameInteraction) -> bool {
        if game.current_team() != self.team {
            return is_alive(game.island(), self.team);
        }
        for capital in territory_capitals(game.island(), self.team) {
            let mut iterations = 0;
            while !game.is_game_over() && game.select(Some(capital)) {
                if !self.pick_up(game) || !self.place(game) {
                    break;
                }
                iterations += 1;
                if iterations >= MAX_ITERATIONS || self.rng.gen_bool(STOP_PROBABILITY) {
                    break;
                }
            }
        }
        game.select(None);
        is_alive(game.island(), self.team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_engine::generation::{generate_island, GenerationParams};
    use hex_engine::GameConfig;

    #[test]
    fn test_random_games_stay_valid() {
        for seed in 0..4 {
            let params = GenerationParams { width: 13, height: 13, seed, ..GenerationParams::default() };
            let island = generate_island(&params, GameConfig::default()).unwrap();
            let mut game = GameInteraction::new(island);
            let mut agents: Vec<RandomAgent> =
                Team::ALL.iter().map(|t| RandomAgent::new(*t, seed ^ *t as u64)).collect();

            for _ in 0..(Team::ALL.len() * 6) {
                if game.is_game_over() {
                    break;
                }
                let team = game.current_team();
                for agent in agents.iter_mut().filter(|a| a.team() == team) {
                    agent.action(&mut game);
                }
                game.island().validate().unwrap();
                for territory in game.island().territories().iter() {
                    assert!(game.island().balance_of(territory) >= 0);
                }
                game.end_turn();
            }
        }
    }

    #[test]
    fn test_dead_team_reports_not_alive() {
        let params = GenerationParams { width: 11, height: 11, teams: vec![Team::Sun, Team::Leaf], ..GenerationParams::default() };
        let island = generate_island(&params, GameConfig::default()).unwrap();
        let mut game = GameInteraction::new(island);
        let mut agent = RandomAgent::new(Team::Stone, 1);
        assert!(!agent.action(&mut game));
    }
}
