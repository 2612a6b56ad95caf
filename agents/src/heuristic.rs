// ═══════════════════════════════════════════════════════════════════════
// Heuristic Agent — makes decisions using simple strategic heuristics.
// Significantly stronger than RandomAgent.
//
// Each territory is played on its own with no long term plan: pick up or
// buy something worth having, put it where it does the most good, and
// repeat until nothing useful is left or a random stop fires.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{attackable_cells, is_alive, territory_capitals, Agent};
use hex_engine::piece::merged_kind;
use hex_engine::territory::{self, effective_strength};
use hex_engine::{Coord, GameInteraction, Island, Piece, PieceKind, Team, Territory};
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Knobs for how the heuristic agent plays. None of them affect legality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Chance after every move that the agent stops working on a territory.
    pub stop_probability: f64,
    /// Rounds a territory must be able to pay a negative income for.
    pub economy_buffer_rounds: i32,
    /// Chance a unit with nothing to attack is spread out rather than merged.
    pub defensive_placement_chance: f64,
    pub max_knights: usize,
    pub max_barons: usize,
    /// Hard cap on moves per territory per turn.
    pub max_iterations: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        AiTuning {
            stop_probability: 0.005,
            economy_buffer_rounds: 3,
            defensive_placement_chance: 0.85,
            max_knights: 2,
            max_barons: 1,
            max_iterations: 400,
        }
    }
}

/// Whether a territory can live with `new_income`: either it does not lose
/// money, or `balance` covers the loss for `rounds` rounds.
pub fn is_economical(balance: i32, new_income: i32, rounds: i32) -> bool {
    new_income >= 0 || balance + new_income * rounds >= 0
}

pub struct HeuristicAgent {
    team: Team,
    rng: ChaCha8Rng,
    tuning: AiTuning,
}

impl HeuristicAgent {
    pub fn new(team: Team, seed: u64) -> Self {
        Self::with_tuning(team, seed, AiTuning::default())
    }

    pub fn with_tuning(team: Team, seed: u64, tuning: AiTuning) -> Self {
        HeuristicAgent {
            team,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tuning,
        }
    }

    // ── Pick-up phase ───────────────────────────────────────────────────

    /// Gets a piece into the hand. False means there is nothing worth holding.
    fn pick_up(&mut self, game: &mut GameInteraction) -> bool {
        if game.island().hand().is_some() {
            return true;
        }
        let Some(territory) = game.island().selected_territory() else {
            return false;
        };
        let ready = territory.cells_where(game.island().grid(), Piece::is_ready);
        if let Some(&coord) = ready.choose(&mut self.rng) {
            trace!("[{}] picking up {} at {}", self.team, game.island().piece_at(coord).unwrap_or_default(), coord);
            return game.click(coord, false);
        }

        let purchases = self.economical_purchases(game.island(), territory);
        match purchases.choose(&mut self.rng) {
            Some(&kind) => {
                trace!("[{}] buying {} (options {:?})", self.team, kind, purchases);
                game.buy_unit(kind)
            }
            None => {
                trace!(
                    "[{}] nothing economical to buy with {}",
                    self.team,
                    game.island().balance_of(territory)
                );
                false
            }
        }
    }

    fn economical_purchases(&self, island: &Island, territory: &Territory) -> Vec<PieceKind> {
        let balance = island.balance_of(territory);
        let income = island.income_of(territory);
        let has_empty = !territory.cells_where(island.grid(), Piece::is_empty).is_empty();

        island
            .config()
            .prices
            .buyable()
            .into_iter()
            .filter(|kind| {
                let Some(price) = island.price_of(*kind) else {
                    return false;
                };
                if price > balance {
                    return false;
                }
                // A placed unit replaces the income of the empty cell it lands on.
                let delta = if kind.is_living() { kind.income() - PieceKind::Empty.income() } else { 0 };
                match kind {
                    PieceKind::Castle if !has_empty => false,
                    _ => {
                        self.within_caps(island, territory, *kind)
                            && is_economical(balance - price, income + delta, self.tuning.economy_buffer_rounds)
                    }
                }
            })
            .collect()
    }

    /// Whether the territory may hold one more piece of `kind`.
    fn within_caps(&self, island: &Island, territory: &Territory, kind: PieceKind) -> bool {
        let cap = match kind {
            PieceKind::Knight => self.tuning.max_knights,
            PieceKind::Baron => self.tuning.max_barons,
            _ => return true,
        };
        let on_board = territory.cells_where(island.grid(), |p| p.kind() == kind).len();
        on_board < cap
    }

    // ── Placement phase ─────────────────────────────────────────────────

    fn place(&mut self, game: &mut GameInteraction) -> bool {
        let island = game.island();
        let (Some(hand), Some(territory)) = (island.hand().copied(), island.selected_territory()) else {
            return false;
        };
        let target = if hand.piece.kind() == PieceKind::Castle {
            let empty = territory.cells_where(island.grid(), Piece::is_empty);
            self.least_defended(island, empty)
        } else if hand.piece.is_living() {
            self.living_placement(island, territory, &hand.piece)
        } else {
            None
        };

        match target {
            Some(coord) => {
                trace!("[{}] placing {} at {}", self.team, hand.piece, coord);
                game.click(coord, false)
            }
            None => {
                trace!("[{}] no placement for {}", self.team, hand.piece);
                false
            }
        }
    }

    fn living_placement(&mut self, island: &Island, territory: &Territory, held: &Piece) -> Option<Coord> {
        let grid = island.grid();
        let attackable = attackable_cells(island, territory, held);

        let is_tree = |c: &Coord| island.piece_at(*c).is_some_and(|p| p.kind() == PieceKind::Tree);
        let mut trees = territory.cells_where(grid, |p| p.kind() == PieceKind::Tree);
        trees.extend(attackable.iter().copied().filter(is_tree));
        if let Some(&coord) = trees.choose(&mut self.rng) {
            return Some(coord);
        }

        // Taking a cell next to another of our territories joins the two.
        let connecting: Vec<Coord> = attackable
            .iter()
            .copied()
            .filter(|c| {
                grid.visible_neighbors(*c).iter().any(|n| {
                    !territory.contains(*n) && island.team_at(*n) == Some(territory.team)
                })
            })
            .collect();
        if let Some(&coord) = connecting.choose(&mut self.rng) {
            return Some(coord);
        }

        if let Some(coord) = self.strongest_target(island, &attackable) {
            return Some(coord);
        }

        let graves = territory.cells_where(grid, |p| p.kind() == PieceKind::Grave);
        if let Some(&coord) = graves.choose(&mut self.rng) {
            return Some(coord);
        }

        let defend = self.rng.gen_bool(self.tuning.defensive_placement_chance);
        if defend {
            let empty = territory.cells_where(grid, Piece::is_empty);
            self.least_defended(island, empty).or_else(|| self.merge_target(island, territory, held))
        } else {
            self.merge_target(island, territory, held).or_else(|| {
                let empty = territory.cells_where(grid, Piece::is_empty);
                self.least_defended(island, empty)
            })
        }
    }

    /// The attackable cell worth the most: capitals, then castles, then units,
    /// then whatever is most heavily protected.
    fn strongest_target(&mut self, island: &Island, attackable: &[Coord]) -> Option<Coord> {
        let grid = island.grid();
        let score = |c: Coord| {
            let category = match island.piece_at(c) {
                Some(Piece::Capital { .. }) => 3,
                Some(Piece::Castle) => 2,
                Some(p) if p.is_living() => 1,
                _ => 0,
            };
            (category, effective_strength(grid, c))
        };
        let best = attackable.iter().map(|c| score(*c)).max()?;
        let top: Vec<Coord> = attackable.iter().copied().filter(|c| score(*c) == best).collect();
        top.choose(&mut self.rng).copied()
    }

    /// A ready unit of the territory the held piece can merge into without
    /// breaking the budget or the knight and baron caps.
    fn merge_target(&mut self, island: &Island, territory: &Territory, held: &Piece) -> Option<Coord> {
        let balance = island.balance_of(territory);
        let income = island.income_of(territory);
        let candidates: Vec<Coord> = territory
            .cells_where(island.grid(), Piece::is_ready)
            .into_iter()
            .filter(|c| {
                let Some(existing) = island.piece_at(*c) else {
                    return false;
                };
                let Some(merged) = merged_kind(held.kind(), existing.kind()) else {
                    return false;
                };
                self.within_caps(island, territory, merged)
                    && is_economical(
                        balance,
                        income + merged.income() - existing.income(),
                        self.tuning.economy_buffer_rounds,
                    )
            })
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// The candidate cell with the weakest protection around it, preferring the
    /// one with the most friendly neighbours when several tie.
    fn least_defended(&mut self, island: &Island, mut candidates: Vec<Coord>) -> Option<Coord> {
        let grid = island.grid();
        let defence = |c: Coord| {
            let neighbours = grid.visible_neighbors(c);
            let around = if neighbours.is_empty() {
                0.0
            } else {
                neighbours.iter().map(|n| f64::from(effective_strength(grid, *n))).sum::<f64>()
                    / neighbours.len() as f64
            };
            f64::from(effective_strength(grid, c)) + around
        };

        let weakest = candidates.iter().map(|c| defence(*c)).fold(f64::INFINITY, f64::min);
        candidates.retain(|c| defence(*c) <= weakest);
        candidates.shuffle(&mut self.rng);
        let team = island.current_team();
        candidates.into_iter().max_by_key(|c| {
            grid.visible_neighbors(*c)
                .iter()
                .filter(|n| island.team_at(**n) == Some(team))
                .count()
        })
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        "Heuristic"
    }

    fn team(&self) -> Team {
        self.team
    }

    fn action(&mut self, game: &mut GameInteraction) -> bool {
        if game.current_team() != self.team {
            return is_alive(game.island(), self.team);
        }
        for capital in territory_capitals(game.island(), self.team) {
            let mut moves = 0;
            while !game.is_game_over()
                && territory::is_part_of_territory(game.island().grid(), capital)
                && game.select(Some(capital))
            {
                if !self.pick_up(game) || !self.place(game) {
                    break;
                }
                moves += 1;
                if moves >= self.tuning.max_iterations || self.rng.gen_bool(self.tuning.stop_probability) {
                    break;
                }
            }
            debug!("[{}] territory at {} done after {} moves", self.team, capital, moves);
        }
        game.select(None);
        is_alive(game.island(), self.team)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HEURISTIC AGENT TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hex_engine::{GameConfig, Grid, GridLayout};

    fn at(col: i32, row: i32) -> Coord {
        Coord::from_offset(col, row)
    }

    fn game_of(cells: &[(i32, i32, Team, Piece)], config: GameConfig) -> GameInteraction {
        let mut grid = Grid::new(9, 7, GridLayout::Rectangular).unwrap();
        for &(col, row, team, piece) in cells {
            grid.enable(at(col, row), team, piece).unwrap();
        }
        GameInteraction::new(Island::new(grid, config, 7).unwrap())
    }

    #[test]
    fn test_is_economical() {
        assert!(!is_economical(0, -1, 3));
        assert!(is_economical(0, 1, 3));
        assert!(is_economical(0, 0, 3));
        assert!(is_economical(3, -1, 3));
        assert!(!is_economical(3, -2, 3));
    }

    #[test]
    fn test_broke_territory_makes_no_moves() {
        let config = GameConfig { start_capital: 0, ..GameConfig::default() };
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 0 }),
                (2, 3, Team::Leaf, Piece::Empty),
                (3, 3, Team::Sun, Piece::Empty),
                (4, 3, Team::Sun, Piece::Capital { balance: 0 }),
            ],
            config,
        );
        let before = game.island().capture();

        let mut agent = HeuristicAgent::new(Team::Leaf, 1);
        assert!(agent.action(&mut game));
        assert_eq!(game.island().capture(), before);
    }

    #[test]
    fn test_acts_only_on_own_turn() {
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 50 }),
                (2, 3, Team::Leaf, Piece::Empty),
                (3, 3, Team::Sun, Piece::Empty),
                (4, 3, Team::Sun, Piece::Capital { balance: 50 }),
            ],
            GameConfig::default(),
        );
        let before = game.island().capture();
        let mut agent = HeuristicAgent::new(Team::Sun, 1);
        assert!(agent.action(&mut game));
        assert_eq!(game.island().capture(), before);
    }

    #[test]
    fn test_ready_unit_chops_tree() {
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 0 }),
                (2, 3, Team::Leaf, Piece::Peasant { moved: false }),
                (3, 3, Team::Leaf, Piece::Tree { has_grown: false }),
                (4, 3, Team::Leaf, Piece::Empty),
                (5, 3, Team::Sun, Piece::Empty),
                (6, 3, Team::Sun, Piece::Capital { balance: 0 }),
            ],
            GameConfig { start_capital: 0, ..GameConfig::default() },
        );
        let tuning = AiTuning { stop_probability: 1.0, ..AiTuning::default() };
        let mut agent = HeuristicAgent::with_tuning(Team::Leaf, 3, tuning);
        agent.action(&mut game);

        let island = game.island();
        assert_eq!(island.piece_at(at(3, 3)), Some(Piece::Peasant { moved: true }));
        assert_eq!(island.piece_at(at(2, 3)), Some(Piece::Empty));
    }

    #[test]
    fn test_knight_takes_capital() {
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 0 }),
                (2, 3, Team::Leaf, Piece::Empty),
                (3, 3, Team::Leaf, Piece::Knight { moved: false }),
                (4, 3, Team::Sun, Piece::Capital { balance: 5 }),
                (5, 3, Team::Sun, Piece::Empty),
                (6, 3, Team::Sun, Piece::Empty),
            ],
            GameConfig { start_capital: 0, ..GameConfig::default() },
        );
        let tuning = AiTuning { stop_probability: 1.0, ..AiTuning::default() };
        let mut agent = HeuristicAgent::with_tuning(Team::Leaf, 11, tuning);
        assert!(agent.action(&mut game));

        let island = game.island();
        assert_eq!(island.team_at(at(4, 3)), Some(Team::Leaf));
        assert_eq!(island.piece_at(at(4, 3)), Some(Piece::Knight { moved: true }));
    }

    #[test]
    fn test_castle_goes_to_least_defended_cell() {
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 0 }),
                (2, 3, Team::Leaf, Piece::Castle),
                (3, 3, Team::Leaf, Piece::Empty),
                (4, 3, Team::Leaf, Piece::Empty),
                (5, 3, Team::Leaf, Piece::Empty),
                (6, 3, Team::Sun, Piece::Empty),
                (7, 3, Team::Sun, Piece::Capital { balance: 0 }),
            ],
            GameConfig { start_capital: 0, ..GameConfig::default() },
        );
        game.select(Some(at(1, 3)));
        let island = game.island();
        let territory = island.selected_territory().unwrap().clone();
        let empty = territory.cells_where(island.grid(), Piece::is_empty);

        let mut agent = HeuristicAgent::new(Team::Leaf, 5);
        let choice = agent.least_defended(island, empty);
        // (3,3) is covered by the castle and (5,3) has the weakest surroundings.
        assert_eq!(choice, Some(at(5, 3)));
    }

    #[test]
    fn test_purchases_respect_budget_and_caps() {
        let mut game = game_of(
            &[
                (1, 3, Team::Leaf, Piece::Capital { balance: 35 }),
                (2, 3, Team::Leaf, Piece::Empty),
                (3, 3, Team::Leaf, Piece::Empty),
                (4, 3, Team::Leaf, Piece::Empty),
                (5, 3, Team::Sun, Piece::Empty),
                (6, 3, Team::Sun, Piece::Capital { balance: 0 }),
            ],
            GameConfig::default(),
        );
        game.select(Some(at(1, 3)));
        let island = game.island();
        let territory = island.selected_territory().unwrap();

        let agent = HeuristicAgent::new(Team::Leaf, 5);
        let kinds = agent.economical_purchases(island, territory);
        // Income 4: a peasant leaves 1, a spearman -3 which 15 gold covers for
        // three rounds, a knight -15 which 5 gold does not.
        assert_eq!(kinds, vec![PieceKind::Peasant, PieceKind::Castle, PieceKind::Spearman]);

        let capped = HeuristicAgent::with_tuning(Team::Leaf, 5, AiTuning { max_knights: 0, ..AiTuning::default() });
        assert!(!capped.within_caps(island, territory, PieceKind::Knight));
        assert!(capped.within_caps(island, territory, PieceKind::Peasant));
    }

    #[test]
    fn test_plays_a_generated_island_without_panicking() {
        use hex_engine::generation::{generate_island, GenerationParams};

        let params = GenerationParams { width: 15, height: 15, seed: 3, ..GenerationParams::default() };
        let island = generate_island(&params, GameConfig::default()).unwrap();
        let mut game = GameInteraction::new(island);
        let mut agents: Vec<HeuristicAgent> =
            Team::ALL.iter().map(|t| HeuristicAgent::new(*t, *t as u64)).collect();

        for _ in 0..(Team::ALL.len() * 4) {
            if game.is_game_over() {
                break;
            }
            let team = game.current_team();
            if let Some(agent) = agents.iter_mut().find(|a| a.team() == team) {
                agent.action(&mut game);
            }
            assert!(game.island().validate().is_ok());
            if !game.is_game_over() {
                assert!(game.island().hand().is_none());
            }
            game.end_turn();
        }
    }
}
