// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs a complete headless game with agents
// ═══════════════════════════════════════════════════════════════════════

use anyhow::{bail, Result};
use hex_agents::{AiTuning, Agent, Difficulty};
use hex_engine::{GameInteraction, GameOutcome, Island, Team};
use log::{debug, info};
use std::collections::BTreeMap;

/// Result of a completed (or abandoned) game.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub seed: u64,
    /// `None` when the round limit was hit first.
    pub outcome: Option<GameOutcome>,
    /// Round counter when play stopped.
    pub final_round: u32,
    pub team_results: Vec<TeamResult>,
}

impl GameResult {
    /// The single team left standing, if the game was won outright.
    pub fn winner(&self) -> Option<Team> {
        match &self.outcome {
            Some(GameOutcome::Conquered { winner }) => *winner,
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeamResult {
    pub team: Team,
    pub agent_name: String,
    pub territories: usize,
    pub cells: usize,
    pub treasury: i32,
}

/// One agent per team for the given difficulty. Teams played by a human get no agent.
pub fn make_agents(difficulty: Difficulty, seed: u64, tuning: &AiTuning) -> BTreeMap<Team, Box<dyn Agent>> {
    Team::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, &team)| difficulty.create(team, seed.wrapping_add(i as u64), tuning).map(|a| (team, a)))
        .collect()
}

/// Plays `island` to the end, or until `max_rounds` rounds have been played.
/// Teams without an agent pass every turn. `on_round` is called whenever a
/// new round starts.
pub fn run_game(
    island: Island,
    agents: &mut BTreeMap<Team, Box<dyn Agent>>,
    max_rounds: u32,
    mut on_round: impl FnMut(&Island),
) -> Result<(GameResult, Island)> {
    let seed = island.seed();
    let mut game = GameInteraction::new(island);
    // Every team gets at most one turn per round; anything more means end_turn is stuck.
    let max_turns = (max_rounds as usize + 1) * Team::ALL.len();
    let mut turns = 0;

    while !game.is_game_over() && game.island().round() <= max_rounds {
        let team = game.current_team();
        if let Some(agent) = agents.get_mut(&team) {
            let alive = agent.action(&mut game);
            debug!("{} ({}) finished its turn, alive: {}", team, agent.name(), alive);
        }
        if game.is_game_over() {
            break;
        }

        let round = game.island().round();
        if !game.end_turn() {
            bail!("{} could not end its turn in round {}", team, round);
        }
        if game.island().round() != round {
            on_round(game.island());
        }

        turns += 1;
        if turns > max_turns {
            bail!("game exceeded {} turns without finishing (round {})", max_turns, game.island().round());
        }
    }

    let island = game.into_island();
    let result = build_result(&island, seed, agents);
    match &result.outcome {
        Some(outcome) => info!("seed {}: {} in round {}", seed, outcome, result.final_round),
        None => info!("seed {}: no winner by round {}", seed, result.final_round),
    }
    Ok((result, island))
}

fn build_result(island: &Island, seed: u64, agents: &BTreeMap<Team, Box<dyn Agent>>) -> GameResult {
    let team_results = Team::ALL
        .iter()
        .map(|&team| {
            let owned: Vec<_> = island.territories().of_team(team).collect();
            TeamResult {
                team,
                agent_name: agents.get(&team).map_or_else(|| "Player".to_string(), |a| a.name().to_string()),
                territories: owned.len(),
                cells: owned.iter().map(|t| t.len()).sum(),
                treasury: owned.iter().map(|t| island.balance_of(t)).sum(),
            }
        })
        .collect();

    GameResult {
        seed,
        outcome: island.outcome().cloned(),
        final_round: island.round(),
        team_results,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RUNNER TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hex_engine::generation::{generate_island, GenerationParams};
    use hex_engine::GameConfig;

    fn island(seed: u64) -> Island {
        let params = GenerationParams { width: 13, height: 13, seed, ..GenerationParams::default() };
        generate_island(&params, GameConfig::default()).unwrap()
    }

    #[test]
    fn test_peaceful_game_hits_round_limit() {
        let mut agents = make_agents(Difficulty::Unlosable, 1, &AiTuning::default());
        let mut rounds_seen = 0;
        let (result, _) = run_game(island(1), &mut agents, 3, |_| rounds_seen += 1).unwrap();

        assert!(result.outcome.is_none());
        assert_eq!(result.final_round, 4);
        assert_eq!(rounds_seen, 3);
        assert!(result.team_results.iter().all(|r| r.agent_name == "Peaceful"));
    }

    #[test]
    fn test_player_teams_have_no_agent() {
        let agents = make_agents(Difficulty::Player, 1, &AiTuning::default());
        assert!(agents.is_empty());
        assert_eq!(make_agents(Difficulty::Hard, 1, &AiTuning::default()).len(), Team::ALL.len());
    }

    #[test]
    fn test_agents_from_the_largest_seed() {
        let agents = make_agents(Difficulty::Easy, u64::MAX, &AiTuning::default());
        assert_eq!(agents.len(), Team::ALL.len());
    }

    #[test]
    fn test_heuristic_game_is_reproducible() {
        let play = |seed| {
            let mut agents = make_agents(Difficulty::Hard, seed, &AiTuning::default());
            let (result, island) = run_game(island(seed), &mut agents, 15, |_| {}).unwrap();
            (result.outcome, result.final_round, island.capture())
        };
        assert_eq!(play(5), play(5));
    }

    #[test]
    fn test_result_counts_cells_per_team() {
        let mut agents = make_agents(Difficulty::Easy, 2, &AiTuning::default());
        let (result, island) = run_game(island(2), &mut agents, 5, |_| {}).unwrap();
        let total: usize = result.team_results.iter().map(|r| r.cells).sum();
        let in_territories: usize = island.territories().iter().map(|t| t.len()).sum();
        assert_eq!(total, in_territories);
        assert!(result.team_results.iter().all(|r| r.treasury >= 0));
    }
}
