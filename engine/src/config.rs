// ═══════════════════════════════════════════════════════════════════════
// Game configuration — tunables that are not part of the rules proper
// ═══════════════════════════════════════════════════════════════════════

use crate::error::IslandError;
use crate::piece::PieceKind;
use crate::types::Team;
use serde::{Deserialize, Serialize};

/// Purchase prices keyed by piece kind. Kinds without a price cannot be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSchedule {
    pub peasant: i32,
    pub spearman: i32,
    pub knight: i32,
    pub baron: i32,
    pub castle: i32,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        PriceSchedule {
            peasant: 10,
            spearman: 20,
            knight: 30,
            baron: 40,
            castle: 15,
        }
    }
}

impl PriceSchedule {
    pub fn price(&self, kind: PieceKind) -> Option<i32> {
        match kind {
            PieceKind::Peasant => Some(self.peasant),
            PieceKind::Spearman => Some(self.spearman),
            PieceKind::Knight => Some(self.knight),
            PieceKind::Baron => Some(self.baron),
            PieceKind::Castle => Some(self.castle),
            _ => None,
        }
    }

    /// Every kind that has a price, cheapest first.
    pub fn buyable(&self) -> Vec<PieceKind> {
        let mut kinds: Vec<PieceKind> =
            PieceKind::ALL.iter().copied().filter(|k| self.price(*k).is_some()).collect();
        kinds.sort_by_key(|k| self.price(*k));
        kinds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Balance handed to capitals that start a game empty.
    pub start_capital: i32,
    pub prices: PriceSchedule,
    /// The team that opens every round.
    pub starting_team: Team,
    /// Teams played by humans. History is only recorded on their turns.
    pub human_teams: Vec<Team>,
    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,
    /// Human purchases are free.
    pub cheating: bool,
    /// Long presses march every ready unit of the territory.
    pub hold_to_march: bool,
    /// Chance each round that a tree spreads to a neighbouring empty cell.
    pub tree_growth_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            start_capital: 10,
            prices: PriceSchedule::default(),
            starting_team: Team::Leaf,
            human_teams: Vec::new(),
            history_limit: 512,
            cheating: false,
            hold_to_march: true,
            tree_growth_chance: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, IslandError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_human(&self, team: Team) -> bool {
        self.human_teams.contains(&team)
    }
}
