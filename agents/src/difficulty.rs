use crate::agent::{is_alive, Agent};
use crate::heuristic::{AiTuning, HeuristicAgent};
use crate::random::RandomAgent;
use hex_engine::{GameInteraction, Team};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who controls a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// A human. No agent is created.
    Player,
    /// An opponent that never does anything.
    Unlosable,
    Easy,
    #[default]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] =
        [Difficulty::Player, Difficulty::Unlosable, Difficulty::Easy, Difficulty::Hard];

    /// Builds the agent for this difficulty, or `None` for a human player.
    pub fn create(self, team: Team, seed: u64, tuning: &AiTuning) -> Option<Box<dyn Agent>> {
        match self {
            Difficulty::Player => None,
            Difficulty::Unlosable => Some(Box::new(PeacefulAgent::new(team))),
            Difficulty::Easy => Some(Box::new(RandomAgent::new(team, seed))),
            Difficulty::Hard => Some(Box::new(HeuristicAgent::with_tuning(team, seed, tuning.clone()))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Player => "player",
            Difficulty::Unlosable => "unlosable",
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .iter()
            .copied()
            .find(|d| d.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{}' (expected player, unlosable, easy or hard)", s))
    }
}

/// Never moves. Used for opponents that cannot lose on their own.
pub struct PeacefulAgent {
    team: Team,
}

impl PeacefulAgent {
    pub fn new(team: Team) -> Self {
        PeacefulAgent { team }
    }
}

impl Agent for PeacefulAgent {
    fn name(&self) -> &str {
        "Peaceful"
    }

    fn team(&self) -> Team {
        self.team
    }

    fn action(&mut self, game: &mut GameInteraction) -> bool {
        is_alive(game.island(), self.team)
    }
}
