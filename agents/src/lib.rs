pub mod agent;
pub mod random;
pub mod heuristic;
pub mod difficulty;

pub use agent::Agent;
pub use random::RandomAgent;
pub use heuristic::{AiTuning, HeuristicAgent};
pub use difficulty::{Difficulty, PeacefulAgent};
