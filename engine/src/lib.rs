pub mod types;
pub mod piece;
pub mod grid;
pub mod error;
pub mod config;
pub mod events;
pub mod territory;
pub mod hand;
pub mod snapshot;
pub mod economy;
pub mod island;
pub mod history;
pub mod interaction;
pub mod generation;


pub use types::*;
pub use piece::{CapitalPlacement, Piece, PieceKind};
pub use grid::{Cell, Grid, GridLayout};
pub use error::IslandError;
pub use config::{GameConfig, PriceSchedule};
pub use events::{Event, EventBus, EventKind, SubscriptionId};
pub use territory::{Territory, TerritoryIndex};
pub use hand::{Hand, RestorePolicy};
pub use snapshot::{CellState, Snapshot};
pub use island::{GameOutcome, Island};
pub use history::History;
pub use interaction::GameInteraction;
pub use generation::GenerationParams;
