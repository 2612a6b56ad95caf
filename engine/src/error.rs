use crate::grid::GridLayout;
use crate::types::Coord;
use thiserror::Error;

/// Reasons an island cannot be built from external data.
///
/// Illegal moves are never reported through this type; interaction entry
/// points answer those with `false`.
#[derive(Error, Debug)]
pub enum IslandError {
    #[error("grid dimensions {width}x{height} are invalid for a {layout:?} layout")]
    InvalidDimensions { width: u32, height: u32, layout: GridLayout },

    #[error("cell {0} is outside the grid")]
    OutOfBounds(Coord),

    #[error("cell {0} is on the grid edge and cannot be part of the island")]
    EdgeCell(Coord),

    #[error("cell {0} is listed more than once")]
    DuplicateCell(Coord),

    #[error("territory containing {0} has no capital")]
    MissingCapital(Coord),

    #[error("territory containing {at} has {count} capitals")]
    MultipleCapitals { at: Coord, count: usize },

    #[error("capital at {0} is not part of any territory")]
    StrayCapital(Coord),

    #[error("the visible cells do not form a single island")]
    Disconnected,

    #[error("the island has no visible cells")]
    NoVisibleCells,

    #[error("selected coordinate {0} is not a territory capital")]
    InvalidSelection(Coord),

    #[error("invalid hand: {0}")]
    InvalidHand(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
