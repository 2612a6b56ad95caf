use crate::piece::Piece;
use crate::types::Coord;
use serde::{Deserialize, Serialize};

/// What happens to a held piece when the hand is dropped or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RestorePolicy {
    /// Put the piece back where it came from, or refund it if it was bought.
    #[default]
    Default,
    /// The piece is consumed; nothing is given back.
    NoRestore,
    /// Refund the castle that replaced the piece, then behave like `Default`.
    RefundCastleSwap,
}

/// The piece currently held by the acting team.
///
/// A hand is always bound to the selected territory. `origin` is the cell the
/// piece was lifted from, or `None` for a piece that was just bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub piece: Piece,
    pub origin: Option<Coord>,
    pub restore: RestorePolicy,
}

impl Hand {
    pub fn bought(piece: Piece) -> Self {
        Hand { piece, origin: None, restore: RestorePolicy::Default }
    }

    pub fn picked_up(piece: Piece, origin: Coord) -> Self {
        Hand { piece, origin: Some(origin), restore: RestorePolicy::Default }
    }

    pub fn was_bought(&self) -> bool {
        self.origin.is_none()
    }
}
