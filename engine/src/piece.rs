// ═══════════════════════════════════════════════════════════════════════
// Piece model — what can stand on a hexagon
//
// `PieceKind` is the fieldless tag used for rule tables, prices and
// lookups. `Piece` is the value stored in a cell and carries the little
// bit of per-instance state some kinds need (capital balance, tree
// growth, unit movement).
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

pub const NO_STRENGTH: u8 = 0;
pub const PEASANT_STRENGTH: u8 = 1;
pub const SPEARMAN_STRENGTH: u8 = 2;
pub const KNIGHT_STRENGTH: u8 = 3;
pub const BARON_STRENGTH: u8 = 4;

/// How willing a capital is to be placed on a cell holding this piece.
/// Lower is better; a capital is only put on a worse tier when no better one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapitalPlacement {
    Strongly,
    Weakly,
    LastResort,
}

// ── PieceKind ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Empty,
    Capital,
    Castle,
    Tree,
    Grave,
    Peasant,
    Spearman,
    Knight,
    Baron,
}

impl PieceKind {
    pub const ALL: [PieceKind; 9] = [
        PieceKind::Empty,
        PieceKind::Capital,
        PieceKind::Castle,
        PieceKind::Tree,
        PieceKind::Grave,
        PieceKind::Peasant,
        PieceKind::Spearman,
        PieceKind::Knight,
        PieceKind::Baron,
    ];

    /// Living pieces in ascending strength.
    pub const LIVING: [PieceKind; 4] =
        [PieceKind::Peasant, PieceKind::Spearman, PieceKind::Knight, PieceKind::Baron];

    /// Strength used both to attack and to protect neighbouring cells.
    pub fn strength(self) -> u8 {
        match self {
            PieceKind::Empty | PieceKind::Grave => NO_STRENGTH,
            PieceKind::Capital | PieceKind::Peasant => PEASANT_STRENGTH,
            PieceKind::Castle | PieceKind::Tree | PieceKind::Spearman => SPEARMAN_STRENGTH,
            PieceKind::Knight => KNIGHT_STRENGTH,
            PieceKind::Baron => BARON_STRENGTH,
        }
    }

    /// Contribution of a cell holding this piece to its territory's income per turn.
    /// Living pieces are upkeep and therefore negative.
    pub fn income(self) -> i32 {
        match self {
            PieceKind::Empty | PieceKind::Capital | PieceKind::Castle => 1,
            PieceKind::Tree | PieceKind::Grave => 0,
            PieceKind::Peasant => -2,
            PieceKind::Spearman => -6,
            PieceKind::Knight => -18,
            PieceKind::Baron => -54,
        }
    }

    pub fn is_living(self) -> bool {
        matches!(
            self,
            PieceKind::Peasant | PieceKind::Spearman | PieceKind::Knight | PieceKind::Baron
        )
    }

    /// Only living pieces can be picked up and moved once placed.
    pub fn movable(self) -> bool {
        self.is_living()
    }

    pub fn capital_placement(self) -> CapitalPlacement {
        match self {
            PieceKind::Empty => CapitalPlacement::Strongly,
            PieceKind::Tree | PieceKind::Grave => CapitalPlacement::Weakly,
            _ => CapitalPlacement::LastResort,
        }
    }

    /// The living piece with exactly this strength, if any.
    pub fn from_strength(strength: u8) -> Option<PieceKind> {
        PieceKind::LIVING.iter().copied().find(|k| k.strength() == strength)
    }

    /// A freshly created piece of this kind: unmoved, ungrown, zero balance.
    pub fn instantiate(self) -> Piece {
        match self {
            PieceKind::Empty => Piece::Empty,
            PieceKind::Capital => Piece::Capital { balance: 0 },
            PieceKind::Castle => Piece::Castle,
            PieceKind::Tree => Piece::Tree { has_grown: false },
            PieceKind::Grave => Piece::Grave,
            PieceKind::Peasant => Piece::Peasant { moved: false },
            PieceKind::Spearman => Piece::Spearman { moved: false },
            PieceKind::Knight => Piece::Knight { moved: false },
            PieceKind::Baron => Piece::Baron { moved: false },
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::str::FromStr for PieceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::ALL
            .iter()
            .copied()
            .find(|k| k.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown piece '{}'", s))
    }
}

/// Kind produced by merging two living pieces, or `None` when either input is not
/// living or the combined strength exceeds a baron.
pub fn merged_kind(a: PieceKind, b: PieceKind) -> Option<PieceKind> {
    if !a.is_living() || !b.is_living() {
        return None;
    }
    PieceKind::from_strength(a.strength() + b.strength())
}

pub fn can_merge(a: PieceKind, b: PieceKind) -> bool {
    merged_kind(a, b).is_some()
}

// ── Piece ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    #[default]
    Empty,
    Capital { balance: i32 },
    Castle,
    Tree { has_grown: bool },
    Grave,
    Peasant { moved: bool },
    Spearman { moved: bool },
    Knight { moved: bool },
    Baron { moved: bool },
}

impl Piece {
    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::Empty => PieceKind::Empty,
            Piece::Capital { .. } => PieceKind::Capital,
            Piece::Castle => PieceKind::Castle,
            Piece::Tree { .. } => PieceKind::Tree,
            Piece::Grave => PieceKind::Grave,
            Piece::Peasant { .. } => PieceKind::Peasant,
            Piece::Spearman { .. } => PieceKind::Spearman,
            Piece::Knight { .. } => PieceKind::Knight,
            Piece::Baron { .. } => PieceKind::Baron,
        }
    }

    pub fn strength(&self) -> u8 {
        self.kind().strength()
    }

    pub fn income(&self) -> i32 {
        self.kind().income()
    }

    pub fn is_living(&self) -> bool {
        self.kind().is_living()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Piece::Empty)
    }

    pub fn is_capital(&self) -> bool {
        matches!(self, Piece::Capital { .. })
    }

    pub fn capital_placement(&self) -> CapitalPlacement {
        self.kind().capital_placement()
    }

    /// Whether a living piece has already acted this turn. Always false for other kinds.
    pub fn moved(&self) -> bool {
        match *self {
            Piece::Peasant { moved }
            | Piece::Spearman { moved }
            | Piece::Knight { moved }
            | Piece::Baron { moved } => moved,
            _ => false,
        }
    }

    /// Same piece with the `moved` flag replaced. Non-living pieces are returned unchanged.
    pub fn with_moved(self, moved: bool) -> Piece {
        match self {
            Piece::Peasant { .. } => Piece::Peasant { moved },
            Piece::Spearman { .. } => Piece::Spearman { moved },
            Piece::Knight { .. } => Piece::Knight { moved },
            Piece::Baron { .. } => Piece::Baron { moved },
            other => other,
        }
    }

    /// A living piece that has not acted this turn.
    pub fn is_ready(&self) -> bool {
        self.is_living() && !self.moved()
    }

    pub fn balance(&self) -> Option<i32> {
        match *self {
            Piece::Capital { balance } => Some(balance),
            _ => None,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Piece::Capital { balance } => write!(f, "Capital({})", balance),
            p if p.moved() => write!(f, "{}*", p.kind()),
            p => write!(f, "{}", p.kind()),
        }
    }
}
