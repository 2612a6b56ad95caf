// ═══════════════════════════════════════════════════════════════════════
// Island — the game session aggregate
//
// Owns the grid, the acting team, the round counter, the selected
// territory, the hand and the derived territory index. Every rule that
// mutates the board lives here as a method returning `bool`: `false`
// means the move was illegal and nothing changed. History and input
// mapping sit on top of this in `interaction`.
//
// All cell writes go through `set_piece` / `set_team` so the event bus
// sees every visible change exactly once.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::economy;
use crate::error::IslandError;
use crate::events::{Event, EventBus};
use crate::grid::Grid;
use crate::hand::{Hand, RestorePolicy};
use crate::piece::{merged_kind, Piece, PieceKind};
use crate::snapshot::{cell_states, Snapshot};
use crate::territory::{self, Territory, TerritoryIndex, MIN_CELLS_IN_TERRITORY};
use crate::types::{Coord, Team};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// At most one team still owns territory.
    Conquered { winner: Option<Team> },
    /// Every human team has been wiped out by the listed survivors.
    HumansDefeated { by: Vec<Team> },
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Conquered { winner: Some(team) } => write!(f, "{} conquered the island", team),
            GameOutcome::Conquered { winner: None } => write!(f, "nobody holds the island"),
            GameOutcome::HumansDefeated { by } => {
                let names: Vec<String> = by.iter().map(|t| t.to_string()).collect();
                write!(f, "humans defeated by {}", names.join(", "))
            }
        }
    }
}

#[derive(Debug)]
pub struct Island {
    grid: Grid,
    config: GameConfig,
    seed: u64,
    team: Team,
    round: u32,
    territories: TerritoryIndex,
    /// Capital of the selected territory.
    selected: Option<Coord>,
    hand: Option<Hand>,
    outcome: Option<GameOutcome>,
    events: EventBus,
}

impl Island {
    /// Starts a new game on `grid`. Capitals are created or merged as needed,
    /// empty treasuries receive the starting capital and every unit is ready.
    pub fn new(grid: Grid, config: GameConfig, seed: u64) -> Result<Self, IslandError> {
        if grid.visible_coords().next().is_none() {
            return Err(IslandError::NoVisibleCells);
        }
        let team = config.starting_team;
        let mut island = Island {
            grid,
            config,
            seed,
            team,
            round: 1,
            territories: TerritoryIndex::default(),
            selected: None,
            hand: None,
            outcome: None,
            events: EventBus::new(),
        };

        island.refresh_territories();

        let capitals: Vec<Coord> = island.territories.iter().map(|t| t.capital).collect();
        for capital in capitals {
            if island.piece_at(capital).and_then(|p| p.balance()) == Some(0) {
                let start = island.config.start_capital;
                island.set_piece(capital, Piece::Capital { balance: start });
            }
        }

        let coords: Vec<Coord> = island.grid.visible_coords().collect();
        for coord in coords {
            let piece = match island.piece_at(coord) {
                Some(Piece::Tree { .. }) => Piece::Tree { has_grown: false },
                Some(p) => p.with_moved(false),
                None => continue,
            };
            island.set_piece(coord, piece);
        }

        island.validate()?;
        island.outcome = island.compute_outcome();
        debug!(
            "island ready: {} territories, {} visible cells, {} to move",
            island.territories.len(),
            island.grid.visible_coords().count(),
            island.team
        );
        Ok(island)
    }

    /// Loads a saved session. Fails when the snapshot describes an island that
    /// breaks the territory invariants.
    pub fn from_snapshot(snapshot: &Snapshot, config: GameConfig) -> Result<Self, IslandError> {
        let grid = snapshot.build_grid()?;
        let mut island = Island {
            grid,
            config,
            seed: snapshot.seed,
            team: snapshot.team,
            round: snapshot.round,
            territories: TerritoryIndex::default(),
            selected: None,
            hand: None,
            outcome: None,
            events: EventBus::new(),
        };
        island.validate()?;
        island.restore(snapshot)?;
        Ok(island)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_team(&self) -> Team {
        self.team
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn territories(&self) -> &TerritoryIndex {
        &self.territories
    }

    pub fn territory_at(&self, coord: Coord) -> Option<&Territory> {
        self.territories.territory_at(coord)
    }

    pub fn selected_territory(&self) -> Option<&Territory> {
        self.selected.and_then(|c| self.territories.territory_at(c))
    }

    pub fn selected_capital(&self) -> Option<Coord> {
        self.selected
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    pub fn piece_at(&self, coord: Coord) -> Option<Piece> {
        self.grid.cell(coord).map(|c| c.piece)
    }

    pub fn team_at(&self, coord: Coord) -> Option<Team> {
        self.grid.cell(coord).map(|c| c.team)
    }

    pub fn income_of(&self, territory: &Territory) -> i32 {
        territory.income(&self.grid)
    }

    pub fn balance_of(&self, territory: &Territory) -> i32 {
        territory.balance(&self.grid)
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// What a purchase of `kind` costs the acting team, or `None` if it has no price.
    pub fn price_of(&self, kind: PieceKind) -> Option<i32> {
        let price = self.config.prices.price(kind)?;
        if self.config.cheating && self.config.is_human(self.team) {
            Some(0)
        } else {
            Some(price)
        }
    }

    // ── Cell writes ─────────────────────────────────────────────────────

    pub fn set_piece(&mut self, coord: Coord, piece: Piece) {
        let Some(cell) = self.grid.cell_mut(coord) else {
            return;
        };
        let old = cell.piece;
        if old == piece {
            return;
        }
        cell.piece = piece;
        if cell.visible() {
            self.events.fire(&Event::piece_changed(coord, old, piece));
        }
    }

    pub fn set_team(&mut self, coord: Coord, team: Team) {
        let Some(cell) = self.grid.cell_mut(coord) else {
            return;
        };
        let old = cell.team;
        if old == team {
            return;
        }
        cell.team = team;
        if cell.visible() {
            self.events.fire(&Event::team_changed(coord, old, team));
        }
    }

    fn adjust_balance(&mut self, capital: Coord, delta: i32) {
        if let Some(balance) = self.piece_at(capital).and_then(|p| p.balance()) {
            self.set_piece(capital, Piece::Capital { balance: balance + delta });
        }
    }

    // ── Territories ─────────────────────────────────────────────────────

    /// Re-establishes one capital per territory and rebuilds the index.
    ///
    /// Components with no capital get one at the best placement with an empty
    /// treasury. Components with several keep the best-placed one, which takes
    /// over the others' balances. A capital stranded on a lone cell becomes a tree.
    pub fn refresh_territories(&mut self) {
        for cells in territory::components(&self.grid) {
            self.normalise_capitals(&cells);
        }
        self.territories = TerritoryIndex::build(&self.grid);
        self.selected = self
            .selected
            .and_then(|c| self.territories.territory_at(c))
            .filter(|t| t.team == self.team)
            .map(|t| t.capital);
        if self.selected.is_none() && self.hand.is_some() {
            warn!("hand dropped because its territory no longer exists");
            self.hand = None;
        }
    }

    fn normalise_capitals(&mut self, cells: &BTreeSet<Coord>) {
        let capitals: Vec<Coord> = cells
            .iter()
            .copied()
            .filter(|c| self.piece_at(*c).is_some_and(|p| p.is_capital()))
            .collect();

        if cells.len() < MIN_CELLS_IN_TERRITORY {
            for capital in capitals {
                self.set_piece(capital, Piece::Tree { has_grown: false });
            }
            return;
        }

        match capitals.len() {
            0 => {
                if let Some(at) = territory::best_capital_placement(&self.grid, cells) {
                    debug!("new capital at {}", at);
                    self.set_piece(at, Piece::Capital { balance: 0 });
                }
            }
            1 => {}
            n => {
                let set: BTreeSet<Coord> = capitals.iter().copied().collect();
                let keep = territory::best_capital_placement(&self.grid, &set).unwrap_or(capitals[0]);
                let total: i32 = capitals
                    .iter()
                    .filter_map(|c| self.piece_at(*c).and_then(|p| p.balance()))
                    .sum();
                debug!("merging {} capitals into {} with balance {}", n, keep, total);
                for capital in capitals {
                    if capital != keep {
                        self.set_piece(capital, Piece::Empty);
                    }
                }
                self.set_piece(keep, Piece::Capital { balance: total });
            }
        }
    }

    /// Checks the invariants every playable island holds.
    pub fn validate(&self) -> Result<(), IslandError> {
        if self.grid.visible_coords().next().is_none() {
            return Err(IslandError::NoVisibleCells);
        }
        if !territory::is_single_island(&self.grid) {
            return Err(IslandError::Disconnected);
        }
        for cells in territory::components(&self.grid) {
            let capitals: Vec<Coord> = cells
                .iter()
                .copied()
                .filter(|c| self.piece_at(*c).is_some_and(|p| p.is_capital()))
                .collect();
            if cells.len() < MIN_CELLS_IN_TERRITORY {
                if let Some(&stray) = capitals.first() {
                    return Err(IslandError::StrayCapital(stray));
                }
                continue;
            }
            match capitals.len() {
                0 => {
                    let at = cells.iter().next().copied().unwrap_or(Coord::new(0, 0));
                    return Err(IslandError::MissingCapital(at));
                }
                1 => {}
                count => return Err(IslandError::MultipleCapitals { at: capitals[0], count }),
            }
        }
        Ok(())
    }

    // ── Selection and hand ──────────────────────────────────────────────

    /// Selects the acting team's territory containing `coord`, or deselects on `None`.
    /// Changing the selection drops the hand through its restore policy.
    pub fn select(&mut self, coord: Option<Coord>) -> bool {
        let capital = match coord {
            None => None,
            Some(c) => match self.territories.territory_at(c) {
                Some(t) if t.team == self.team => Some(t.capital),
                _ => return false,
            },
        };
        if capital != self.selected {
            self.set_hand(None);
        }
        self.selected = capital;
        true
    }

    /// Replaces the hand. The previous hand, if any, is restored first.
    pub fn set_hand(&mut self, hand: Option<Hand>) {
        if let Some(old) = self.hand.take() {
            self.restore_hand(old);
        }
        self.hand = hand;
    }

    fn restore_hand(&mut self, hand: Hand) {
        match hand.restore {
            RestorePolicy::NoRestore => {}
            RestorePolicy::Default => self.return_held(hand),
            RestorePolicy::RefundCastleSwap => {
                if let (Some(capital), Some(price)) = (self.selected, self.price_of(PieceKind::Castle)) {
                    self.adjust_balance(capital, price);
                }
                self.return_held(hand);
            }
        }
    }

    fn return_held(&mut self, hand: Hand) {
        match hand.origin {
            Some(origin) => self.set_piece(origin, hand.piece.with_moved(false)),
            None => {
                if let (Some(capital), Some(price)) = (self.selected, self.price_of(hand.piece.kind())) {
                    self.adjust_balance(capital, price);
                }
            }
        }
    }

    // ── Actions ─────────────────────────────────────────────────────────

    /// Lifts a ready unit of the selected territory into the empty hand.
    pub fn pick_up(&mut self, coord: Coord) -> bool {
        if self.is_game_over() || self.hand.is_some() {
            return false;
        }
        if !self.selected_territory().is_some_and(|t| t.contains(coord)) {
            return false;
        }
        let Some(piece) = self.piece_at(coord).filter(|p| p.is_ready()) else {
            return false;
        };
        self.set_piece(coord, Piece::Empty);
        self.hand = Some(Hand::picked_up(piece, coord));
        true
    }

    /// Puts the held piece on `coord`: a move, merge, capture, tree chop or
    /// castle swap depending on what is there.
    pub fn place_down(&mut self, coord: Coord) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(hand) = self.hand else {
            return false;
        };
        let Some(territory) = self.selected_territory().cloned() else {
            return false;
        };
        let Some(target) = self.grid.visible_cell(coord).copied() else {
            return false;
        };

        let own = target.team == territory.team;
        if own && !territory.contains(coord) {
            return false;
        }
        if !own && !territory.enemy_border(&self.grid).contains(&coord) {
            return false;
        }

        let held = hand.piece.kind();
        let placed = if held == PieceKind::Castle {
            if own && target.piece.is_ready() {
                // The unit standing here is rescued into the hand.
                self.set_piece(coord, Piece::Castle);
                self.hand = Some(Hand {
                    piece: target.piece,
                    origin: Some(coord),
                    restore: RestorePolicy::RefundCastleSwap,
                });
                debug!("{} swapped castle for {} at {}", territory.team, target.piece, coord);
                return true;
            }
            if !(own && target.piece.is_empty()) {
                return false;
            }
            Piece::Castle
        } else if held.is_living() {
            if own {
                match target.piece {
                    Piece::Capital { .. } | Piece::Castle => return false,
                    p if p.is_living() => {
                        if p.moved() {
                            return false;
                        }
                        match merged_kind(held, p.kind()) {
                            Some(kind) => kind.instantiate(),
                            None => return false,
                        }
                    }
                    _ => hand.piece.with_moved(hand.origin.is_some() || !target.piece.is_empty()),
                }
            } else {
                if !territory::can_attack(&self.grid, coord, held.strength()) {
                    debug!(
                        "{} at {} is protected against {}",
                        target.piece, coord, hand.piece
                    );
                    return false;
                }
                hand.piece.with_moved(true)
            }
        } else {
            return false;
        };

        self.hand = None;
        self.set_team(coord, territory.team);
        self.set_piece(coord, placed);
        self.refresh_territories();
        self.selected = self
            .territories
            .territory_at(coord)
            .filter(|t| t.team == self.team)
            .map(|t| t.capital);
        self.check_game_ended();
        true
    }

    /// Buys a piece of `kind` into the hand, or upgrades the held unit by merging
    /// the purchase into it.
    pub fn buy_unit(&mut self, kind: PieceKind) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(territory) = self.selected_territory() else {
            return false;
        };
        let capital = territory.capital;
        let balance = self.balance_of(territory);
        let Some(cost) = self.price_of(kind) else {
            return false;
        };
        if balance < cost {
            return false;
        }

        match self.hand {
            Some(held) if held.piece.is_living() && kind.is_living() => {
                let Some(merged) = merged_kind(held.piece.kind(), kind) else {
                    return false;
                };
                self.adjust_balance(capital, -cost);
                // The old hand is consumed by the upgrade.
                self.hand = Some(Hand {
                    piece: merged.instantiate(),
                    origin: held.origin,
                    restore: held.restore,
                });
            }
            Some(held) if !held.piece.is_living() && held.piece.kind() == kind => return false,
            _ => {
                self.adjust_balance(capital, -cost);
                self.set_hand(Some(Hand::bought(kind.instantiate())));
            }
        }
        true
    }

    /// Gathers every ready unit of the selected territory and spreads them out
    /// from `target` in growing rings, strongest first.
    pub fn march(&mut self, target: Coord) -> bool {
        if self.is_game_over() || !self.config.hold_to_march {
            return false;
        }
        let Some(territory) = self.selected_territory().cloned() else {
            return false;
        };
        if !territory.contains(target) {
            return false;
        }
        let returning = self
            .hand
            .is_some_and(|h| h.piece.is_living() && h.origin.is_some_and(|o| territory.contains(o)));
        if !returning && territory.cells_where(&self.grid, Piece::is_ready).is_empty() {
            return false;
        }

        self.set_hand(None);

        let mut units: Vec<(Coord, Piece)> = territory
            .cells_where(&self.grid, Piece::is_ready)
            .into_iter()
            .filter_map(|c| self.piece_at(c).map(|p| (c, p)))
            .collect();
        units.sort_by(|a, b| b.1.strength().cmp(&a.1.strength()));
        for &(coord, _) in &units {
            self.set_piece(coord, Piece::Empty);
        }

        let mut slots: Vec<Coord> = Vec::with_capacity(units.len());
        for radius in 0..=self.grid.max_radius() {
            if slots.len() >= units.len() {
                break;
            }
            for coord in self.grid.ring(target, radius) {
                if territory.contains(coord) && self.piece_at(coord).is_some_and(|p| p.is_empty()) {
                    slots.push(coord);
                }
            }
        }

        for ((_, piece), slot) in units.iter().zip(slots) {
            self.set_piece(slot, piece.with_moved(false));
        }
        debug!("{} marched {} units towards {}", territory.team, units.len(), target);
        true
    }

    /// Ends the acting team's turn and starts the next living team's turn.
    pub fn end_turn(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.select(None);

        for _ in 0..Team::ALL.len() {
            self.team = self.team.next();
            if self.team == self.config.starting_team {
                self.round += 1;
                economy::grow_trees(self);
            }
            if self.territories.of_team(self.team).next().is_some() {
                break;
            }
        }

        economy::begin_turn(self, self.team);
        debug!("round {}: {} to move", self.round, self.team);
        self.events.fire(&Event::TurnStarted { team: self.team, round: self.round });
        true
    }

    // ── Game end ────────────────────────────────────────────────────────

    fn compute_outcome(&self) -> Option<GameOutcome> {
        let teams = self.territories.teams();
        if teams.len() <= 1 {
            return Some(GameOutcome::Conquered { winner: teams.first().copied() });
        }
        let humans = &self.config.human_teams;
        if !humans.is_empty() && humans.iter().all(|h| !teams.contains(h)) {
            return Some(GameOutcome::HumansDefeated { by: teams });
        }
        None
    }

    fn check_game_ended(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if let Some(outcome) = self.compute_outcome() {
            info!("game over in round {}: {}", self.round, outcome);
            self.outcome = Some(outcome.clone());
            self.events.fire(&Event::GameEnded { outcome });
        }
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn capture(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            layout: self.grid.layout(),
            cells: cell_states(&self.grid),
            team: self.team,
            round: self.round,
            seed: self.seed,
            selected: self.selected,
            hand: self.hand,
        }
    }

    /// A held piece must come from the selected territory, and its origin must
    /// be ready to take it back.
    fn check_hand_origin(
        grid: &Grid,
        territories: &TerritoryIndex,
        selected: Option<Coord>,
        hand: &Hand,
    ) -> Result<(), IslandError> {
        let Some(origin) = hand.origin else {
            if hand.restore == RestorePolicy::RefundCastleSwap {
                return Err(IslandError::InvalidHand("a castle swap has no origin".into()));
            }
            return Ok(());
        };
        let in_selection = selected
            .and_then(|c| territories.territory_at(c))
            .is_some_and(|t| t.contains(origin));
        if !in_selection {
            return Err(IslandError::InvalidHand(format!("origin {} is not in the selected territory", origin)));
        }
        let at_origin = grid.cell(origin).map(|c| c.piece).unwrap_or_default();
        let expected = match hand.restore {
            RestorePolicy::Default => Some(Piece::Empty),
            RestorePolicy::RefundCastleSwap => Some(Piece::Castle),
            RestorePolicy::NoRestore => None,
        };
        match expected {
            Some(piece) if piece != at_origin => Err(IslandError::InvalidHand(format!(
                "origin {} holds {} instead of {}",
                origin, at_origin, piece
            ))),
            _ => Ok(()),
        }
    }

    /// Replaces the whole session state with the snapshot's. No events are fired
    /// and nothing changes if the snapshot is rejected.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), IslandError> {
        let grid = snapshot.build_grid()?;
        let territories = TerritoryIndex::build(&grid);

        if let Some(capital) = snapshot.selected {
            let valid = territories
                .territory_at(capital)
                .is_some_and(|t| t.capital == capital && t.team == snapshot.team);
            if !valid {
                return Err(IslandError::InvalidSelection(capital));
            }
        }
        if let Some(hand) = snapshot.hand {
            if snapshot.selected.is_none() {
                return Err(IslandError::InvalidHand("a piece is held without a selected territory".into()));
            }
            if hand.piece.is_capital() || hand.piece.is_empty() {
                return Err(IslandError::InvalidHand(format!("{} cannot be held", hand.piece)));
            }
            if hand.piece.moved() {
                return Err(IslandError::InvalidHand(format!("held {} has already moved", hand.piece)));
            }
            Self::check_hand_origin(&grid, &territories, snapshot.selected, &hand)?;
        }

        self.grid = grid;
        self.territories = territories;
        self.team = snapshot.team;
        self.round = snapshot.round;
        self.seed = snapshot.seed;
        self.selected = snapshot.selected;
        self.hand = snapshot.hand;
        self.outcome = self.compute_outcome();
        Ok(())
    }
}
