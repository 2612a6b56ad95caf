// ═══════════════════════════════════════════════════════════════════════
// Game interaction — the entry points shared by human input and agents
//
// Maps discrete intents (click, long press, buy, end turn, undo) onto
// island rules. Every successful mutation is recorded as exactly one
// history entry; illegal intents return `false` and change nothing.
// ═══════════════════════════════════════════════════════════════════════

use crate::events::EventBus;
use crate::history::History;
use crate::island::{GameOutcome, Island};
use crate::piece::PieceKind;
use crate::territory;
use crate::types::{Coord, Team};
use log::debug;

pub const TURN_START: &str = "Turn start";

#[derive(Debug)]
pub struct GameInteraction {
    island: Island,
    history: History,
}

impl GameInteraction {
    pub fn new(island: Island) -> Self {
        let mut history = History::new(island.config().history_limit);
        history.set_enabled(island.config().is_human(island.current_team()));
        history.clear(&island);
        GameInteraction { island, history }
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn into_island(self) -> Island {
        self.island
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        self.island.events_mut()
    }

    pub fn current_team(&self) -> Team {
        self.island.current_team()
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.island.outcome()
    }

    pub fn is_game_over(&self) -> bool {
        self.island.is_game_over()
    }

    /// A tap or long press on a cell.
    ///
    /// Clicking an own cell outside the selection selects its territory.
    /// Otherwise a long press marches, an empty hand picks up, and a held
    /// piece is put down.
    pub fn click(&mut self, coord: Coord, long_press: bool) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(cell) = self.island.grid().visible_cell(coord).copied() else {
            return false;
        };

        let outside = self.island.selected_territory().map_or(true, |t| !t.contains(coord));
        if outside && cell.team == self.island.current_team() {
            if !territory::is_part_of_territory(self.island.grid(), coord) {
                return false;
            }
            return self.select(Some(coord));
        }
        if self.island.selected_capital().is_none() {
            return false;
        }

        if long_press {
            return self.march(coord);
        }
        if self.island.hand().is_none() {
            self.history.remember(&mut self.island, "Pick up", |i| i.pick_up(coord))
        } else {
            self.history.remember(&mut self.island, "Place down", |i| i.place_down(coord))
        }
    }

    /// Selects the acting team's territory at `coord`, or deselects on `None`.
    pub fn select(&mut self, coord: Option<Coord>) -> bool {
        if self.is_game_over() {
            return false;
        }
        let target = match coord {
            Some(c) => self.island.territory_at(c).map(|t| t.capital),
            None => None,
        };
        if coord.is_some() && target.is_none() {
            return false;
        }
        if target == self.island.selected_capital() {
            return true;
        }
        self.history.remember(&mut self.island, "Select territory", |i| i.select(coord))
    }

    pub fn buy_unit(&mut self, kind: PieceKind) -> bool {
        if self.is_game_over() {
            return false;
        }
        let label = format!("Buy {}", kind);
        self.history.remember(&mut self.island, &label, |i| i.buy_unit(kind))
    }

    pub fn march(&mut self, target: Coord) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.history.remember(&mut self.island, "March", |i| i.march(target))
    }

    /// Passes play to the next team. History restarts from the new turn; it
    /// is only kept on human turns.
    pub fn end_turn(&mut self) -> bool {
        if !self.island.end_turn() {
            return false;
        }
        let human = self.island.config().is_human(self.island.current_team());
        self.history.set_enabled(human);
        self.history.reset(&self.island, TURN_START);
        debug!(
            "{} turn, history {}",
            self.island.current_team(),
            if human { "on" } else { "off" }
        );
        true
    }

    pub fn undo(&mut self) -> bool {
        !self.is_game_over() && self.history.undo(&mut self.island)
    }

    pub fn redo(&mut self) -> bool {
        !self.is_game_over() && self.history.redo(&mut self.island)
    }

    pub fn undo_all(&mut self) -> bool {
        !self.is_game_over() && self.history.undo_all(&mut self.island)
    }

    pub fn redo_all(&mut self) -> bool {
        !self.is_game_over() && self.history.redo_all(&mut self.island)
    }
}
