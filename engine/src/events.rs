// ═══════════════════════════════════════════════════════════════════════
// Event bus — typed notifications about board changes
//
// Subscribers register a closure per event kind and get back an id they
// can use to unregister. Delivery is synchronous and in subscription
// order. Subscribers only observe; they never get mutable access to the
// island.
// ═══════════════════════════════════════════════════════════════════════

use crate::island::GameOutcome;
use crate::piece::Piece;
use crate::types::{Coord, Team};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TeamChanged,
    PieceChanged,
    TurnStarted,
    GameEnded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TeamChanged { coord: Coord, old: Team, new: Team },
    PieceChanged { coord: Coord, old: Piece, new: Piece },
    TurnStarted { team: Team, round: u32 },
    GameEnded { outcome: GameOutcome },
}

impl Event {
    /// Panics when the team did not actually change.
    pub fn team_changed(coord: Coord, old: Team, new: Team) -> Event {
        assert_ne!(old, new, "team of {} changed from {} to itself", coord, old);
        Event::TeamChanged { coord, old, new }
    }

    /// Panics when the piece did not actually change.
    pub fn piece_changed(coord: Coord, old: Piece, new: Piece) -> Event {
        assert_ne!(old, new, "piece of {} changed from {} to itself", coord, old);
        Event::PieceChanged { coord, old, new }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::TeamChanged { .. } => EventKind::TeamChanged,
            Event::PieceChanged { .. } => EventKind::PieceChanged,
            Event::TurnStarted { .. } => EventKind::TurnStarted,
            Event::GameEnded { .. } => EventKind::GameEnded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Event) + Send>;

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(SubscriptionId, Listener)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn fire(&mut self, event: &Event) {
        if let Some(list) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in list.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> =
            self.listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
