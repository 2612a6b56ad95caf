// ═══════════════════════════════════════════════════════════════════════
// History — linear undo/redo over whole-session snapshots
//
// `entries[cursor]` is always the snapshot of the current state. Recording
// a new entry while the cursor is behind the head discards everything
// after it. Nested `remember` calls collapse into the outermost one.
// ═══════════════════════════════════════════════════════════════════════

use crate::island::Island;
use crate::snapshot::Snapshot;
use log::{debug, warn};
use std::collections::VecDeque;

pub const INITIAL_STATE: &str = "Initial state";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub label: String,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    enabled: bool,
    suspended: u32,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            entries: VecDeque::new(),
            cursor: 0,
            enabled: true,
            suspended: 0,
            limit: limit.max(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Recording happens only when enabled and not inside another `remember`.
    pub fn is_recording(&self) -> bool {
        self.enabled && self.suspended == 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_label(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Runs `action` and, if it succeeds, records the resulting state as one entry.
    pub fn remember<F>(&mut self, island: &mut Island, label: &str, action: F) -> bool
    where
        F: FnOnce(&mut Island) -> bool,
    {
        self.suspended += 1;
        let done = action(island);
        self.suspended -= 1;
        if done {
            self.push(island, label);
        }
        done
    }

    fn push(&mut self, island: &Island, label: &str) {
        if !self.is_recording() {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry { label: label.to_string(), snapshot: island.capture() });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Drops every entry and records the current state as the new baseline.
    pub fn reset(&mut self, island: &Island, label: &str) {
        self.entries.clear();
        self.cursor = 0;
        self.push(island, label);
    }

    pub fn clear(&mut self, island: &Island) {
        self.reset(island, INITIAL_STATE);
    }

    pub fn can_undo(&self) -> bool {
        self.enabled && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.enabled && self.cursor + 1 < self.entries.len()
    }

    pub fn undo(&mut self, island: &mut Island) -> bool {
        if !self.can_undo() {
            return false;
        }
        let label = self.entries[self.cursor].label.clone();
        if !self.jump(island, self.cursor - 1) {
            return false;
        }
        debug!("undo '{}'", label);
        true
    }

    pub fn redo(&mut self, island: &mut Island) -> bool {
        if !self.can_redo() {
            return false;
        }
        if !self.jump(island, self.cursor + 1) {
            return false;
        }
        debug!("redo '{}'", self.entries[self.cursor].label);
        true
    }

    pub fn undo_all(&mut self, island: &mut Island) -> bool {
        self.can_undo() && self.jump(island, 0)
    }

    pub fn redo_all(&mut self, island: &mut Island) -> bool {
        self.can_redo() && self.jump(island, self.entries.len() - 1)
    }

    fn jump(&mut self, island: &mut Island, to: usize) -> bool {
        let Some(entry) = self.entries.get(to) else {
            return false;
        };
        if let Err(e) = island.restore(&entry.snapshot) {
            warn!("history entry '{}' could not be restored: {}", entry.label, e);
            return false;
        }
        self.cursor = to;
        true
    }
}
