//! Reversible change-sets and the bounded undo/redo log that applies them.

use crate::cell::{CellCoord, CellRecord};
use crate::spatial::OccupancyStore;
use log::trace;
use std::collections::VecDeque;

/// Default undo depth.
pub const MAX_UNDO_STEPS: usize = 50;

/// Which user action produced a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Footprint painted.
    Place,
    /// Object removed.
    Bulldoze,
}

/// Before/after snapshot of one cell. `None` means the cell is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    /// Cell touched.
    pub cell: CellCoord,
    /// Full record before the action, every layer included.
    pub old: Option<CellRecord>,
    /// Full record after the action.
    pub new: Option<CellRecord>,
}

/// All cell changes of one committed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    kind: ActionKind,
    changes: Vec<CellChange>,
}

impl ChangeSet {
    /// Empty change-set; committing it is a no-op.
    pub fn empty(kind: ActionKind) -> Self {
        ChangeSet {
            kind,
            changes: Vec::new(),
        }
    }

    /// Change-set from explicit cell changes.
    pub fn new(kind: ActionKind, changes: Vec<CellChange>) -> Self {
        ChangeSet { kind, changes }
    }

    /// Action that produced it.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Cell changes in recording order.
    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }

    /// True when nothing changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of cells touched.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    fn apply_new(&self, store: &mut OccupancyStore) {
        for ch in &self.changes {
            store.put(ch.cell, ch.new.clone());
        }
    }

    fn apply_old(&self, store: &mut OccupancyStore) {
        // Reverse order so a cell listed twice ends at its earliest state.
        for ch in self.changes.iter().rev() {
            store.put(ch.cell, ch.old.clone());
        }
    }
}

/// Undo stack bounded to `max_depth`, plus a redo stack that any new commit invalidates.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<ChangeSet>,
    redo: Vec<ChangeSet>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        History::new(MAX_UNDO_STEPS)
    }
}

impl History {
    /// Empty history keeping at most `max_depth` undo steps.
    pub fn new(max_depth: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Applies `cs` and records it. Empty change-sets are dropped without
    /// touching either stack; returns whether anything was recorded.
    pub fn commit(&mut self, store: &mut OccupancyStore, cs: ChangeSet) -> bool {
        if cs.is_empty() {
            return false;
        }
        cs.apply_new(store);
        self.undo.push_back(cs);
        self.redo.clear();
        while self.undo.len() > self.max_depth {
            trace!("undo history full, dropping oldest entry");
            self.undo.pop_front();
        }
        true
    }

    /// Restores the state before the latest action.
    pub fn undo(&mut self, store: &mut OccupancyStore) -> Option<ActionKind> {
        let cs = self.undo.pop_back()?;
        cs.apply_old(store);
        let kind = cs.kind();
        self.redo.push(cs);
        Some(kind)
    }

    /// Re-applies the latest undone action.
    pub fn redo(&mut self, store: &mut OccupancyStore) -> Option<ActionKind> {
        let cs = self.redo.pop()?;
        cs.apply_new(store);
        let kind = cs.kind();
        self.undo.push_back(cs);
        Some(kind)
    }

    /// Something to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Something to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo depth.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Redo depth.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Configured undo bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Forgets both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
