//! Undo/redo log of visited desktops.
//!
//! Classic linear history with branch discard: pushing while the cursor is
//! not at the newest entry drops everything after the cursor, exactly like
//! a text editor's undo stack. Entries are compared by desktop identity,
//! never by index, because indices shift when desktops are created or
//! removed between a push and a later undo.

use std::collections::VecDeque;

use thiserror::Error;

use crate::sys::desktop::DesktopId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("already at the oldest desktop in history")]
    AtOldest,
    #[error("already at the newest desktop in history")]
    AtNewest,
}

/// Snapshot of a visited desktop: stable identity plus the index and axis
/// size observed at capture time.
#[derive(Clone, Copy, Debug)]
pub struct HistoryEntry {
    pub id: DesktopId,
    pub index: usize,
    pub total: usize,
}

impl HistoryEntry {
    pub fn new(id: DesktopId, index: usize, total: usize) -> HistoryEntry {
        HistoryEntry { id, index, total }
    }

    /// Re-derives the entry's current index against a live desktop list.
    ///
    /// When the identity is gone (desktop deleted), falls back to the
    /// snapshot index reinterpreted against the current list, clamped to
    /// the last desktop. The fallback is lossy and flagged via `found`.
    pub fn resolve(&self, desktops: &[DesktopId]) -> ResolvedEntry {
        debug_assert!(!desktops.is_empty());
        if let Some(pos) = desktops.iter().position(|d| *d == self.id) {
            return ResolvedEntry { index: pos + 1, found: true };
        }
        ResolvedEntry { index: self.index.min(desktops.len()), found: false }
    }
}

// Identity-only equality: an entry still refers to the same desktop after
// its index shifted.
impl PartialEq for HistoryEntry {
    fn eq(&self, other: &HistoryEntry) -> bool {
        self.id == other.id
    }
}

impl Eq for HistoryEntry {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// 1-based index on the current axis.
    pub index: usize,
    /// False when the identity no longer exists and the index is the lossy
    /// snapshot fallback.
    pub found: bool,
}

/// Capacity-bounded branching undo/redo log. Never empty; evicts from the
/// old end only.
#[derive(Clone, Debug)]
pub struct DesktopHistory {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl DesktopHistory {
    pub fn new(initial: HistoryEntry, capacity: usize) -> DesktopHistory {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        DesktopHistory { entries, cursor: 0, capacity: capacity.max(1) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> HistoryEntry {
        self.entries[self.cursor]
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Records a newly visited desktop.
    ///
    /// A push identity-equal to the cursor entry is a no-op, which makes
    /// redundant sampler ticks harmless. Otherwise the redo tail is
    /// discarded, the entry appended, and the oldest entry evicted once
    /// over capacity. Returns whether the entry was recorded.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if entry == self.entries[self.cursor] {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Moves the cursor one step back and returns that entry. Entries are
    /// never mutated.
    pub fn undo(&mut self) -> Result<HistoryEntry, HistoryError> {
        if self.cursor == 0 {
            return Err(HistoryError::AtOldest);
        }
        self.cursor -= 1;
        Ok(self.entries[self.cursor])
    }

    /// Moves the cursor one step forward and returns that entry.
    pub fn redo(&mut self) -> Result<HistoryEntry, HistoryError> {
        if self.cursor + 1 >= self.entries.len() {
            return Err(HistoryError::AtNewest);
        }
        self.cursor += 1;
        Ok(self.entries[self.cursor])
    }
}
