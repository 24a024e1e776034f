//! # Per-slot execution state.
//!
//! Every worker owns a [`StatusTable`]: one cell per concurrent slot. The
//! table is empty until the worker's engine starts, then holds exactly
//! `concurrency` cells for the rest of the run.
//!
//! ## Cell transitions
//! ```text
//! launch ──► Started ──► handler returns Ok  ──► Finished ─┐
//!              ▲    └──► handler returns Err ──► Errored  ─┤
//!              └────────── restart_always relaunch ◄───────┘
//! ```
//!
//! ## Rules
//! - Each cell is written only by its own slot (single writer).
//! - Readers never block writers: one atomic per cell, no table lock.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// State of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Status {
    /// Handler invocation in progress.
    Started = 0,
    /// Last invocation returned an error.
    Errored = 1,
    /// Last invocation returned successfully.
    Finished = 2,
}

impl Status {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Status::Started,
            1 => Status::Errored,
            _ => Status::Finished,
        }
    }

    /// Returns the lowercase name used in logs and `/stats`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Started => "started",
            Status::Errored => "errored",
            Status::Finished => "finished",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size array of slot cells, populated once when the engine starts.
#[derive(Default)]
pub struct StatusTable {
    cells: OnceLock<Box<[AtomicU8]>>,
}

impl StatusTable {
    /// Creates an empty, not yet launched table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates `slots` cells, all [`Status::Started`].
    ///
    /// Returns `false` if the table was already launched; the cell count
    /// never changes after the first launch.
    pub(crate) fn launch(&self, slots: usize) -> bool {
        let mut launched = false;
        self.cells.get_or_init(|| {
            launched = true;
            (0..slots)
                .map(|_| AtomicU8::new(Status::Started as u8))
                .collect()
        });
        launched
    }

    /// Overwrites the cell of `slot`. Out of range writes are ignored.
    pub(crate) fn set(&self, slot: usize, status: Status) {
        if let Some(cell) = self.cells.get().and_then(|c| c.get(slot)) {
            cell.store(status as u8, Ordering::Release);
        }
    }

    /// Returns the current state of `slot`, if the table is launched.
    pub fn get(&self, slot: usize) -> Option<Status> {
        self.cells
            .get()
            .and_then(|c| c.get(slot))
            .map(|cell| Status::from_u8(cell.load(Ordering::Acquire)))
    }

    /// Number of cells (0 before launch).
    pub fn len(&self) -> usize {
        self.cells.get().map_or(0, |c| c.len())
    }

    /// True before launch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only copy of every cell.
    pub fn snapshot(&self) -> Vec<Status> {
        match self.cells.get() {
            Some(cells) => cells
                .iter()
                .map(|cell| Status::from_u8(cell.load(Ordering::Acquire)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// True iff at least one cell is [`Status::Started`].
    pub fn any_started(&self) -> bool {
        self.cells.get().is_some_and(|cells| {
            cells
                .iter()
                .any(|cell| cell.load(Ordering::Acquire) == Status::Started as u8)
        })
    }
}

impl fmt::Debug for StatusTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_before_launch() {
        let table = StatusTable::new();
        assert!(table.is_empty());
        assert!(table.snapshot().is_empty());
        assert!(!table.any_started());
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn launch_is_one_shot() {
        let table = StatusTable::new();
        assert!(table.launch(3));
        assert_eq!(table.snapshot(), vec![Status::Started; 3]);

        assert!(!table.launch(5));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn cells_are_independent() {
        let table = StatusTable::new();
        table.launch(2);
        table.set(0, Status::Finished);
        assert_eq!(table.get(0), Some(Status::Finished));
        assert_eq!(table.get(1), Some(Status::Started));
        assert!(table.any_started());

        table.set(1, Status::Errored);
        assert!(!table.any_started());

        table.set(7, Status::Started);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(Status::Errored.to_string(), "errored");
        assert_eq!(Status::from_u8(Status::Finished as u8), Status::Finished);
    }
}
