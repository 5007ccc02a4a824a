use crate::cell::Cell;
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

/// A cardinality constraint: exactly `count` of `cells` are mines.
///
/// Equality is structural, so two sentences over the same cells with the same
/// count are the same fact no matter how they were derived.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: HashSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty sentence carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, when every one of them must be a mine.
    pub fn known_mines(&self) -> HashSet<Cell> {
        if self.count == self.cells.len() {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// All cells, when none of them can be a mine.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Removes a confirmed mine. No-op if `cell` is not part of the sentence.
    pub fn mark_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            if self.count == 0 {
                // Only reachable when a false count was reported.
                tracing::warn!(%cell, "mine removed from a zero-count sentence");
            }
            self.count = self.count.saturating_sub(1);
        }
    }

    /// Removes a confirmed safe cell. No-op if `cell` is not part of the sentence.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }

    /// Derives `self - subset`, assuming `subset.cells ⊆ self.cells`.
    ///
    /// Returns `None` when the subset claims more mines than `self`, which a
    /// truthful history never produces.
    pub fn subtract(&self, subset: &Sentence) -> Option<Sentence> {
        let count = self.count.checked_sub(subset.count)?;
        Some(Sentence {
            cells: self.cells.difference(&subset.cells).copied().collect(),
            count,
        })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}
