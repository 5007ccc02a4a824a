//! The knowledge engine: a forward-chaining solver over "cell is a mine"
//! variables with exact-cardinality constraints.

use crate::cell::{Cell, Dimensions};
use crate::sentence::Sentence;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;

/// How far propagation and inference are driven after each new fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InferenceMode {
    /// One propagation pass followed by one inference pass.
    SinglePass,
    /// Repeat propagation and inference until neither changes anything.
    #[default]
    Fixpoint,
}

/// Everything the agent believes about the board.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeEngine {
    dimensions: Dimensions,
    mode: InferenceMode,
    /// Cells that have been revealed.
    moves_made: HashSet<Cell>,
    /// Cells known to be safe.
    safes: HashSet<Cell>,
    /// Cells known to be mines.
    mines: HashSet<Cell>,
    /// Sentences believed true. Entries may shrink to nothing but are never removed.
    knowledge: Vec<Sentence>,
}

impl KnowledgeEngine {
    pub fn new(dimensions: Dimensions) -> Self {
        Self::with_mode(dimensions, InferenceMode::default())
    }

    pub fn with_mode(dimensions: Dimensions, mode: InferenceMode) -> Self {
        KnowledgeEngine {
            dimensions,
            mode,
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn mode(&self) -> InferenceMode {
        self.mode
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn knowledge(&self) -> &[Sentence] {
        &self.knowledge
    }

    /// Records `cell` as a mine and removes it from every sentence.
    ///
    /// Returns `true` if the cell was not already known to be a mine.
    pub fn mark_mine(&mut self, cell: Cell) -> bool {
        let newly_known = self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell);
        }
        newly_known
    }

    /// Records `cell` as safe and removes it from every sentence.
    ///
    /// Returns `true` if the cell was not already known to be safe.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        let newly_known = self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell);
        }
        newly_known
    }

    /// Ingests one revealed safe cell together with the number of mines
    /// adjacent to it, then deduces whatever follows.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) {
        self.moves_made.insert(cell);
        self.mark_safe(cell);

        // Fold what is already known about the neighbors into the new sentence.
        let mut count = count;
        let mut unresolved = Vec::new();
        for neighbor in self.dimensions.neighbors(cell) {
            if self.mines.contains(&neighbor) {
                if count == 0 {
                    // Only reachable when a false count was reported.
                    tracing::warn!(%cell, %neighbor, "known mine next to a zero-count cell");
                }
                count = count.saturating_sub(1);
            } else if !self.safes.contains(&neighbor) {
                unresolved.push(neighbor);
            }
        }

        let sentence = Sentence::new(unresolved, count);
        tracing::debug!(%cell, %sentence, "adding knowledge");
        self.knowledge.push(sentence);

        match self.mode {
            InferenceMode::SinglePass => {
                self.propagate();
                self.infer();
            }
            InferenceMode::Fixpoint => {
                let mut rounds = 0usize;
                loop {
                    rounds += 1;
                    let marked = self.propagate();
                    let inferred = self.infer();
                    if marked == 0 && inferred == 0 {
                        break;
                    }
                }
                tracing::trace!(rounds, "reached fixpoint");
            }
        }

        tracing::debug!(
            sentences = self.knowledge.len(),
            safes = self.safes.len(),
            mines = self.mines.len(),
            "knowledge updated"
        );
    }

    /// Marks the cells of every sentence that is all-mines or all-safe.
    ///
    /// The list does not grow while this runs, so walking it by index is a
    /// stable view; each sentence's cells are copied before marking because
    /// marking mutates every sentence, this one included.
    ///
    /// Returns how many cells became newly known.
    fn propagate(&mut self) -> usize {
        let mut marked = 0;
        for index in 0..self.knowledge.len() {
            let sentence = &self.knowledge[index];
            if sentence.is_empty() {
                continue;
            }

            let all_mines = sentence.count() == sentence.len();
            let all_safe = sentence.count() == 0;
            let cells: Vec<Cell> = sentence.cells().iter().copied().collect();
            if all_mines {
                for cell in cells {
                    if self.mark_mine(cell) {
                        tracing::trace!(%cell, "deduced mine");
                        marked += 1;
                    }
                }
            } else if all_safe {
                for cell in cells {
                    if self.mark_safe(cell) {
                        tracing::trace!(%cell, "deduced safe");
                        marked += 1;
                    }
                }
            }
        }
        marked
    }

    /// Subsumption: whenever one sentence's cells are contained in another's,
    /// the difference holds the difference in mines.
    ///
    /// Both loops run against the live length of the knowledge base, so a
    /// sentence inferred earlier in the pass is paired like any other.
    /// Derived sentences are appended only if no equal sentence is already
    /// known, which bounds the growth.
    ///
    /// Returns how many sentences were appended.
    fn infer(&mut self) -> usize {
        let mut inferred = 0;

        let mut i = 0;
        while i < self.knowledge.len() {
            if self.knowledge[i].is_empty() {
                i += 1;
                continue;
            }

            let mut j = 0;
            while j < self.knowledge.len() {
                let subset = &self.knowledge[i];
                let superset = &self.knowledge[j];
                j += 1;

                if subset == superset || !subset.cells().is_subset(superset.cells()) {
                    continue;
                }

                let Some(derived) = superset.subtract(subset) else {
                    tracing::warn!(%subset, %superset, "inconsistent sentences, skipping inference");
                    continue;
                };

                if !self.knowledge.contains(&derived) {
                    tracing::trace!(%derived, "inferred sentence");
                    self.knowledge.push(derived);
                    inferred += 1;
                }
            }
            i += 1;
        }
        inferred
    }

    /// A known-safe cell that has not been played yet, if there is one.
    ///
    /// Picks the first such cell in row-major order.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).min().copied()
    }

    /// A uniformly random cell that has not been played and is not a known
    /// mine. Cells of unknown status are eligible.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .dimensions
            .cells()
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }
}
