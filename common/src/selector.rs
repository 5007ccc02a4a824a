use crate::cell::Cell;
use crate::knowledge::KnowledgeEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;

/// A move chosen by the selector, tagged with how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Move {
    /// The engine proved this cell safe.
    Safe(Cell),
    /// No safe cell was known; this one was drawn at random.
    Random(Cell),
}

impl Move {
    pub fn cell(&self) -> Cell {
        match self {
            Move::Safe(cell) | Move::Random(cell) => *cell,
        }
    }

    pub fn is_guess(&self) -> bool {
        matches!(self, Move::Random(_))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Safe(cell) => write!(f, "safe {cell}"),
            Move::Random(cell) => write!(f, "guess {cell}"),
        }
    }
}

/// Prefers logically safe moves, guesses uniformly otherwise.
pub struct MoveSelector {
    rng: StdRng,
}

impl MoveSelector {
    /// A reproducible selector.
    pub fn seeded(seed: u64) -> Self {
        MoveSelector {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        MoveSelector {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn next_move(&mut self, engine: &KnowledgeEngine) -> Option<Move> {
        if let Some(cell) = engine.make_safe_move() {
            return Some(Move::Safe(cell));
        }
        engine.make_random_move(&mut self.rng).map(Move::Random)
    }
}
