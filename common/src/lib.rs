//! A Minesweeper agent that plays from a purely logical knowledge base.
//!
//! Each revealed cell becomes a [`Sentence`] ("exactly `count` of these cells
//! are mines"). The [`KnowledgeEngine`] propagates sentences that are all-mines
//! or all-safe and infers new sentences by subsumption; the [`MoveSelector`]
//! plays proven-safe cells first and guesses only when nothing is proven.

pub mod audit;
pub mod board;
pub mod cell;
pub mod error;
pub mod game;
pub mod knowledge;
pub mod selector;
pub mod sentence;
pub mod session;

pub use audit::{Audit, DeducedState, audit};
pub use board::{Board, GameConfig};
pub use cell::{Cell, Dimensions};
pub use error::{Error, Result};
pub use game::{Game, GameState, Reveal, Tile};
pub use knowledge::{InferenceMode, KnowledgeEngine};
pub use selector::{Move, MoveSelector};
pub use sentence::Sentence;
pub use session::{Session, Turn};
