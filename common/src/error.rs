//! Errors raised by the game environment.

use crate::cell::Cell;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("too many mines: {mines} requested for a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    #[error("board must have at least one row and one column, got {height}x{width}")]
    EmptyBoard { height: usize, width: usize },

    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("game already over")]
    GameOver,

    #[error("failed to encode or decode game session: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
