use itertools::iproduct;
use std::fmt;

/// A zero-based `(row, col)` coordinate on the board.
///
/// Cells order row-major, which keeps every scan over candidate moves
/// deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Fixed board size, shared by the environment and the engine for the
/// lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
}

impl Dimensions {
    pub const fn new(height: usize, width: usize) -> Self {
        Dimensions { height, width }
    }

    pub fn cell_count(&self) -> usize {
        self.height * self.width
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Every cell on the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        iproduct!(0..self.height, 0..self.width).map(Cell::from)
    }

    /// The 8-neighborhood of `cell`, clipped to the board and excluding
    /// `cell` itself.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let height = self.height;
        let width = self.width;

        iproduct!(-1isize..=1, -1isize..=1).filter_map(move |(dr, dc)| {
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;

            if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                Some(Cell::new(row as usize, col as usize))
            } else {
                None
            }
        })
    }
}
