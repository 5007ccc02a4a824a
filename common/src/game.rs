use crate::board::Board;
use crate::cell::{Cell, Dimensions};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tile {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent mines.
    Flagged,
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What a reveal turned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Reveal {
    Safe(u8),
    Mine,
}

/// A game in progress: the hidden board plus what the player has seen.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    board: Board,
    tiles: Vec<Vec<Tile>>,
    state: GameState,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let Dimensions { height, width } = board.dimensions();
        Game {
            board,
            tiles: vec![vec![Tile::Hidden; width]; height],
            state: GameState::Playing,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn dimensions(&self) -> Dimensions {
        self.board.dimensions()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tiles(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    /// The visible tile at `cell`, or `None` off the board.
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.tiles.get(cell.row)?.get(cell.col).copied()
    }

    // Callers check bounds first.
    fn at(&self, cell: Cell) -> Tile {
        self.tiles[cell.row][cell.col]
    }

    /// Reveals `cell`. Hitting a mine loses the game.
    ///
    /// Revealing an already revealed cell reports its count again.
    pub fn reveal(&mut self, cell: Cell) -> Result<Reveal> {
        self.board.check_bounds(cell)?;
        if let Tile::Revealed(count) = self.at(cell) {
            return Ok(Reveal::Safe(count));
        }
        if self.state != GameState::Playing {
            return Err(Error::GameOver);
        }

        if self.board.is_mine(cell) {
            self.state = GameState::Lost;
            return Ok(Reveal::Mine);
        }

        // At most 8 neighbors.
        let count = self.board.nearby_mines(cell) as u8;
        self.tiles[cell.row][cell.col] = Tile::Revealed(count);

        if self.check_win_condition() {
            self.state = GameState::Won;
        }
        Ok(Reveal::Safe(count))
    }

    /// Flags a hidden cell as a suspected mine. Flagging a revealed cell is a no-op.
    pub fn flag(&mut self, cell: Cell) -> Result<()> {
        self.board.check_bounds(cell)?;
        if self.state != GameState::Playing {
            return Err(Error::GameOver);
        }

        if self.at(cell) == Tile::Hidden {
            self.tiles[cell.row][cell.col] = Tile::Flagged;
            if self.check_win_condition() {
                self.state = GameState::Won;
            }
        }
        Ok(())
    }

    pub fn flagged(&self) -> HashSet<Cell> {
        self.cells_where(|tile| tile == Tile::Flagged)
    }

    pub fn revealed(&self) -> HashSet<Cell> {
        self.cells_where(|tile| matches!(tile, Tile::Revealed(_)))
    }

    fn cells_where(&self, predicate: impl Fn(Tile) -> bool) -> HashSet<Cell> {
        self.dimensions()
            .cells()
            .filter(|&cell| predicate(self.at(cell)))
            .collect()
    }

    /// Won once every safe cell is revealed, or once exactly the mines are flagged.
    pub fn check_win_condition(&self) -> bool {
        let all_safe_revealed = self
            .dimensions()
            .cells()
            .filter(|&cell| !self.board.is_mine(cell))
            .all(|cell| matches!(self.at(cell), Tile::Revealed(_)));

        if all_safe_revealed {
            return true;
        }
        let flagged = self.flagged();
        !flagged.is_empty() && flagged == *self.board.mines()
    }

    /// Board as the player sees it, with row and column headers.
    pub fn render(&self) -> String {
        let width = self.dimensions().width;
        let mut out = String::from("   ");
        for col in 0..width {
            out.push_str(&format!("{col:^3}"));
        }
        out.push_str(&format!("\n  +{}\n", "---".repeat(width)));

        for (row, tiles) in self.tiles.iter().enumerate() {
            out.push_str(&format!("{row:^2}|"));
            for tile in tiles {
                match tile {
                    Tile::Hidden => out.push_str(" ■ "),
                    Tile::Flagged => out.push_str(" F "),
                    Tile::Revealed(n) => out.push_str(&format!(" {n} ")),
                }
            }
            out.push('\n');
        }
        out
    }
}
