use crate::cell::{Cell, Dimensions};
use crate::error::{Error, Result};
use rand::Rng;
use std::collections::HashSet;

/// Size and mine count of a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            mines: 8,
        }
    }
}

impl GameConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }

    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(Error::EmptyBoard {
                height: self.height,
                width: self.width,
            });
        }
        let cells = self.height * self.width;
        if self.mines >= cells {
            return Err(Error::TooManyMines {
                mines: self.mines,
                cells,
            });
        }
        Ok(())
    }
}

/// Ground truth: where the mines are.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Board {
    dimensions: Dimensions,
    mines: HashSet<Cell>,
}

impl Board {
    /// Places `config.mines` mines uniformly at random.
    pub fn random<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let dimensions = config.dimensions();

        let mines = rand::seq::index::sample(rng, dimensions.cell_count(), config.mines)
            .into_iter()
            .map(|index| Cell::new(index / dimensions.width, index % dimensions.width))
            .collect();

        Ok(Board { dimensions, mines })
    }

    /// A board with mines at exactly the given cells.
    pub fn with_mines(dimensions: Dimensions, mines: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        GameConfig {
            height: dimensions.height,
            width: dimensions.width,
            mines: mines.len(),
        }
        .validate()?;

        if let Some(&cell) = mines.iter().find(|&&cell| !dimensions.contains(cell)) {
            return Err(Error::OutOfBounds {
                cell,
                height: dimensions.height,
                width: dimensions.width,
            });
        }

        Ok(Board { dimensions, mines })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines adjacent to `cell`, not counting `cell` itself.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        self.dimensions
            .neighbors(cell)
            .filter(|neighbor| self.is_mine(*neighbor))
            .count()
    }

    pub fn check_bounds(&self, cell: Cell) -> Result<()> {
        if self.dimensions.contains(cell) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                cell,
                height: self.dimensions.height,
                width: self.dimensions.width,
            })
        }
    }

    /// Text rendering with `X` for mines, for debugging.
    pub fn to_string_with_mines(&self) -> String {
        let mut out = String::new();
        for row in 0..self.dimensions.height {
            out.push_str(&"--".repeat(self.dimensions.width));
            out.push_str("-\n");
            for col in 0..self.dimensions.width {
                out.push_str(if self.is_mine(Cell::new(row, col)) { "|X" } else { "| " });
            }
            out.push_str("|\n");
        }
        out.push_str(&"--".repeat(self.dimensions.width));
        out.push('-');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_board_has_exact_mine_count() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let config = GameConfig {
                height: 5,
                width: 7,
                mines: 12,
            };
            let board = Board::random(&config, &mut rng).unwrap();
            assert_eq!(board.mines().len(), 12);
            assert!(board.mines().iter().all(|&cell| board.dimensions().contains(cell)));
        }
    }

    #[test]
    fn test_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = GameConfig {
            height: 3,
            width: 3,
            mines: 9,
        };
        assert!(matches!(
            Board::random(&config, &mut rng),
            Err(Error::TooManyMines { mines: 9, cells: 9 })
        ));
    }

    #[test]
    fn test_empty_board_rejected() {
        let config = GameConfig {
            height: 0,
            width: 4,
            mines: 0,
        };
        assert!(matches!(config.validate(), Err(Error::EmptyBoard { .. })));
    }

    #[test]
    fn test_out_of_bounds_mine_rejected() {
        let result = Board::with_mines(Dimensions::new(3, 3), [Cell::new(3, 0)]);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::with_mines(
            Dimensions::new(3, 3),
            [Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)],
        )
        .unwrap();

        assert_eq!(board.nearby_mines(Cell::new(0, 1)), 3);
        assert_eq!(board.nearby_mines(Cell::new(2, 2)), 1);
        assert_eq!(board.nearby_mines(Cell::new(0, 2)), 1);
        // A mine does not count itself.
        assert_eq!(board.nearby_mines(Cell::new(1, 1)), 2);
    }

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!((config.height, config.width, config.mines), (8, 8, 8));
        assert!(config.validate().is_ok());
    }
}
