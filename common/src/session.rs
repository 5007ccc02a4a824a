use crate::board::{Board, GameConfig};
use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::game::{Game, GameState, Reveal, Tile};
use crate::knowledge::{InferenceMode, KnowledgeEngine};
use crate::selector::{Move, MoveSelector};
use rand::Rng;

/// One move of the bot and what it revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub chosen: Move,
    pub outcome: Reveal,
}

/// A game together with the agent playing it.
///
/// The session is the unit that crosses the wasm boundary, so both halves
/// serialize together.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    game: Game,
    engine: KnowledgeEngine,
}

impl Session {
    pub fn new(game: Game, mode: InferenceMode) -> Self {
        let engine = KnowledgeEngine::with_mode(game.dimensions(), mode);
        Session { game, engine }
    }

    pub fn random<R: Rng + ?Sized>(
        config: &GameConfig,
        mode: InferenceMode,
        rng: &mut R,
    ) -> Result<Self> {
        let board = Board::random(config, rng)?;
        Ok(Self::new(Game::new(board), mode))
    }

    /// Deserializes a session from bytes.
    pub fn deserialize(bts: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the session to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn engine(&self) -> &KnowledgeEngine {
        &self.engine
    }

    pub fn state(&self) -> GameState {
        self.game.state()
    }

    /// Reveals `cell` and feeds the resulting count to the engine.
    ///
    /// Mines the engine has proven are flagged on the board afterwards.
    pub fn reveal(&mut self, cell: Cell) -> Result<Reveal> {
        self.game.board().check_bounds(cell)?;
        let fresh = !matches!(self.game.tile(cell), Some(Tile::Revealed(_)));

        let outcome = self.game.reveal(cell)?;
        if let (true, Reveal::Safe(count)) = (fresh, outcome) {
            self.engine.add_knowledge(cell, usize::from(count));
            self.flag_known_mines()?;
        }
        Ok(outcome)
    }

    fn flag_known_mines(&mut self) -> Result<()> {
        let mut mines: Vec<Cell> = self.engine.mines().iter().copied().collect();
        mines.sort();
        for mine in mines {
            if self.game.state() != GameState::Playing {
                break;
            }
            if self.game.tile(mine) == Some(Tile::Hidden) {
                tracing::debug!(cell = %mine, "flagging deduced mine");
                self.game.flag(mine)?;
            }
        }
        Ok(())
    }

    /// Lets the selector pick a move and plays it.
    ///
    /// Returns `Ok(None)` when no move is left to make.
    pub fn step(&mut self, selector: &mut MoveSelector) -> Result<Option<Turn>> {
        if self.game.state() != GameState::Playing {
            return Err(Error::GameOver);
        }

        let Some(chosen) = selector.next_move(&self.engine) else {
            return Ok(None);
        };
        let outcome = self.reveal(chosen.cell())?;
        tracing::debug!(%chosen, ?outcome, "played move");

        Ok(Some(Turn { chosen, outcome }))
    }

    /// Plays until the game ends or no move is left.
    pub fn play(&mut self, selector: &mut MoveSelector) -> Result<GameState> {
        while self.game.state() == GameState::Playing {
            if self.step(selector)?.is_none() {
                break;
            }
        }
        Ok(self.game.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Dimensions;

    fn single_mine_session(mode: InferenceMode) -> Session {
        let board = Board::with_mines(Dimensions::new(3, 3), [Cell::new(2, 2)]).unwrap();
        Session::new(Game::new(board), mode)
    }

    #[test]
    fn test_opening_at_zero_wins_without_guessing() {
        let mut session = single_mine_session(InferenceMode::Fixpoint);
        session.reveal(Cell::new(0, 0)).unwrap();

        let mut selector = MoveSelector::seeded(5);
        while session.state() == GameState::Playing {
            let turn = session.step(&mut selector).unwrap().expect("a move is available");
            assert!(!turn.chosen.is_guess(), "guessed at {}", turn.chosen);
        }

        assert_eq!(session.state(), GameState::Won);
        assert!(session.engine().mines().contains(&Cell::new(2, 2)));
        assert!(!session.engine().moves_made().contains(&Cell::new(2, 2)));
    }

    #[test]
    fn test_reveal_twice_feeds_engine_once() {
        let mut session = single_mine_session(InferenceMode::SinglePass);
        session.reveal(Cell::new(1, 1)).unwrap();
        let sentences = session.engine().knowledge().len();
        session.reveal(Cell::new(1, 1)).unwrap();
        assert_eq!(session.engine().knowledge().len(), sentences);
    }

    #[test]
    fn test_step_after_game_over() {
        let mut session = single_mine_session(InferenceMode::Fixpoint);
        assert_eq!(session.reveal(Cell::new(2, 2)).unwrap(), Reveal::Mine);
        assert_eq!(session.state(), GameState::Lost);

        let mut selector = MoveSelector::seeded(0);
        assert!(matches!(session.step(&mut selector), Err(Error::GameOver)));
    }

    #[test]
    fn test_session_bytes_round_trip() {
        let mut session = single_mine_session(InferenceMode::Fixpoint);
        session.reveal(Cell::new(0, 0)).unwrap();

        let bytes = session.serialize().unwrap();
        let restored = Session::deserialize(&bytes).unwrap();

        assert_eq!(restored.engine().safes(), session.engine().safes());
        assert_eq!(restored.engine().knowledge(), session.engine().knowledge());
        assert_eq!(restored.game().tiles(), session.game().tiles());
        assert_eq!(restored.state(), GameState::Playing);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            Session::deserialize(&[0xff, 0x01]),
            Err(Error::Codec(_))
        ));
    }
}
