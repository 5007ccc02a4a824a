use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::Session, String> {
    ms::Session::deserialize(bts).map_err(|e| e.to_string())
}

fn store(session: &ms::Session) -> Result<Vec<u8>, String> {
    session.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn create_game(size: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::GameConfig {
        height: size as usize,
        width: size as usize,
        mines: mines as usize,
    };
    let mut rng = rand::rng();
    let session = ms::Session::random(&config, ms::InferenceMode::Fixpoint, &mut rng)
        .map_err(|e| e.to_string())?;
    store(&session)
}

/// Lets the bot play one move. The trailing byte is 1 if the move was a guess.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = load(&bts)?;
    let mut selector = ms::MoveSelector::from_os_rng();
    let turn = session.step(&mut selector).map_err(|e| e.to_string())?;
    let mut xs = store(&session)?;
    xs.push(match turn {
        Some(turn) if turn.chosen.is_guess() => 1,
        _ => 0,
    });
    Ok(xs)
}

/// Reveals a cell chosen by the player. The trailing byte is 1 if it was a mine.
#[wasm_bindgen]
pub fn reveal(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = load(&bts)?;
    let outcome = session
        .reveal(ms::Cell::new(row, col))
        .map_err(|e| e.to_string())?;
    let mut xs = store(&session)?;
    xs.push(if outcome == ms::Reveal::Mine { 1 } else { 0 });
    Ok(xs)
}

/// Row-major tiles: -1 hidden, -2 flagged, otherwise the adjacent mine count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = load(&bts)?;
    Ok(session
        .game()
        .tiles()
        .iter()
        .flat_map(|row| {
            row.iter().map(|tile| match tile {
                ms::Tile::Hidden => -1,
                ms::Tile::Flagged => -2,
                ms::Tile::Revealed(n) => *n as i8,
            })
        })
        .collect())
}

/// 0 playing, 1 won, 2 lost.
#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let session = load(&bts)?;
    Ok(match session.state() {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}
