use minesweeper_ai::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn assert_invariants(session: &Session) {
    let engine = session.engine();
    let truth = session.game().board().mines();

    assert!(engine.safes().is_disjoint(engine.mines()), "safes and mines overlap");
    assert!(engine.moves_made().is_subset(engine.safes()), "played cell not safe");

    for sentence in engine.knowledge() {
        assert!(sentence.count() <= sentence.len(), "sentence {sentence} overcounts");
        assert!(sentence.cells().is_disjoint(engine.safes()), "safe cell left in {sentence}");
        assert!(sentence.cells().is_disjoint(engine.mines()), "mine left in {sentence}");
    }

    // Deductions agree with the hidden board.
    assert!(engine.mines().is_subset(truth), "engine marked a safe cell as mine");
    assert!(engine.safes().is_disjoint(truth), "engine marked a mine as safe");

    let unplayed_safe = engine.safes().difference(engine.moves_made()).count();
    assert_eq!(engine.make_safe_move().is_none(), unplayed_safe == 0);
}

fn mode(fixpoint: bool) -> InferenceMode {
    if fixpoint { InferenceMode::Fixpoint } else { InferenceMode::SinglePass }
}

fn config(height: usize, width: usize, density: usize) -> GameConfig {
    let cells = height * width;
    GameConfig {
        height,
        width,
        mines: (cells * density / 100).min(cells - 1),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_through_random_games(
        height in 2usize..7,
        width in 2usize..7,
        density in 0usize..40,
        seed in any::<u64>(),
        fixpoint in any::<bool>(),
    ) {
        let config = config(height, width, density);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::random(&config, mode(fixpoint), &mut rng).unwrap();
        let mut selector = MoveSelector::seeded(seed.wrapping_add(1));

        while session.state() == GameState::Playing {
            let played_before = session.engine().moves_made().clone();
            let known_mines_before = session.engine().mines().clone();

            let Some(turn) = session.step(&mut selector).unwrap() else { break };

            let cell = turn.chosen.cell();
            prop_assert!(!played_before.contains(&cell));
            prop_assert!(!known_mines_before.contains(&cell));
            if !turn.chosen.is_guess() {
                prop_assert_ne!(turn.outcome, Reveal::Mine);
            }
            assert_invariants(&session);
        }

        prop_assert_ne!(session.state(), GameState::Playing);
    }

    #[test]
    fn audit_never_contradicts_the_board(
        height in 2usize..6,
        width in 2usize..6,
        density in 5usize..35,
        seed in any::<u64>(),
    ) {
        let config = config(height, width, density);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::random(&config, InferenceMode::SinglePass, &mut rng).unwrap();
        let mut selector = MoveSelector::seeded(seed ^ 0x5eed);

        while session.state() == GameState::Playing {
            if session.step(&mut selector).unwrap().is_none() {
                break;
            }
            if session.state() == GameState::Lost {
                break;
            }

            let result = audit(session.engine()).unwrap();
            let truth = session.game().board().mines();
            prop_assert!(result.forced_mines().is_subset(truth));
            prop_assert!(result.forced_safes().is_disjoint(truth));
        }
    }

    #[test]
    fn same_seed_plays_the_same_game(
        seed in any::<u64>(),
        fixpoint in any::<bool>(),
    ) {
        let config = GameConfig { height: 6, width: 6, mines: 6 };

        let play = || {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = Session::random(&config, mode(fixpoint), &mut rng).unwrap();
            let mut selector = MoveSelector::seeded(seed.wrapping_add(1));
            let mut moves = Vec::new();
            while session.state() == GameState::Playing {
                match session.step(&mut selector).unwrap() {
                    Some(turn) => moves.push(turn.chosen),
                    None => break,
                }
            }
            (moves, session.state())
        };

        prop_assert_eq!(play(), play());
    }
}
