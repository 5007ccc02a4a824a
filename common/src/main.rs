use anyhow::Result;
use clap::{Parser, ValueEnum};
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "minesweeper-ai")]
#[command(version, about = "Autonomous Minesweeper bot driven by logical inference", long_about = None)]
struct Cli {
    /// Number of rows
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,

    /// Number of columns
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,

    /// Number of mines
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,

    /// Random seed for mine placement and guesses
    #[arg(long)]
    seed: Option<u64>,

    /// How far inference runs after each revealed cell
    #[arg(long, value_enum, default_value_t = Mode::Fixpoint)]
    mode: Mode,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Cross-check the knowledge base with a SAT solver after every move
    #[arg(long)]
    audit: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    SinglePass,
    Fixpoint,
}

impl From<Mode> for InferenceMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::SinglePass => InferenceMode::SinglePass,
            Mode::Fixpoint => InferenceMode::Fixpoint,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // --- 1. Initialization ---
    let config = GameConfig {
        height: cli.height,
        width: cli.width,
        mines: cli.mines,
    };
    let (mut board_rng, mut selector) = match cli.seed {
        Some(seed) => (StdRng::seed_from_u64(seed), MoveSelector::seeded(seed.wrapping_add(1))),
        None => (StdRng::from_os_rng(), MoveSelector::from_os_rng()),
    };
    let mut session = Session::random(&config, cli.mode.into(), &mut board_rng)?;

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: play cells proven safe, guess randomly otherwise.");
    println!("Initial Board:");
    print!("{}", session.game().render());

    // --- 2. Game Loop ---
    let mut move_count = 0;
    let mut guesses = 0;
    while session.state() == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{move_count} ---");

        let Some(turn) = session.step(&mut selector)? else {
            println!("No valid moves left for the bot to make.");
            break;
        };

        if turn.chosen.is_guess() {
            guesses += 1;
            println!("No logically safe move found. Guessing {}...", turn.chosen.cell());
        } else {
            println!("Logic found a guaranteed safe cell: {}", turn.chosen.cell());
        }
        if let Reveal::Safe(count) = turn.outcome {
            println!("Revealed {} with {count} adjacent mine(s).", turn.chosen.cell());
        }
        print!("{}", session.game().render());

        if cli.audit {
            report_audit(session.engine());
        }

        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!("Mines:\n{}", session.game().board().to_string_with_mines());
    println!(
        "Known safe: {}, known mines: {}, guesses: {guesses}",
        session.engine().safes().len(),
        session.engine().mines().len()
    );

    match session.state() {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    Ok(())
}

fn report_audit(engine: &KnowledgeEngine) {
    match audit(engine) {
        Ok(result) => {
            let missed = result.missed_by(engine);
            tracing::debug!(
                forced_mines = result.forced_mines().len(),
                forced_safes = result.forced_safes().len(),
                missed,
                "audit complete"
            );
            if missed > 0 {
                println!("Audit: {missed} forced cell(s) not yet deduced by the engine.");
            }
        }
        Err(error) => tracing::warn!(%error, "audit failed"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "minesweeper_ai=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
