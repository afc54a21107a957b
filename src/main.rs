use clap::Parser;
use log::warn;
use minesweeper_engine::{
    CellContent, FlagResult, GameError, GameSession, GameState, JsonScoreStore, Position, Preset,
    RevealResult, ScoreStore, Visibility,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal")]
struct Args {
    /// Board preset: small, medium or large
    #[arg(short, long, default_value_t = Preset::Small)]
    preset: Preset,

    /// Seed for a reproducible mine layout
    #[arg(long)]
    seed: Option<u64>,

    /// File holding the high-score table
    #[arg(long, default_value = "minesweeper_scores.json")]
    scores: PathBuf,

    /// Print the high scores for the preset and exit
    #[arg(long)]
    high_scores: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Reveal,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Act(Position, Action),
    Quit,
}

/// Feeds whole wall-clock seconds into the session while a game is running.
#[derive(Debug, Default)]
struct Stopwatch {
    started_at: Option<Instant>,
}

impl Stopwatch {
    fn sync(&mut self, game: &mut GameSession) {
        if !game.is_started() || game.is_over() {
            return;
        }
        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        let target = started_at.elapsed().as_secs();
        while u64::from(game.elapsed_seconds()) < target {
            game.increment_elapsed();
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run_game(&args) {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run_game(args: &Args) -> Result<(), GameError> {
    let mut store = JsonScoreStore::new(&args.scores);
    if args.high_scores {
        print_high_scores(&store, args.preset);
        return Ok(());
    }

    let mut game = match args.seed {
        Some(seed) => GameSession::with_seed(args.preset.config(), seed)?,
        None => GameSession::from_preset(args.preset)?,
    };
    let mut stopwatch = Stopwatch::default();

    while !game.state().is_finished() {
        print_board(&game);

        let Some(line) = prompt("Enter command (r/f row col, q to quit): ") else {
            return Ok(());
        };
        let (pos, action) = match parse_command(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Act(pos, action)) => (pos, action),
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        if !game.is_within_bounds(pos) {
            println!("Position out of bounds");
            continue;
        }

        stopwatch.sync(&mut game);
        match action {
            Action::Reveal => {
                if game.reveal(pos)? == RevealResult::NoOp {
                    println!("Nothing to reveal there");
                }
            }
            Action::Flag => {
                if game.toggle_flag(pos)? == FlagResult::NoOp {
                    if game.flags_remaining() == 0 {
                        println!("No flags left");
                    } else {
                        println!("Cannot flag a revealed cell");
                    }
                }
            }
        }
        stopwatch.sync(&mut game);
    }

    print_board(&game);
    match game.state() {
        GameState::Won => {
            println!("You Win! Time: {} seconds", game.elapsed_seconds());
            let name = prompt("Enter your name: ").unwrap_or_default();
            if let Err(e) = store.record_result(&name, game.elapsed_seconds(), args.preset) {
                warn!("Could not save score: {}", e);
                println!("Scores unavailable");
            }
            print_high_scores(&store, args.preset);
        }
        GameState::Lost => println!("Game Over! Time: {} seconds", game.elapsed_seconds()),
        GameState::NotStarted | GameState::Playing => unreachable!(),
    }

    Ok(())
}

fn parse_command(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();

    let action = match parts.next() {
        Some("q") => return Ok(Command::Quit),
        Some("r") => Action::Reveal,
        Some("f") => Action::Flag,
        _ => return Err("Invalid action. Use 'r' to reveal, 'f' to flag or 'q' to quit".into()),
    };

    let mut coordinate = || -> Result<i32, String> {
        parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(|| "Expected a row and a column".to_string())
    };
    let row = coordinate()?;
    let col = coordinate()?;

    Ok(Command::Act(Position::new(row, col), action))
}

fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}

fn print_board(game: &GameSession) {
    let (_, cols) = game.dimensions();

    println!(
        "Flags left: {}  Time: {}s",
        game.flags_remaining(),
        game.elapsed_seconds()
    );

    // Print column numbers
    print!("   ");
    for col in 0..cols {
        print!("{:>3}", col);
    }
    println!();

    for view in game.cells() {
        if view.position.col == 0 {
            print!("{:>3}", view.position.row);
        }
        let glyph = match (view.visibility, view.content) {
            (Visibility::Flagged, _) => "⚑".to_string(),
            (_, Some(CellContent::Mine)) => "*".to_string(),
            (Visibility::Revealed, Some(CellContent::Empty(0))) => " ".to_string(),
            (Visibility::Revealed, Some(CellContent::Empty(n))) => n.to_string(),
            _ => "□".to_string(),
        };
        print!("{:>3}", glyph);
        if view.position.col as u32 == cols - 1 {
            println!();
        }
    }
}

fn print_high_scores(store: &impl ScoreStore, preset: Preset) {
    match store.top_scores(preset) {
        Ok(scores) if scores.is_empty() => println!("No {} scores yet", preset),
        Ok(scores) => {
            println!("High scores ({})", preset);
            for (rank, entry) in scores.iter().enumerate() {
                println!("{:>3}. {:<20} {} sec", rank + 1, entry.name, entry.elapsed_seconds);
            }
        }
        Err(e) => {
            warn!("Could not load scores: {}", e);
            println!("Scores unavailable");
        }
    }
}
