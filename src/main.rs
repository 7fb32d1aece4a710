use std::io::{self, BufRead, Write};
use std::time::SystemTime;

use clap::{Parser, Subcommand};
use log::{LevelFilter, error, info};

use vixen_chess::STARTING_FEN;
use vixen_chess::board::Board;
use vixen_chess::move_generator::GameStatus;
use vixen_chess::moves::{Move, parse_move_request};
use vixen_chess::search::Difficulty;

#[derive(Parser)]
#[command(about = "Chess rules engine with an alpha-beta opponent")]
struct Cli {
    /// Log at debug level instead of info
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a position and print the engine's chosen move
    Analyze {
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        #[arg(long, default_value_t = 3)]
        depth: u8,
    },
    /// Count legal move tree nodes, for validating the generator
    Perft {
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        #[arg(long, default_value_t = 4)]
        depth: u8,
        /// Print per-root-move subtree counts
        #[arg(long)]
        divide: bool,
    },
    /// Play against the engine on stdin, entering moves like e2e4 or e7e8q
    Play {
        #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Command::Analyze { fen, depth } => analyze(&fen, depth),
        Command::Perft { fen, depth, divide } => perft(&fen, depth, divide),
        Command::Play { difficulty, fen } => play(&fen, difficulty),
    };

    if let Err(message) = result {
        error!("{message}");
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let dispatch_result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {message}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target()
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply();

    if let Err(e) = dispatch_result {
        eprintln!("Failed to set up logging: {e}");
    }

    log_panics::init();
}

fn analyze(fen: &str, depth: u8) -> Result<(), String> {
    let mut board = Board::from_fen(fen)?;
    match board.choose_move(depth) {
        Some(chosen) => println!("bestmove {}", chosen.long_algebraic()),
        None => println!("no legal moves ({})", board.game_status()),
    }
    Ok(())
}

fn perft(fen: &str, depth: u8, divide: bool) -> Result<(), String> {
    let mut board = Board::from_fen(fen)?;
    board.start_perft(depth, divide);
    Ok(())
}

fn play(fen: &str, difficulty: Difficulty) -> Result<(), String> {
    let mut board = Board::from_fen(fen)?;
    info!("Playing at {difficulty} (depth {})", difficulty.depth());
    print!("{board:?}");

    let stdin = io::stdin();
    loop {
        match board.game_status() {
            status @ (GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw) => {
                println!("game over: {status}");
                if let Some(result) = board.game_result() {
                    println!("result: {result}");
                }
                return Ok(());
            }
            GameStatus::Check => println!("{} is in check", board.turn()),
            _ => {}
        }

        print!("move> ");
        io::stdout().flush().map_err(|e| format!("Failed to flush stdout: {e}"))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("Failed to read from stdin: {e}"))?;
        if read == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        match trimmed {
            "" => continue,
            "quit" => return Ok(()),
            "fen" => {
                println!("{}", board.to_fen());
                continue;
            }
            _ => {}
        }

        let (from, to, promotion) = match parse_move_request(trimmed) {
            Ok(request) => request,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        let mut r#move = Move {
            from,
            to,
            promotion,
            ..Default::default()
        };
        if !board.make_move(&mut r#move) {
            println!("illegal move: {trimmed}");
            continue;
        }
        print!("{board:?}");

        let status = board.game_status();
        if matches!(status, GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw) {
            continue;
        }

        match board.choose_ai_move(difficulty) {
            Some(mut reply) => {
                board.apply_move_unchecked(&mut reply);
                println!("engine plays {}", reply.long_algebraic());
                print!("{board:?}");
            }
            None => {
                // game_status above said moves exist, so this is unreachable
                // short of a generator bug.
                error!("Engine found no move in an active position: {}", board.to_fen());
                return Ok(());
            }
        }
    }
}
