use anyhow::Result;

use swiss_pairing::cli::Command;
use swiss_pairing::{handle_completions, handle_play, handle_puzzle, handle_run, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Run { script, options } => handle_run(script, options),
        Command::Play {
            players,
            puzzles,
            options,
        } => handle_play(players, *puzzles, options),
        Command::Puzzle { rating, moves } => handle_puzzle(*rating, *moves),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
