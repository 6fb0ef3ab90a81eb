pub mod bracket;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod pairing;
pub mod puzzle;
pub mod rate_limiter;
pub mod services;
pub mod standings;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::{Cli, TournamentOptions};
use colored::Colorize;

use crate::cli::Command;
use crate::collaborators::{ConsoleDesk, ScriptedDesk, TournamentScript};
use crate::config::settings::{AppConfig, PuzzleSettings};
use crate::domain::Color;
use crate::puzzle::PuzzleClient;
use crate::services::{TournamentReport, TournamentService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_run(script: &Path, options: &TournamentOptions) -> Result<()> {
    let script = TournamentScript::from_path(script)?;
    let mut config = AppConfig::new();
    config.tournament = script.settings.clone();
    options.apply(&mut config.tournament);

    let service = TournamentService::new(config, script.players.clone())?;
    let mut desk = ScriptedDesk::new(script);
    let report = service.run(&mut desk)?;
    finish(&report, options.output.as_deref())
}

pub fn handle_play(players: &[String], puzzles: bool, options: &TournamentOptions) -> Result<()> {
    let mut config = AppConfig::new();
    options.apply(&mut config.tournament);
    let puzzle = puzzles.then(|| config.puzzle.clone());

    let service = TournamentService::new(config, players.to_vec())?;
    let mut desk = ConsoleDesk::stdio(puzzle);
    let report = service.run(&mut desk)?;
    finish(&report, options.output.as_deref())
}

pub fn handle_puzzle(rating: u32, moves: u32) -> Result<()> {
    let settings = PuzzleSettings {
        rating,
        moves,
        ..PuzzleSettings::default()
    };
    settings.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut client = PuzzleClient::new(&settings)?;
        let puzzle = client.fetch(settings.rating, settings.moves).await?;
        let side = match puzzle.side_to_move {
            Color::White => "White",
            Color::Black => "Black",
        };
        println!("{}", puzzle.fen.bold());
        println!("{} to move", side);
        if !puzzle.moves.is_empty() {
            println!("Solution: {}", puzzle.moves.join(" "));
        }
        Ok(())
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}

fn finish(report: &TournamentReport, output: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "Podium".bold().green());
    for placing in &report.podium {
        println!("  {}. {} ({:.1} pts)", placing.place, placing.name, placing.score);
    }
    if let Some(path) = output {
        report.write_json(path)?;
    }
    Ok(())
}
