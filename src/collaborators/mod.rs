pub mod console;
pub mod scripted;

use anyhow::Result;

use crate::config::TieBreakMode;
use crate::domain::{Player, RoundPairing, RoundResult};

pub use crate::bracket::BracketAnnouncer;
pub use crate::pairing::ManualPairing;
pub use crate::standings::DeciderGame;
pub use console::ConsoleDesk;
pub use scripted::{ScriptedDesk, TournamentScript};

/// Reports one result per pairing, in pairing order
pub trait ResultCollector {
    fn collect(&mut self, round: &RoundPairing) -> Result<Vec<RoundResult>>;
}

/// Shows engine output; nothing flows back
pub trait Renderer {
    fn show_pairings(&mut self, round: &RoundPairing);

    fn show_standings(&mut self, title: &str, standings: &[&Player], mode: TieBreakMode);
}

/// Everything the tournament pipeline asks of whoever runs the event
pub trait TournamentDesk:
    ResultCollector + Renderer + DeciderGame + BracketAnnouncer + ManualPairing
{
}

impl<T> TournamentDesk for T where
    T: ResultCollector + Renderer + DeciderGame + BracketAnnouncer + ManualPairing
{
}

pub fn pairing_lines(round: &RoundPairing) -> Vec<String> {
    let mut lines: Vec<String> = round
        .pairings
        .iter()
        .enumerate()
        .map(|(board, pairing)| format!("Board {}: {}", board + 1, pairing.label()))
        .collect();
    if let Some(name) = &round.bye {
        lines.push(format!("Bye: {}", name));
    }
    lines
}

pub fn standings_lines(standings: &[&Player], mode: TieBreakMode) -> Vec<String> {
    standings
        .iter()
        .enumerate()
        .map(|(index, player)| {
            let tiebreak = if mode.is_enabled() {
                format!("  TB {:>5.1}", player.tiebreak())
            } else {
                String::new()
            };
            format!(
                "{:>2}. {:<20} {:>4.1} pts{}  {:>3}% ({} games)",
                index + 1,
                player.name,
                player.score(),
                tiebreak,
                player.win_percentage(),
                player.games_played()
            )
        })
        .collect()
}
