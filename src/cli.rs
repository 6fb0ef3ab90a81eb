use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{TieBreakMode, TournamentSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Swiss-system chess tournament pairing")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Run a tournament from a JSON script of players and results
    Run {
        /// Path to the tournament script
        script: PathBuf,
        #[command(flatten)]
        options: TournamentOptions,
    },
    /// Direct a live tournament from the terminal
    Play {
        /// Player name (repeat for each player)
        #[arg(short, long = "player", required = true)]
        players: Vec<String>,
        /// Show a puzzle from the chess-puzzles API before each decider
        #[arg(long)]
        puzzles: bool,
        #[command(flatten)]
        options: TournamentOptions,
    },
    /// Fetch one decider puzzle and print it
    Puzzle {
        /// Puzzle rating (1000, 1500, 2000, 2500 or 3000)
        #[arg(short, long, default_value_t = 1500)]
        rating: u32,
        /// Number of moves the solver has to find (1-4)
        #[arg(short, long, default_value_t = 2)]
        moves: u32,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Overrides for the tournament settings
#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct TournamentOptions {
    /// Write the final report as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Number of Swiss rounds
    #[arg(short, long)]
    pub rounds: Option<u32>,
    /// Seed for the initial seating order
    #[arg(long)]
    pub seed: Option<u64>,
    /// Secondary ordering after score
    #[arg(long, value_enum)]
    pub tiebreak: Option<TieBreakMode>,
    /// Play a third-place match between the semifinal losers
    #[arg(long)]
    pub third_place: bool,
    /// Stop after the Swiss rounds
    #[arg(long)]
    pub no_bracket: bool,
}

impl TournamentOptions {
    pub fn apply(&self, settings: &mut TournamentSettings) {
        if let Some(rounds) = self.rounds {
            settings.rounds = rounds;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(tiebreak) = self.tiebreak {
            settings.tiebreak = tiebreak;
        }
        if self.third_place {
            settings.third_place_match = true;
        }
        if self.no_bracket {
            settings.bracket_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "swiss_pairing",
            "run",
            "event.json",
            "--rounds",
            "5",
            "--tiebreak",
            "none",
            "--third-place",
        ])
        .unwrap();

        let Command::Run { script, options } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(script, PathBuf::from("event.json"));

        let mut settings = TournamentSettings::default();
        options.apply(&mut settings);
        assert_eq!(settings.rounds, 5);
        assert_eq!(settings.tiebreak, TieBreakMode::None);
        assert!(settings.third_place_match);
        assert!(settings.bracket_enabled);
    }

    #[test]
    fn test_play_requires_players() {
        assert!(Cli::try_parse_from(["swiss_pairing", "play"]).is_err());
        let cli = Cli::try_parse_from(["swiss_pairing", "play", "-p", "Ann", "-p", "Bob"]).unwrap();
        assert!(matches!(cli.command, Command::Play { ref players, .. } if players.len() == 2));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
