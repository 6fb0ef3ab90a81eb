use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, TournamentError};

pub const PUZZLE_RATINGS: [u32; 5] = [1000, 1500, 2000, 2500, 3000];
pub const PUZZLE_MOVES: std::ops::RangeInclusive<u32> = 1..=4;
pub const MAX_ROUNDS: u32 = 1_000;

/// Secondary ordering key after score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakMode {
    /// Sum of the current scores of every opponent met
    OpponentScore,
    /// Score only; ties at the cutoff go straight to deciders
    None,
}

impl TieBreakMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TieBreakMode::OpponentScore)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub rounds: u32,
    pub tiebreak: TieBreakMode,
    pub third_place_match: bool,
    pub bracket_enabled: bool,
    pub qualifiers: usize,
    pub seed: u64,
    pub max_deciders: usize,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            rounds: 4,
            tiebreak: TieBreakMode::OpponentScore,
            third_place_match: false,
            bracket_enabled: true,
            qualifiers: 4,
            seed: 42,
            max_deciders: 64,
        }
    }
}

impl TournamentSettings {
    pub fn validate(&self) -> CoreResult<()> {
        if self.rounds == 0 {
            return Err(TournamentError::InvalidConfig("rounds must be positive".into()));
        }
        if self.rounds > MAX_ROUNDS {
            return Err(TournamentError::InvalidConfig(format!(
                "rounds {} above the limit of {}",
                self.rounds, MAX_ROUNDS
            )));
        }
        if self.qualifiers == 0 {
            return Err(TournamentError::InvalidConfig("qualifiers must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingSettings {
    /// Off skips straight to the assignment-based strategies
    pub exact_matching: bool,
    pub manual_attempts: usize,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            exact_matching: true,
            manual_attempts: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleSettings {
    pub rate_limit_ms: u64,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    pub base_url: &'static str,
    pub api_host: &'static str,
    pub api_key_env: &'static str,
    pub rating: u32,
    pub moves: u32,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            rate_limit_ms: 500,
            user_agent: "SwissPairing/0.1",
            timeout_secs: 30,
            base_url: "https://chess-puzzles.p.rapidapi.com/",
            api_host: "chess-puzzles.p.rapidapi.com",
            api_key_env: "CHESS_PUZZLE_API_KEY",
            rating: 1500,
            moves: 2,
        }
    }
}

impl PuzzleSettings {
    pub fn validate(&self) -> CoreResult<()> {
        if !PUZZLE_RATINGS.contains(&self.rating) {
            return Err(TournamentError::InvalidConfig(format!(
                "puzzle rating {} is not one of {:?}",
                self.rating, PUZZLE_RATINGS
            )));
        }
        if !PUZZLE_MOVES.contains(&self.moves) {
            return Err(TournamentError::InvalidConfig(format!(
                "puzzle moves {} outside {:?}",
                self.moves, PUZZLE_MOVES
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tournament: TournamentSettings,
    pub pairing: PairingSettings,
    pub puzzle: PuzzleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            tournament: TournamentSettings::default(),
            pairing: PairingSettings::default(),
            puzzle: PuzzleSettings::default(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.tournament.validate()?;
        self.puzzle.validate()
    }
}
