use serde::{Deserialize, Serialize};

use crate::config::TieBreakMode;
use crate::errors::{CoreResult, TournamentError};

/// Piece color; white is the "first" color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

/// Outcome of a single game from one player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameScore {
    Win,
    Draw,
    Loss,
}

impl GameScore {
    pub fn half_points(&self) -> u32 {
        match self {
            GameScore::Win => 2,
            GameScore::Draw => 1,
            GameScore::Loss => 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.half_points() as f64 / 2.0
    }
}

/// What the result collector reports for one pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Draw,
    Winner(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayoffStage {
    Semifinal,
    Consolation,
    Final,
}

impl PlayoffStage {
    pub fn as_str(&self) -> &str {
        match self {
            PlayoffStage::Semifinal => "semifinal",
            PlayoffStage::Consolation => "third-place match",
            PlayoffStage::Final => "final",
        }
    }
}

/// Playoff progress; each stage is recorded at most once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketFlags {
    pub semifinal: Option<StageOutcome>,
    pub consolation: Option<StageOutcome>,
    pub final_match: Option<StageOutcome>,
}

impl BracketFlags {
    pub fn won_semifinal(&self) -> bool {
        self.semifinal == Some(StageOutcome::Won)
    }

    pub fn lost_semifinal(&self) -> bool {
        self.semifinal == Some(StageOutcome::Lost)
    }

    pub fn won_consolation(&self) -> bool {
        self.consolation == Some(StageOutcome::Won)
    }

    pub fn won_final(&self) -> bool {
        self.final_match == Some(StageOutcome::Won)
    }

    pub fn lost_final(&self) -> bool {
        self.final_match == Some(StageOutcome::Lost)
    }
}

/// Which matching strategy produced a round's pairings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Exact,
    CycleDecomposition,
    Greedy,
    Manual,
}

impl Strategy {
    pub fn as_str(&self) -> &str {
        match self {
            Strategy::Exact => "exact matching",
            Strategy::CycleDecomposition => "assignment cycle decomposition",
            Strategy::Greedy => "greedy assignment split",
            Strategy::Manual => "manual pairing",
        }
    }
}

/// One board of a round, colors already decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub white: String,
    pub black: String,
}

impl Pairing {
    pub fn involves(&self, name: &str) -> bool {
        self.white == name || self.black == name
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.white, self.black)
    }
}

/// The engine's answer for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPairing {
    pub round: u32,
    pub pairings: Vec<Pairing>,
    pub bye: Option<String>,
    pub strategy: Strategy,
    pub fallbacks: Vec<String>,
    pub total_cost: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    half_points: u32,
    opponent_half_points: u32,
    decider_wins: u32,
    pub opponents: Vec<String>,
    pub results: Vec<GameScore>,
    pub white_games: u32,
    pub black_games: u32,
    pub byes: u32,
    pub bracket: BracketFlags,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            half_points: 0,
            opponent_half_points: 0,
            decider_wins: 0,
            opponents: Vec::new(),
            results: Vec::new(),
            white_games: 0,
            black_games: 0,
            byes: 0,
            bracket: BracketFlags::default(),
        }
    }

    pub fn score(&self) -> f64 {
        self.half_points as f64 / 2.0
    }

    pub fn half_points(&self) -> u32 {
        self.half_points
    }

    pub fn games_played(&self) -> usize {
        self.results.len()
    }

    /// Opponent score sum plus 0.1 per decider won
    pub fn tiebreak(&self) -> f64 {
        self.opponent_half_points as f64 / 2.0 + self.decider_wins as f64 / 10.0
    }

    /// Secondary key in tenths of a point, exact for equality tests
    pub fn tiebreak_tenths(&self, mode: TieBreakMode) -> u32 {
        match mode {
            TieBreakMode::OpponentScore => self.opponent_half_points * 5 + self.decider_wins,
            TieBreakMode::None => self.decider_wins,
        }
    }

    pub fn decider_wins(&self) -> u32 {
        self.decider_wins
    }

    pub fn win_percentage(&self) -> u32 {
        if self.results.is_empty() {
            return 0;
        }
        (self.half_points * 50) / self.results.len() as u32
    }

    /// White games minus black games
    pub fn color_balance(&self) -> i64 {
        self.white_games as i64 - self.black_games as i64
    }

    pub fn has_met(&self, other: &str) -> bool {
        self.opponents.iter().any(|o| o == other)
    }

    pub(crate) fn record_game(&mut self, opponent: &str, color: Color, score: GameScore) {
        self.opponents.push(opponent.to_string());
        self.results.push(score);
        self.half_points += score.half_points();
        match color {
            Color::White => self.white_games += 1,
            Color::Black => self.black_games += 1,
        }
    }

    pub(crate) fn record_bye(&mut self) {
        self.byes += 1;
    }

    pub(crate) fn set_opponent_half_points(&mut self, value: u32) {
        self.opponent_half_points = value;
    }

    pub(crate) fn add_decider_win(&mut self) {
        self.decider_wins += 1;
    }

    pub(crate) fn record_playoff(&mut self, stage: PlayoffStage, outcome: StageOutcome) -> CoreResult<()> {
        let slot = match stage {
            PlayoffStage::Semifinal => &mut self.bracket.semifinal,
            PlayoffStage::Consolation => &mut self.bracket.consolation,
            PlayoffStage::Final => &mut self.bracket.final_match,
        };
        if slot.is_some() {
            return Err(TournamentError::InvalidResult(format!(
                "{} already has a {} result",
                self.name,
                stage.as_str()
            )));
        }
        *slot = Some(outcome);
        Ok(())
    }
}
