use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{Renderer, ResultCollector, pairing_lines, standings_lines};
use crate::bracket::BracketAnnouncer;
use crate::config::{TieBreakMode, TournamentSettings};
use crate::domain::{Pairing, Player, PlayoffStage, RoundPairing, RoundResult};
use crate::errors::{file_context, with_parse_context};
use crate::pairing::assignment::Assignment;
use crate::pairing::{ManualPairing, ManualProposal};
use crate::standings::DeciderGame;

/// What to report for a pairing the round script does not mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlistedResult {
    Draw,
    White,
    Black,
}

/// Results for one round, keyed by player name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundScript {
    pub winners: Vec<String>,
    /// Either player of a drawn game
    pub draws: Vec<String>,
    pub unlisted: Option<UnlistedResult>,
}

/// A whole tournament written down in advance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentScript {
    pub players: Vec<String>,
    pub settings: TournamentSettings,
    pub rounds: Vec<RoundScript>,
    /// Decider winners by priority: the first listed player of a pair wins
    pub decider_order: Vec<String>,
    /// Playoff winners by priority, same rule as deciders
    pub bracket_winners: Vec<String>,
    pub manual_pairings: Vec<ManualProposal>,
}

impl TournamentScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).with_context(|| file_context("read", &display))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        with_parse_context(serde_json::from_str(text), "tournament script")
    }
}

/// Answers every collaborator question from a `TournamentScript`
pub struct ScriptedDesk {
    script: TournamentScript,
    manual_queue: VecDeque<ManualProposal>,
    transcript: Vec<String>,
}

impl ScriptedDesk {
    pub fn new(script: TournamentScript) -> Self {
        let manual_queue = script.manual_pairings.iter().cloned().collect();
        Self {
            script,
            manual_queue,
            transcript: Vec::new(),
        }
    }

    /// Everything rendered so far, one line per entry
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    fn round_script(&self, round: u32) -> Result<&RoundScript> {
        round
            .checked_sub(1)
            .and_then(|index| self.script.rounds.get(index as usize))
            .with_context(|| format!("script has no results for round {}", round))
    }

    fn write(&mut self, line: String) {
        info!("{}", line);
        self.transcript.push(line);
    }
}

fn first_listed(priority: &[String], first: &str, second: &str) -> Option<String> {
    priority
        .iter()
        .find(|name| *name == first || *name == second)
        .cloned()
}

fn scripted_result(script: &RoundScript, pairing: &Pairing) -> Result<RoundResult> {
    let listed = |names: &[String], name: &str| names.iter().any(|n| n == name);
    let white_won = listed(&script.winners, &pairing.white);
    let black_won = listed(&script.winners, &pairing.black);
    let drawn = listed(&script.draws, &pairing.white) || listed(&script.draws, &pairing.black);

    match (white_won, black_won, drawn) {
        (true, false, false) => Ok(RoundResult::Winner(pairing.white.clone())),
        (false, true, false) => Ok(RoundResult::Winner(pairing.black.clone())),
        (false, false, true) => Ok(RoundResult::Draw),
        (false, false, false) => match script.unlisted {
            Some(UnlistedResult::Draw) => Ok(RoundResult::Draw),
            Some(UnlistedResult::White) => Ok(RoundResult::Winner(pairing.white.clone())),
            Some(UnlistedResult::Black) => Ok(RoundResult::Winner(pairing.black.clone())),
            None => anyhow::bail!("no result scripted for {}", pairing.label()),
        },
        _ => anyhow::bail!("conflicting results scripted for {}", pairing.label()),
    }
}

impl ResultCollector for ScriptedDesk {
    fn collect(&mut self, round: &RoundPairing) -> Result<Vec<RoundResult>> {
        let script = self.round_script(round.round)?;

        for name in script.winners.iter().chain(&script.draws) {
            if !round.pairings.iter().any(|p| p.involves(name)) {
                warn!("{} is scripted in round {} but does not play", name, round.round);
            }
        }

        round
            .pairings
            .iter()
            .map(|pairing| scripted_result(script, pairing))
            .collect()
    }
}

impl Renderer for ScriptedDesk {
    fn show_pairings(&mut self, round: &RoundPairing) {
        self.write(format!("Round {} ({})", round.round, round.strategy.as_str()));
        for note in &round.fallbacks {
            self.write(format!("warning: {}", note));
        }
        for line in pairing_lines(round) {
            self.write(line);
        }
    }

    fn show_standings(&mut self, title: &str, standings: &[&Player], mode: TieBreakMode) {
        self.write(title.to_string());
        for line in standings_lines(standings, mode) {
            self.write(line);
        }
    }
}

impl DeciderGame for ScriptedDesk {
    fn play(&mut self, first: &Player, second: &Player) -> Result<String> {
        first_listed(&self.script.decider_order, &first.name, &second.name)
            .with_context(|| format!("no decider winner scripted for {} - {}", first.name, second.name))
    }
}

impl BracketAnnouncer for ScriptedDesk {
    fn announce(&mut self, seeds: &[String], third_place_match: bool) -> Result<()> {
        let suffix = if third_place_match { " (with third-place match)" } else { "" };
        self.write(format!("Playoffs: {}{}", seeds.join(", "), suffix));
        Ok(())
    }

    fn match_winner(&mut self, stage: PlayoffStage, first: &str, second: &str) -> Result<String> {
        let winner = first_listed(&self.script.bracket_winners, first, second)
            .with_context(|| format!("no {} winner scripted for {} - {}", stage.as_str(), first, second))?;
        self.write(format!("{}: {} - {} won by {}", stage.as_str(), first, second, winner));
        Ok(winner)
    }
}

impl ManualPairing for ScriptedDesk {
    fn propose(&mut self, _hint: Option<&Assignment>, attempt: usize) -> Result<ManualProposal> {
        self.manual_queue
            .pop_front()
            .with_context(|| format!("no manual pairing scripted for attempt {}", attempt))
    }
}
