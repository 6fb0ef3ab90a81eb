use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::bracket::{self, BRACKET_SIZE, BracketReport, Placing};
use crate::collaborators::TournamentDesk;
use crate::config::{AppConfig, TournamentSettings};
use crate::domain::{Player, RoundPairing, RoundResult, ScoreLedger};
use crate::errors::{TournamentError, file_context};
use crate::pairing::pair_round;
use crate::standings::{self, Decider};

/// One played round: the engine's pairing and what the desk reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    #[serde(flatten)]
    pub pairing: RoundPairing,
    pub results: Vec<RoundResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub tiebreak: f64,
    pub games: usize,
    pub win_percentage: u32,
    pub white_games: u32,
    pub black_games: u32,
    pub byes: u32,
    pub decider_wins: u32,
}

impl StandingRow {
    fn from_player(rank: usize, player: &Player) -> Self {
        Self {
            rank,
            name: player.name.clone(),
            score: player.score(),
            tiebreak: player.tiebreak(),
            games: player.games_played(),
            win_percentage: player.win_percentage(),
            white_games: player.white_games,
            black_games: player.black_games,
            byes: player.byes,
            decider_wins: player.decider_wins(),
        }
    }
}

/// Everything that happened, written once the tournament is over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentReport {
    pub generated_at: DateTime<Utc>,
    pub settings: TournamentSettings,
    pub rounds: Vec<RoundRecord>,
    pub standings: Vec<StandingRow>,
    pub deciders: Vec<Decider>,
    pub bracket: Option<BracketReport>,
    pub podium: Vec<Placing>,
}

impl TournamentReport {
    pub fn winner(&self) -> Option<&str> {
        self.podium.first().map(|p| p.name.as_str())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let display = path.display().to_string();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json).with_context(|| file_context("write", &display))?;
        info!("Report written to {}", display);
        Ok(())
    }
}

/// Runs a whole tournament against one desk
pub struct TournamentService {
    config: AppConfig,
    players: Vec<String>,
}

impl TournamentService {
    pub fn new(config: AppConfig, players: Vec<String>) -> Result<Self> {
        config.validate()?;
        if players.len() < 2 {
            return Err(TournamentError::InvalidConfig(format!(
                "a tournament needs at least 2 players, got {}",
                players.len()
            ))
            .into());
        }
        Ok(Self { config, players })
    }

    pub fn run<D: TournamentDesk>(&self, desk: &mut D) -> Result<TournamentReport> {
        let settings = &self.config.tournament;
        info!("=== Starting Swiss Tournament ===");
        info!(
            "  → {} players, {} rounds, tie-break {:?}",
            self.players.len(),
            settings.rounds,
            settings.tiebreak
        );

        let mut ledger = ScoreLedger::seeded(&self.players, settings.seed)?;
        let rounds = self.play_rounds(&mut ledger, desk)?;

        info!("Resolving ties at the cutoff...");
        let deciders = standings::resolve_ties(&mut ledger, settings, &mut *desk)?;
        let order = standings::standings(&ledger, settings.tiebreak);
        desk.show_standings("Final standings", &order, settings.tiebreak);
        let seeds: Vec<String> = order.iter().map(|p| p.name.clone()).collect();

        let bracket = self.play_bracket(&mut ledger, &seeds, desk)?;
        let order = standings::standings(&ledger, settings.tiebreak);
        let podium = bracket::podium(&order);
        let standings = order
            .iter()
            .enumerate()
            .map(|(index, player)| StandingRow::from_player(index + 1, player))
            .collect();

        info!("=== Tournament Complete ===");
        Ok(TournamentReport {
            generated_at: Utc::now(),
            settings: settings.clone(),
            rounds,
            standings,
            deciders,
            bracket,
            podium,
        })
    }

    fn play_rounds<D: TournamentDesk>(
        &self,
        ledger: &mut ScoreLedger,
        desk: &mut D,
    ) -> Result<Vec<RoundRecord>> {
        let mode = self.config.tournament.tiebreak;
        let mut rounds = Vec::new();

        for round in 1..=self.config.tournament.rounds {
            let pairing = pair_round(ledger, round, &self.config, &mut *desk)?;
            desk.show_pairings(&pairing);

            let results = desk
                .collect(&pairing)
                .with_context(|| format!("Failed to collect results for round {}", round))?;
            ledger.apply_round(&pairing, &results)?;

            let order = standings::standings(ledger, mode);
            desk.show_standings(&format!("Standings after round {}", round), &order, mode);
            rounds.push(RoundRecord { pairing, results });
        }
        Ok(rounds)
    }

    fn play_bracket<D: TournamentDesk>(
        &self,
        ledger: &mut ScoreLedger,
        seeds: &[String],
        desk: &mut D,
    ) -> Result<Option<BracketReport>> {
        let settings = &self.config.tournament;
        if !settings.bracket_enabled {
            return Ok(None);
        }
        if seeds.len() < BRACKET_SIZE {
            warn!("Only {} players, skipping the playoffs", seeds.len());
            return Ok(None);
        }
        let report = bracket::run_playoffs(ledger, seeds, settings.third_place_match, &mut *desk)?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ScriptedDesk, TournamentScript};

    fn names(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("P{}", i)).collect()
    }

    #[test]
    fn test_needs_two_players() {
        assert!(TournamentService::new(AppConfig::new(), names(1)).is_err());
    }

    #[test]
    fn test_three_players_skip_bracket() {
        let script = TournamentScript::from_json(
            r#"{
                "settings": {"rounds": 2},
                "rounds": [{"unlisted": "white"}, {"unlisted": "draw"}],
                "decider_order": ["P1", "P2", "P3"]
            }"#,
        )
        .unwrap();
        let mut config = AppConfig::new();
        config.tournament = script.settings.clone();
        let service = TournamentService::new(config, names(3)).unwrap();
        let mut desk = ScriptedDesk::new(script);

        let report = service.run(&mut desk).unwrap();
        assert!(report.bracket.is_none());
        assert_eq!(report.rounds.len(), 2);
        assert!(report.rounds.iter().all(|r| r.pairing.bye.is_some()));
        assert_eq!(report.standings.len(), 3);
        assert_eq!(report.podium.len(), 3);
        assert_eq!(report.winner(), Some(report.standings[0].name.as_str()));
    }
}
