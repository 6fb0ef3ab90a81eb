use std::collections::{HashMap, HashSet};

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::models::{
    Color, GameScore, Pairing, Player, PlayoffStage, RoundPairing, RoundResult, StageOutcome,
};
use crate::errors::{CoreResult, TournamentError};

/// Owns every player record for the lifetime of a tournament
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    players: Vec<Player>,
}

impl ScoreLedger {
    /// Seat players in the given order
    pub fn new(names: &[String]) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        let mut players = Vec::with_capacity(names.len());

        for name in names {
            let name = name.trim();
            if name.is_empty() {
                return Err(TournamentError::InvalidConfig("player name is empty".into()));
            }
            if !seen.insert(name.to_string()) {
                return Err(TournamentError::DuplicatePlayer(name.to_string()));
            }
            players.push(Player::new(name));
        }

        Ok(Self { players })
    }

    /// Seat players in a reproducible shuffled order
    pub fn seeded(names: &[String], seed: u64) -> CoreResult<Self> {
        let mut order = names.to_vec();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        debug!("Seating order for seed {}: {:?}", seed, order);
        Self::new(&order)
    }

    #[cfg(test)]
    pub(crate) fn from_players(players: Vec<Player>) -> Self {
        let mut ledger = Self { players };
        ledger.recompute_tiebreaks();
        ledger
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, name: &str) -> CoreResult<&Player> {
        self.players
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| TournamentError::UnknownPlayer(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> CoreResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| TournamentError::UnknownPlayer(name.to_string()))
    }

    /// Record a finished round: opponents, colors, scores, bye, then tie-breaks
    pub fn apply_round(&mut self, round: &RoundPairing, results: &[RoundResult]) -> CoreResult<()> {
        self.validate_round(round, results)?;

        for (pairing, result) in round.pairings.iter().zip(results) {
            let (white_score, black_score) = score_pairing(pairing, result);
            self.get_mut(&pairing.white)?
                .record_game(&pairing.black, Color::White, white_score);
            self.get_mut(&pairing.black)?
                .record_game(&pairing.white, Color::Black, black_score);
        }

        if let Some(name) = &round.bye {
            self.get_mut(name)?.record_bye();
        }

        self.recompute_tiebreaks();
        info!("  → Round {} recorded ({} games)", round.round, results.len());
        Ok(())
    }

    fn validate_round(&self, round: &RoundPairing, results: &[RoundResult]) -> CoreResult<()> {
        if results.len() < round.pairings.len() {
            let missing = &round.pairings[results.len()];
            return Err(TournamentError::MissingResult(missing.label()));
        }
        if results.len() > round.pairings.len() {
            return Err(TournamentError::InvalidResult(format!(
                "{} results for {} pairings",
                results.len(),
                round.pairings.len()
            )));
        }

        let mut seated = HashSet::new();
        let names = round
            .pairings
            .iter()
            .flat_map(|p| [p.white.as_str(), p.black.as_str()])
            .chain(round.bye.as_deref());
        for name in names {
            self.get(name)?;
            if !seated.insert(name) {
                return Err(TournamentError::InvariantViolation(format!(
                    "{} appears twice in round {}",
                    name, round.round
                )));
            }
        }

        for (pairing, result) in round.pairings.iter().zip(results) {
            match result {
                RoundResult::Winner(winner) if !pairing.involves(winner) => {
                    return Err(TournamentError::InvalidResult(format!(
                        "{} did not play in {}",
                        winner,
                        pairing.label()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Sum of the current scores of each distinct opponent, rebuilt from scratch
    pub fn recompute_tiebreaks(&mut self) {
        let scores: HashMap<String, u32> = self
            .players
            .iter()
            .map(|p| (p.name.clone(), p.half_points()))
            .collect();

        for player in &mut self.players {
            let distinct: HashSet<&str> = player.opponents.iter().map(String::as_str).collect();
            let total: u32 = distinct
                .iter()
                .filter_map(|name| scores.get(*name))
                .sum();
            player.set_opponent_half_points(total);
        }
    }

    pub(crate) fn award_decider(&mut self, winner: &str) -> CoreResult<()> {
        self.get_mut(winner)?.add_decider_win();
        Ok(())
    }

    pub(crate) fn record_playoff(
        &mut self,
        stage: PlayoffStage,
        winner: &str,
        loser: &str,
    ) -> CoreResult<()> {
        self.get_mut(winner)?.record_playoff(stage, StageOutcome::Won)?;
        self.get_mut(loser)?.record_playoff(stage, StageOutcome::Lost)
    }
}

fn score_pairing(pairing: &Pairing, result: &RoundResult) -> (GameScore, GameScore) {
    match result {
        RoundResult::Draw => (GameScore::Draw, GameScore::Draw),
        RoundResult::Winner(name) if *name == pairing.white => (GameScore::Win, GameScore::Loss),
        RoundResult::Winner(_) => (GameScore::Loss, GameScore::Win),
    }
}
