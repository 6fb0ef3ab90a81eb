use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::{Player, PlayoffStage, ScoreLedger};
use crate::errors::{CoreResult, TournamentError};

pub const BRACKET_SIZE: usize = 4;

/// Semifinals by rank index: 1st vs 4th, 2nd vs 3rd
pub const SEMIFINALS: [(usize, usize); 2] = [(0, 3), (1, 2)];

/// Rank indices laid out as (finalist A, consolation A, finalist B, consolation B),
/// looked up by `seed1_won as usize * 2 + seed2_won as usize`
const FINAL_SEEDING: [[usize; 4]; 4] = [
    [3, 0, 2, 1],
    [3, 0, 1, 2],
    [0, 3, 2, 1],
    [0, 3, 1, 2],
];

/// Runs the playoff matches for whoever is directing the tournament
pub trait BracketAnnouncer {
    fn announce(&mut self, seeds: &[String], third_place_match: bool) -> Result<()>;

    fn match_winner(&mut self, stage: PlayoffStage, first: &str, second: &str) -> Result<String>;
}

pub fn final_seeding(seed1_won: bool, seed2_won: bool) -> [usize; 4] {
    FINAL_SEEDING[seed1_won as usize * 2 + seed2_won as usize]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffGame {
    pub stage: PlayoffStage,
    pub first: String,
    pub second: String,
    pub winner: String,
}

impl PlayoffGame {
    pub fn loser(&self) -> &str {
        if self.winner == self.first {
            &self.second
        } else {
            &self.first
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketReport {
    pub seeds: Vec<String>,
    pub semifinals: Vec<PlayoffGame>,
    pub final_match: PlayoffGame,
    pub consolation: Option<PlayoffGame>,
}

/// One line of the final placings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placing {
    pub place: usize,
    pub name: String,
    pub score: f64,
    pub tiebreak: f64,
}

/// Semifinals, final and the optional third-place match for the top four seeds
pub fn run_playoffs(
    ledger: &mut ScoreLedger,
    seeds: &[String],
    third_place_match: bool,
    announcer: &mut dyn BracketAnnouncer,
) -> CoreResult<BracketReport> {
    if seeds.len() < BRACKET_SIZE {
        return Err(TournamentError::BracketTooSmall(seeds.len()));
    }
    let seeds = &seeds[..BRACKET_SIZE];
    info!("Playoffs: {}", seeds.join(", "));
    announcer
        .announce(seeds, third_place_match)
        .map_err(|e| TournamentError::Collaborator(e.to_string()))?;

    let mut semifinals = Vec::with_capacity(SEMIFINALS.len());
    for (high, low) in SEMIFINALS {
        let game = play(ledger, announcer, PlayoffStage::Semifinal, &seeds[high], &seeds[low])?;
        semifinals.push(game);
    }

    let slots = final_seeding(
        semifinals[0].winner == seeds[0],
        semifinals[1].winner == seeds[1],
    );
    let final_match = play(
        ledger,
        announcer,
        PlayoffStage::Final,
        &seeds[slots[0]],
        &seeds[slots[2]],
    )?;
    let consolation = if third_place_match {
        Some(play(
            ledger,
            announcer,
            PlayoffStage::Consolation,
            &seeds[slots[1]],
            &seeds[slots[3]],
        )?)
    } else {
        None
    };

    info!("  → {} wins the tournament", final_match.winner);
    Ok(BracketReport {
        seeds: seeds.to_vec(),
        semifinals,
        final_match,
        consolation,
    })
}

fn play(
    ledger: &mut ScoreLedger,
    announcer: &mut dyn BracketAnnouncer,
    stage: PlayoffStage,
    first: &str,
    second: &str,
) -> CoreResult<PlayoffGame> {
    let winner = announcer
        .match_winner(stage, first, second)
        .map_err(|e| TournamentError::Collaborator(e.to_string()))?;
    if winner != first && winner != second {
        return Err(TournamentError::InvalidResult(format!(
            "{} did not play in the {} {} - {}",
            winner,
            stage.as_str(),
            first,
            second
        )));
    }

    let loser = if winner == first { second } else { first };
    ledger.record_playoff(stage, &winner, loser)?;
    info!("  → {}: {} beats {}", stage.as_str(), winner, loser);

    Ok(PlayoffGame {
        stage,
        first: first.to_string(),
        second: second.to_string(),
        winner,
    })
}

// Lower tiers finish higher; players outside the bracket share the last tier
fn podium_tier(player: &Player) -> u8 {
    let flags = &player.bracket;
    if flags.won_final() {
        0
    } else if flags.lost_final() {
        1
    } else if flags.won_consolation() || (flags.lost_semifinal() && flags.consolation.is_none()) {
        2
    } else if flags.lost_semifinal() {
        3
    } else {
        4
    }
}

/// Final placings from playoff flags, falling back to standings order
///
/// Without a third-place match both semifinal losers share third place.
pub fn podium(standings: &[&Player]) -> Vec<Placing> {
    let mut order: Vec<(u8, &Player)> = standings.iter().map(|p| (podium_tier(p), *p)).collect();
    order.sort_by_key(|(tier, _)| *tier);

    let mut placings: Vec<Placing> = Vec::with_capacity(order.len());
    for (index, (tier, player)) in order.iter().enumerate() {
        let shares_previous = index > 0 && *tier == 2 && order[index - 1].0 == 2;
        let place = match placings.last() {
            Some(previous) if shares_previous => previous.place,
            _ => index + 1,
        };
        placings.push(Placing {
            place,
            name: player.name.clone(),
            score: player.score(),
            tiebreak: player.tiebreak(),
        });
    }
    placings
}
