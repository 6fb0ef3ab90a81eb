use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{TieBreakMode, TournamentSettings};
use crate::domain::{Player, ScoreLedger};
use crate::errors::{CoreResult, TournamentError};

/// Plays one auxiliary game between two tied players and names the winner
pub trait DeciderGame {
    fn play(&mut self, first: &Player, second: &Player) -> Result<String>;
}

/// A decider that was played at the qualification cutoff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decider {
    pub first: String,
    pub second: String,
    pub winner: String,
}

fn sort_key(player: &Player, mode: TieBreakMode) -> (u32, u32) {
    (player.half_points(), player.tiebreak_tenths(mode))
}

/// Players ordered by score then tie-break, best first; full ties keep seating order
pub fn standings(ledger: &ScoreLedger, mode: TieBreakMode) -> Vec<&Player> {
    let mut order: Vec<&Player> = ledger.players().iter().collect();
    order.sort_by(|a, b| sort_key(b, mode).cmp(&sort_key(a, mode)));
    order
}

/// Everyone ranked at or above the qualification cutoff, ties included
pub fn cutoff_group(ledger: &ScoreLedger, qualifiers: usize, mode: TieBreakMode) -> Vec<&Player> {
    let order = standings(ledger, mode);
    let cutoff = qualifiers.min(order.len());
    if cutoff == 0 {
        return Vec::new();
    }
    let boundary = sort_key(order[cutoff - 1], mode);
    order
        .into_iter()
        .filter(|p| sort_key(p, mode) >= boundary)
        .collect()
}

fn first_tied_pair(
    ledger: &ScoreLedger,
    qualifiers: usize,
    mode: TieBreakMode,
) -> Option<(String, String)> {
    let group = cutoff_group(ledger, qualifiers, mode);
    group
        .windows(2)
        .find(|pair| sort_key(pair[0], mode) == sort_key(pair[1], mode))
        .map(|pair| (pair[0].name.clone(), pair[1].name.clone()))
}

/// Play deciders until the cutoff group is strictly ordered
///
/// Each decider adds 0.1 to the winner's tie-break. The group is rebuilt
/// after every game, so players can drop out of it as others overtake them.
pub fn resolve_ties(
    ledger: &mut ScoreLedger,
    settings: &TournamentSettings,
    game: &mut dyn DeciderGame,
) -> CoreResult<Vec<Decider>> {
    let mode = settings.tiebreak;
    let mut played: Vec<Decider> = Vec::new();

    while let Some((first, second)) = first_tied_pair(ledger, settings.qualifiers, mode) {
        if played.len() >= settings.max_deciders {
            return Err(TournamentError::TieBreakUnresolved(format!(
                "{} and {} still tied after {} deciders",
                first,
                second,
                played.len()
            )));
        }

        info!("  → Decider: {} vs {}", first, second);
        let winner = game
            .play(ledger.get(&first)?, ledger.get(&second)?)
            .map_err(|e| {
                TournamentError::TieBreakUnresolved(format!(
                    "decider between {} and {} failed: {}",
                    first, second, e
                ))
            })?;
        if winner != first && winner != second {
            return Err(TournamentError::TieBreakUnresolved(format!(
                "{} is not a player in the decider between {} and {}",
                winner, first, second
            )));
        }

        ledger.award_decider(&winner)?;
        debug!("{} wins the decider", winner);
        played.push(Decider {
            first,
            second,
            winner,
        });
    }

    if !played.is_empty() {
        info!("  → {} decider(s) played", played.len());
    }
    Ok(played)
}
