use log::{info, warn};

use crate::domain::Player;

/// Take one player out of an odd pool (sorted ascending by score)
///
/// The first player without a bye sits out. Once everybody has had one, the
/// player with the fewest byes sits out, earliest in pool order on a tie.
pub fn take_odd_player_out<'a>(pool: &mut Vec<&'a Player>) -> Option<&'a Player> {
    if pool.len() % 2 == 0 {
        return None;
    }

    let position = match pool.iter().position(|p| p.byes == 0) {
        Some(position) => position,
        None => {
            let position = pool
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.byes)
                .map(|(i, _)| i)?;
            warn!(
                "Every player already had a bye, {} gets another",
                pool[position].name
            );
            position
        }
    };

    let player = pool.remove(position);
    info!("  → {} has no pair this round", player.name);
    Some(player)
}
