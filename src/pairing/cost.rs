use log::debug;
use ndarray::Array2;

use crate::domain::Player;
use crate::errors::{CoreResult, TournamentError};

/// Symmetric pairing costs in quarter-point units (squared half-point gaps)
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    values: Array2<i64>,
}

impl CostMatrix {
    /// Build costs over a pool sorted by ascending score
    pub fn build(players: &[&Player], rounds: u32) -> Self {
        let n = players.len();
        let max_gap = max_gap_cost(players, rounds);
        let penalty = repeat_penalty(max_gap, n);
        let sentinel = self_pairing_sentinel(max_gap, penalty, n);

        let values = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                return sentinel;
            }
            let gap = players[i].half_points() as i64 - players[j].half_points() as i64;
            let mut cost = gap.saturating_mul(gap);
            if players[i].has_met(&players[j].name) || players[j].has_met(&players[i].name) {
                cost = cost.saturating_add(penalty);
            }
            cost
        });

        debug!("Cost matrix ({} players, repeat penalty {}):\n{}", n, penalty, values);
        Self { values }
    }

    pub fn from_array(values: Array2<i64>) -> CoreResult<Self> {
        let (rows, cols) = values.dim();
        if rows != cols {
            return Err(TournamentError::InvariantViolation(format!(
                "cost matrix must be square, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self { values })
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.values[[i, j]]
    }

    pub fn values(&self) -> &Array2<i64> {
        &self.values
    }

    pub fn is_symmetric(&self) -> bool {
        self.values == self.values.t()
    }
}

/// Largest squared gap any two players can show after `rounds` rounds
fn max_gap_cost(players: &[&Player], rounds: u32) -> i64 {
    let by_rounds = 2 * i64::from(rounds);
    let observed = match (
        players.iter().map(|p| p.half_points()).max(),
        players.iter().map(|p| p.half_points()).min(),
    ) {
        (Some(high), Some(low)) => (high - low) as i64,
        _ => 0,
    };
    let gap = by_rounds.max(observed);
    gap.saturating_mul(gap)
}

/// Outweighs the gaps of an entire round, so fewer repeats always wins
pub fn repeat_penalty(max_gap: i64, players: usize) -> i64 {
    let boards = (players / 2).max(1) as i64;
    max_gap.saturating_mul(boards).saturating_add(1)
}

/// Above any matching that avoids the diagonal
pub fn self_pairing_sentinel(max_gap: i64, penalty: i64, players: usize) -> i64 {
    let boards = (players / 2).max(1) as i64;
    max_gap
        .saturating_add(penalty)
        .saturating_mul(boards)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, GameScore};

    fn player(name: &str, wins: u32) -> Player {
        let mut p = Player::new(name);
        for i in 0..wins {
            p.record_game(&format!("x{}", i), Color::White, GameScore::Win);
        }
        p
    }

    #[test]
    fn test_costs_are_squared_half_point_gaps() {
        let a = player("A", 0);
        let b = player("B", 1);
        let c = player("C", 2);
        let costs = CostMatrix::build(&[&a, &b, &c], 3);

        assert_eq!(costs.get(0, 1), 4);
        assert_eq!(costs.get(0, 2), 16);
        assert_eq!(costs.get(1, 2), 4);
        assert!(costs.is_symmetric());
    }

    #[test]
    fn test_diagonal_dominates_every_off_diagonal_entry() {
        let mut a = player("A", 0);
        let mut b = player("B", 4);
        a.record_game("B", Color::White, GameScore::Loss);
        b.record_game("A", Color::Black, GameScore::Win);
        let c = player("C", 2);
        let d = player("D", 1);
        let costs = CostMatrix::build(&[&a, &c, &d, &b], 5);

        let sentinel = costs.get(0, 0);
        for i in 0..4 {
            assert_eq!(costs.get(i, i), sentinel);
            for j in 0..4 {
                if i != j {
                    assert!(costs.get(i, j) < sentinel);
                }
            }
        }
    }

    #[test]
    fn test_repeat_penalty_outweighs_gaps() {
        let mut a = player("A", 1);
        let mut b = player("B", 1);
        a.record_game("B", Color::White, GameScore::Draw);
        b.record_game("A", Color::Black, GameScore::Draw);
        let c = player("C", 0);
        let costs = CostMatrix::build(&[&c, &a, &b], 2);

        let repeat = costs.get(1, 2);
        let widest_gap = (2 * 2) * (2 * 2);
        assert!(repeat > widest_gap);
        assert!(costs.is_symmetric());
    }

    #[test]
    fn test_huge_round_count_saturates() {
        let a = player("A", 0);
        let b = player("B", 3);
        let costs = CostMatrix::build(&[&a, &b], u32::MAX);

        assert_eq!(costs.get(0, 1), 36);
        assert!(costs.get(0, 0) > costs.get(0, 1));
        assert_eq!(self_pairing_sentinel(i64::MAX, i64::MAX, 40), i64::MAX);
    }

    #[test]
    fn test_from_array_requires_square() {
        let values = Array2::<i64>::zeros((2, 3));
        assert!(CostMatrix::from_array(values).is_err());
    }
}
