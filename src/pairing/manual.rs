use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use super::assignment::Assignment;
use super::cost::CostMatrix;
use super::matching::{Matching, StrategyOutcome, pick_cheaper};
use crate::errors::{CoreResult, TournamentError};

/// Two hand-typed candidate pairings as flat index lists, e.g. `[0, 3, 1, 2]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualProposal {
    pub first: Vec<usize>,
    #[serde(default)]
    pub second: Vec<usize>,
}

/// The operator who pairs by hand once every automated strategy has failed
pub trait ManualPairing {
    /// `hint` is the assignment solver's row/column arrays when it produced any
    fn propose(&mut self, hint: Option<&Assignment>, attempt: usize) -> Result<ManualProposal>;
}

/// Used where nobody is available to pair by hand
pub struct NoOperator;

impl ManualPairing for NoOperator {
    fn propose(&mut self, _hint: Option<&Assignment>, _attempt: usize) -> Result<ManualProposal> {
        anyhow::bail!("no operator available to pair by hand")
    }
}

/// Ask the operator until a proposal forms a perfect matching or attempts run out
pub fn solve(
    hint: Option<&Assignment>,
    costs: &CostMatrix,
    operator: &mut dyn ManualPairing,
    attempts: usize,
) -> CoreResult<Matching> {
    let mut last_reason = "no proposal requested".to_string();

    for attempt in 1..=attempts {
        let proposal = operator.propose(hint, attempt).map_err(|e| {
            TournamentError::ManualPairingRejected {
                attempts: attempt,
                reason: e.to_string(),
            }
        })?;

        match evaluate(&proposal, costs) {
            Ok(matching) => return Ok(matching),
            Err(reason) => {
                warn!("Manual pairing attempt {} rejected: {}", attempt, reason);
                last_reason = reason;
            }
        }
    }

    Err(TournamentError::ManualPairingRejected {
        attempts,
        reason: last_reason,
    })
}

/// Every supplied list must be a perfect matching; the cheaper one is kept
fn evaluate(proposal: &ManualProposal, costs: &CostMatrix) -> Result<Matching, String> {
    if costs.size() == 0 {
        return Ok(Matching::default());
    }
    let lists: Vec<&Vec<usize>> = [&proposal.first, &proposal.second]
        .into_iter()
        .filter(|list| !list.is_empty())
        .collect();
    if lists.is_empty() {
        return Err("no pairs supplied".to_string());
    }

    let mut candidates = Vec::with_capacity(lists.len());
    for list in lists {
        let matching = Matching::from_flat(list)?;
        matching.validate(costs.size())?;
        candidates.push(matching);
    }

    match pick_cheaper(candidates, costs) {
        StrategyOutcome::Solved(matching) => Ok(matching),
        StrategyOutcome::Failed(reason) => Err(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Queue(Vec<ManualProposal>);

    impl ManualPairing for Queue {
        fn propose(&mut self, _hint: Option<&Assignment>, _attempt: usize) -> Result<ManualProposal> {
            if self.0.is_empty() {
                anyhow::bail!("operator gave up");
            }
            Ok(self.0.remove(0))
        }
    }

    fn costs() -> CostMatrix {
        CostMatrix::from_array(array![
            [99, 1, 4, 9],
            [1, 99, 1, 4],
            [4, 1, 99, 1],
            [9, 4, 1, 99],
        ])
        .unwrap()
    }

    fn proposal(first: &[usize], second: &[usize]) -> ManualProposal {
        ManualProposal { first: first.to_vec(), second: second.to_vec() }
    }

    #[test]
    fn test_cheaper_list_is_kept() {
        let mut operator = Queue(vec![proposal(&[0, 3, 1, 2], &[0, 1, 2, 3])]);
        let matching = solve(None, &costs(), &mut operator, 3).unwrap();
        assert_eq!(matching.pairs(), &[(0, 1), (2, 3)]);
    }

    #[test]
    fn test_single_list_accepted() {
        let mut operator = Queue(vec![proposal(&[0, 3, 1, 2], &[])]);
        let matching = solve(None, &costs(), &mut operator, 3).unwrap();
        assert_eq!(matching.pairs(), &[(0, 3), (1, 2)]);
    }

    #[test]
    fn test_malformed_proposal_is_requested_again() {
        let mut operator = Queue(vec![
            proposal(&[0, 0, 1, 2], &[]),
            proposal(&[0, 1, 2, 3], &[0, 1, 2]),
            proposal(&[1, 0, 3, 2], &[]),
        ]);
        let matching = solve(None, &costs(), &mut operator, 3).unwrap();
        assert_eq!(matching.pairs(), &[(1, 0), (3, 2)]);
    }

    #[test]
    fn test_attempts_exhausted() {
        let mut operator = Queue(vec![proposal(&[0, 1], &[]), proposal(&[], &[])]);
        let err = solve(None, &costs(), &mut operator, 2).unwrap_err();
        assert!(matches!(err, TournamentError::ManualPairingRejected { attempts: 2, .. }));
    }

    #[test]
    fn test_no_operator_is_fatal() {
        let err = solve(None, &costs(), &mut NoOperator, 3).unwrap_err();
        assert!(matches!(err, TournamentError::ManualPairingRejected { attempts: 1, .. }));
    }
}
