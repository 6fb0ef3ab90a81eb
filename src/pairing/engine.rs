use log::{info, warn};

use super::assignment::{self, Assignment};
use super::cost::CostMatrix;
use super::manual::{self, ManualPairing};
use super::matching::{Matching, StrategyOutcome};
use super::{cycles, exact, greedy};
use crate::config::PairingSettings;
use crate::domain::Strategy;
use crate::errors::{CoreResult, TournamentError};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub matching: Matching,
    pub strategy: Strategy,
    pub fallbacks: Vec<String>,
    pub total_cost: i64,
}

/// Runs the strategies in order until one yields a perfect matching
pub struct MatchingEngine<'a> {
    settings: &'a PairingSettings,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(settings: &'a PairingSettings) -> Self {
        Self { settings }
    }

    pub fn solve(
        &self,
        costs: &CostMatrix,
        operator: &mut dyn ManualPairing,
    ) -> CoreResult<EngineOutcome> {
        let n = costs.size();
        if n % 2 != 0 {
            return Err(TournamentError::InvariantViolation(format!(
                "cannot pair an odd pool of {} players",
                n
            )));
        }
        let mut fallbacks = Vec::new();

        let primary = if self.settings.exact_matching {
            exact::solve(costs)
        } else {
            StrategyOutcome::Failed("exact matching disabled".to_string())
        };
        match primary {
            StrategyOutcome::Solved(m) => return finish(m, Strategy::Exact, fallbacks, costs),
            StrategyOutcome::Failed(reason) => {
                fall_back(&mut fallbacks, Strategy::Exact, Strategy::CycleDecomposition, &reason)
            }
        }

        let assignment = match assignment::solve(costs) {
            Ok(assignment) => Some(assignment),
            Err(reason) => {
                let reason = format!("assignment solver failed: {}", reason);
                fall_back(&mut fallbacks, Strategy::CycleDecomposition, Strategy::Greedy, &reason);
                fall_back(&mut fallbacks, Strategy::Greedy, Strategy::Manual, &reason);
                None
            }
        };

        if let Some((m, strategy)) = assignment
            .as_ref()
            .and_then(|a| self.try_assignment_strategies(a, costs, &mut fallbacks))
        {
            return finish(m, strategy, fallbacks, costs);
        }

        let matching = manual::solve(
            assignment.as_ref(),
            costs,
            operator,
            self.settings.manual_attempts,
        )?;
        finish(matching, Strategy::Manual, fallbacks, costs)
    }

    fn try_assignment_strategies(
        &self,
        assignment: &Assignment,
        costs: &CostMatrix,
        fallbacks: &mut Vec<String>,
    ) -> Option<(Matching, Strategy)> {
        match cycles::solve(assignment, costs) {
            StrategyOutcome::Solved(m) => return Some((m, Strategy::CycleDecomposition)),
            StrategyOutcome::Failed(reason) => {
                fall_back(fallbacks, Strategy::CycleDecomposition, Strategy::Greedy, &reason)
            }
        }

        match greedy::solve(assignment, costs) {
            StrategyOutcome::Solved(m) => Some((m, Strategy::Greedy)),
            StrategyOutcome::Failed(reason) => {
                fall_back(fallbacks, Strategy::Greedy, Strategy::Manual, &reason);
                None
            }
        }
    }
}

fn fall_back(fallbacks: &mut Vec<String>, failed: Strategy, next: Strategy, reason: &str) {
    let message = format!(
        "{} failed ({}), trying {}",
        failed.as_str(),
        reason,
        next.as_str()
    );
    warn!("{}", message);
    fallbacks.push(message);
}

/// Whatever produced it, the matching must cover every player exactly once
fn finish(
    matching: Matching,
    strategy: Strategy,
    fallbacks: Vec<String>,
    costs: &CostMatrix,
) -> CoreResult<EngineOutcome> {
    matching
        .validate(costs.size())
        .map_err(TournamentError::InvariantViolation)?;
    let total_cost = matching.total_cost(costs);
    info!(
        "  → {} pairs via {} (cost {})",
        matching.len(),
        strategy.as_str(),
        total_cost
    );
    Ok(EngineOutcome {
        matching,
        strategy,
        fallbacks,
        total_cost,
    })
}
