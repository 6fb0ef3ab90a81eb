use std::collections::HashSet;

use super::assignment::Assignment;
use super::cost::CostMatrix;
use super::matching::{Matching, StrategyOutcome, pick_cheaper};

/// Walk the assignment rows in order: a pair goes to the first candidate
/// unless one of its players is already there, otherwise to the second.
pub fn solve(assignment: &Assignment, costs: &CostMatrix) -> StrategyOutcome {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut seated = HashSet::new();

    for (&row, &col) in assignment.rows.iter().zip(&assignment.cols) {
        if seated.contains(&row) || seated.contains(&col) {
            second.push((row, col));
        } else {
            seated.insert(row);
            seated.insert(col);
            first.push((row, col));
        }
    }

    pick_cheaper(vec![Matching::new(first), Matching::new(second)], costs)
}
