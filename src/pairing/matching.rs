use std::collections::HashSet;

use super::cost::CostMatrix;

/// A set of disjoint player-index pairs over one round's pool
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matching {
    pairs: Vec<(usize, usize)>,
}

/// What a single strategy reports back to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Solved(Matching),
    Failed(String),
}

impl Matching {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    /// Read consecutive indices as pairs: `[0, 3, 1, 2]` is `(0,3), (1,2)`
    pub fn from_flat(indices: &[usize]) -> Result<Self, String> {
        if indices.len() % 2 != 0 {
            return Err(format!("odd number of indices ({})", indices.len()));
        }
        let pairs = indices.chunks(2).map(|c| (c[0], c[1])).collect();
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn total_cost(&self, costs: &CostMatrix) -> i64 {
        self.pairs.iter().map(|&(i, j)| costs.get(i, j)).sum()
    }

    /// Every index in `0..size` exactly once, never paired with itself
    pub fn validate(&self, size: usize) -> Result<(), String> {
        if self.pairs.len() * 2 != size {
            return Err(format!(
                "{} pairs cannot cover {} players",
                self.pairs.len(),
                size
            ));
        }

        let mut seen = HashSet::with_capacity(size);
        for &(i, j) in &self.pairs {
            if i == j {
                return Err(format!("player {} paired with themselves", i));
            }
            for index in [i, j] {
                if index >= size {
                    return Err(format!("index {} out of range for {} players", index, size));
                }
                if !seen.insert(index) {
                    return Err(format!("player {} appears twice", index));
                }
            }
        }
        Ok(())
    }
}

/// Keep the valid candidates and return the cheapest; the earlier one wins a tie
pub fn pick_cheaper(candidates: Vec<Matching>, costs: &CostMatrix) -> StrategyOutcome {
    let mut best: Option<(i64, Matching)> = None;
    let mut reasons = Vec::new();

    for candidate in candidates {
        if let Err(reason) = candidate.validate(costs.size()) {
            reasons.push(reason);
            continue;
        }
        let cost = candidate.total_cost(costs);
        match &best {
            Some((best_cost, _)) if *best_cost <= cost => {}
            _ => best = Some((cost, candidate)),
        }
    }

    match best {
        Some((_, matching)) => StrategyOutcome::Solved(matching),
        None => StrategyOutcome::Failed(format!(
            "no candidate is a perfect matching ({})",
            reasons.join("; ")
        )),
    }
}
