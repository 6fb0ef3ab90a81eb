use log::debug;

use super::blossom;
use super::cost::CostMatrix;
use super::matching::{Matching, StrategyOutcome};

/// Exact minimum-weight perfect matching on the complete graph
///
/// Costs are flipped into weights `top - cost` with `top` above every
/// off-diagonal cost, so the heaviest maximum-cardinality matching is the
/// cheapest perfect one. The diagonal never becomes an edge.
pub fn solve(costs: &CostMatrix) -> StrategyOutcome {
    let n = costs.size();
    if n % 2 != 0 {
        return StrategyOutcome::Failed(format!("odd pool of {} players", n));
    }

    let mut highest = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            highest = highest.max(costs.get(i, j));
        }
    }
    // Duals reach twice the heaviest weight
    let Some(top) = highest.checked_add(1).filter(|top| *top <= i64::MAX / 4) else {
        return StrategyOutcome::Failed("costs too large to weigh".to_string());
    };

    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push((i, j, top - costs.get(i, j)));
        }
    }

    let mates = match blossom::max_weight_matching(n, &edges) {
        Ok(mates) => mates,
        Err(reason) => return StrategyOutcome::Failed(format!("matching solver failed: {}", reason)),
    };

    let mut pairs = Vec::with_capacity(n / 2);
    for (i, mate) in mates.iter().enumerate() {
        match mate {
            Some(j) if i < *j => pairs.push((i, *j)),
            Some(_) => {}
            None => return StrategyOutcome::Failed(format!("player {} left unmatched", i)),
        }
    }

    let matching = Matching::new(pairs);
    debug!("Exact matching cost {}", matching.total_cost(costs));
    StrategyOutcome::Solved(matching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn solved(outcome: StrategyOutcome) -> Matching {
        match outcome {
            StrategyOutcome::Solved(m) => m,
            StrategyOutcome::Failed(reason) => panic!("unexpected failure: {}", reason),
        }
    }

    /// Cheapest perfect matching by dynamic programming over subsets
    fn cheapest_by_subsets(costs: &CostMatrix) -> i64 {
        let n = costs.size();
        let full = (1usize << n) - 1;
        let mut best = vec![i64::MAX; full + 1];
        best[0] = 0;
        for mask in 1..=full {
            if mask.count_ones() % 2 != 0 {
                continue;
            }
            let i = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << i);
            let mut candidates = rest;
            while candidates != 0 {
                let j = candidates.trailing_zeros() as usize;
                candidates &= candidates - 1;
                let remainder = best[rest & !(1 << j)];
                if remainder != i64::MAX {
                    best[mask] = best[mask].min(remainder + costs.get(i, j));
                }
            }
        }
        best[full]
    }

    fn random_costs(rng: &mut StdRng, n: usize) -> CostMatrix {
        let mut values = Array2::from_elem((n, n), 100_000);
        for i in 0..n {
            for j in (i + 1)..n {
                let cost = rng.gen_range(0..60);
                values[[i, j]] = cost;
                values[[j, i]] = cost;
            }
        }
        CostMatrix::from_array(values).unwrap()
    }

    #[test]
    fn test_empty_pool() {
        let costs = CostMatrix::from_array(Array2::zeros((0, 0))).unwrap();
        assert!(solved(solve(&costs)).is_empty());
    }

    #[test]
    fn test_finds_global_minimum_not_greedy() {
        // Greedy on (0,1) first would force (2,3) at cost 100
        let costs = CostMatrix::from_array(array![
            [999, 1, 2, 50],
            [1, 999, 50, 2],
            [2, 50, 999, 100],
            [50, 2, 100, 999],
        ])
        .unwrap();
        let matching = solved(solve(&costs));

        assert_eq!(matching.pairs(), &[(0, 2), (1, 3)]);
        assert_eq!(matching.total_cost(&costs), 4);
    }

    #[test]
    fn test_matches_subset_search_on_random_pools() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [2, 4, 6, 8, 10, 12, 14] {
            for _ in 0..20 {
                let costs = random_costs(&mut rng, n);
                let matching = solved(solve(&costs));

                assert!(matching.validate(n).is_ok());
                assert_eq!(matching.total_cost(&costs), cheapest_by_subsets(&costs), "n={}", n);
            }
        }
    }

    #[test]
    fn test_large_pool_is_perfect() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [24, 40, 64, 100] {
            let costs = random_costs(&mut rng, n);
            let matching = solved(solve(&costs));
            assert_eq!(matching.len(), n / 2);
            assert!(matching.validate(n).is_ok());
        }
    }

    #[test]
    fn test_odd_pool_reports_failure() {
        let costs = CostMatrix::from_array(Array2::zeros((3, 3))).unwrap();
        assert!(matches!(solve(&costs), StrategyOutcome::Failed(_)));
    }
}
