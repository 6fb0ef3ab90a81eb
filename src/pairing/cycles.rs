use super::assignment::Assignment;
use super::cost::CostMatrix;
use super::matching::{Matching, StrategyOutcome, pick_cheaper};

/// Split a permutation into its disjoint cycles, each starting at its lowest index
pub fn decompose(permutation: &[usize]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; permutation.len()];
    let mut cycles = Vec::new();

    for start in 0..permutation.len() {
        if visited[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut current = start;
        while !visited[current] {
            visited[current] = true;
            cycle.push(current);
            current = permutation[current];
        }
        cycles.push(cycle);
    }
    cycles
}

/// Turn an assignment into a matching by 2-coloring the edges of each cycle
///
/// A 2-cycle is already a pair. An even cycle `c0 -> c1 -> ... -> c0` yields
/// two alternating edge sets; the first set of every cycle goes to one
/// candidate and the second set to the other. Fixed points and odd cycles
/// cannot be split into pairs.
pub fn solve(assignment: &Assignment, costs: &CostMatrix) -> StrategyOutcome {
    if let Err(reason) = assignment.check_permutation() {
        return StrategyOutcome::Failed(reason);
    }

    let mut first = Vec::new();
    let mut second = Vec::new();

    for cycle in decompose(assignment.permutation()) {
        match cycle.len() {
            1 => {
                return StrategyOutcome::Failed(format!(
                    "player {} assigned to themselves",
                    cycle[0]
                ));
            }
            2 => {
                first.push((cycle[0], cycle[1]));
                second.push((cycle[0], cycle[1]));
            }
            len if len % 2 != 0 => {
                return StrategyOutcome::Failed(format!(
                    "odd cycle {:?} cannot be split into pairs",
                    cycle
                ));
            }
            len => {
                for step in 0..len {
                    let edge = (cycle[step], cycle[(step + 1) % len]);
                    if step % 2 == 0 {
                        first.push(edge);
                    } else {
                        second.push(edge);
                    }
                }
            }
        }
    }

    pick_cheaper(vec![Matching::new(first), Matching::new(second)], costs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn line_costs(n: usize) -> CostMatrix {
        CostMatrix::from_array(Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j { 1_000 } else { (i as i64 - j as i64).pow(2) }
        }))
        .unwrap()
    }

    #[test]
    fn test_decompose_cycles() {
        let cycles = decompose(&[1, 2, 3, 0, 5, 4]);
        assert_eq!(cycles, vec![vec![0, 1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_two_cycles_become_pairs() {
        let assignment = Assignment::from_permutation(vec![1, 0, 3, 2]);
        let outcome = solve(&assignment, &line_costs(4));
        assert_eq!(outcome, StrategyOutcome::Solved(Matching::new(vec![(0, 1), (2, 3)])));
    }

    #[test]
    fn test_even_cycle_picks_cheaper_half() {
        // 0 -> 1 -> 2 -> 3 -> 0: halves {(0,1),(2,3)} cost 2, {(1,2),(3,0)} cost 10
        let assignment = Assignment::from_permutation(vec![1, 2, 3, 0]);
        let outcome = solve(&assignment, &line_costs(4));
        assert_eq!(outcome, StrategyOutcome::Solved(Matching::new(vec![(0, 1), (2, 3)])));

        // 0 -> 3 -> 2 -> 1 -> 0: halves {(0,3),(2,1)} cost 10, {(3,2),(1,0)} cost 2
        let assignment = Assignment::from_permutation(vec![3, 0, 1, 2]);
        let outcome = solve(&assignment, &line_costs(4));
        assert_eq!(outcome, StrategyOutcome::Solved(Matching::new(vec![(3, 2), (1, 0)])));
    }

    #[test]
    fn test_odd_cycle_fails() {
        // 0 -> 1 -> 2 -> 0 plus 3 <-> 4 <-> 5 is not a pairing of six players
        let assignment = Assignment::from_permutation(vec![1, 2, 0, 4, 5, 3]);
        assert!(matches!(
            solve(&assignment, &line_costs(6)),
            StrategyOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_fixed_point_fails() {
        let costs = CostMatrix::from_array(array![[0, 1], [1, 0]]).unwrap();
        let assignment = Assignment::from_permutation(vec![0, 1]);
        assert!(matches!(solve(&assignment, &costs), StrategyOutcome::Failed(_)));
    }
}
