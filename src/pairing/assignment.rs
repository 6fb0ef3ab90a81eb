use log::debug;
use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

use super::cost::CostMatrix;

/// Row/column index arrays of a square assignment, `cols[r]` assigned to `rows[r]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl Assignment {
    pub fn from_permutation(cols: Vec<usize>) -> Self {
        Self {
            rows: (0..cols.len()).collect(),
            cols,
        }
    }

    /// `permutation()[r]` is the column chosen for row `r`
    pub fn permutation(&self) -> &[usize] {
        &self.cols
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Each column used exactly once
    pub fn check_permutation(&self) -> Result<(), String> {
        let n = self.cols.len();
        let mut used = vec![false; n];
        for &col in &self.cols {
            if col >= n {
                return Err(format!("column {} out of range", col));
            }
            if used[col] {
                return Err(format!("column {} assigned twice", col));
            }
            used[col] = true;
        }
        Ok(())
    }
}

/// Minimum-cost assignment over the full matrix (Hungarian algorithm)
pub fn solve(costs: &CostMatrix) -> Result<Assignment, String> {
    let n = costs.size();
    if n == 0 {
        return Ok(Assignment::from_permutation(Vec::new()));
    }

    let weights = Matrix::from_vec(n, n, costs.values().iter().copied().collect())
        .map_err(|e| format!("cannot build weight matrix: {:?}", e))?;
    let (total, cols) = kuhn_munkres_min(&weights);
    debug!("Assignment cost {}: {:?}", total, cols);

    let assignment = Assignment::from_permutation(cols);
    assignment.check_permutation()?;
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assignment_avoids_diagonal() {
        let costs = CostMatrix::from_array(array![
            [999, 1, 4, 9],
            [1, 999, 9, 4],
            [4, 9, 999, 1],
            [9, 4, 1, 999],
        ])
        .unwrap();
        let assignment = solve(&costs).unwrap();

        assert_eq!(assignment.rows, vec![0, 1, 2, 3]);
        assert_eq!(assignment.permutation(), &[1, 0, 3, 2]);
    }

    #[test]
    fn test_empty_matrix() {
        let costs = CostMatrix::from_array(ndarray::Array2::zeros((0, 0))).unwrap();
        assert!(solve(&costs).unwrap().is_empty());
    }

    #[test]
    fn test_check_permutation_rejects_reuse() {
        assert!(Assignment::from_permutation(vec![1, 1, 0]).check_permutation().is_err());
        assert!(Assignment::from_permutation(vec![1, 2, 0]).check_permutation().is_ok());
    }
}
