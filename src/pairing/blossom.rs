//! Maximum-weight matching on a general graph (Edmonds' blossom method)
//!
//! Primal-dual formulation in `O(n^3)`: grow alternating trees from every
//! single vertex, shrink odd cycles into blossoms, and adjust dual variables
//! until an augmenting path of zero slack appears. Among matchings of maximum
//! cardinality the heaviest one is returned. Integer weights keep every dual
//! variable integral, so no floating point is involved.
//!
//! Endpoints are numbered `2k` and `2k + 1` for edge `k`; `endpoint[p]` is the
//! vertex at that end and `p ^ 1` is the opposite end of the same edge.

const NONE: usize = usize::MAX;

const FREE: i8 = 0;
const OUTER: i8 = 1;
const INNER: i8 = 2;
const SCANNED: i8 = 5;

/// Heaviest maximum-cardinality matching over vertices `0..vertices`
///
/// Returns each vertex's partner. An `Err` means the internal bookkeeping
/// reached a state the method never produces on well-formed input.
pub fn max_weight_matching(
    vertices: usize,
    edges: &[(usize, usize, i64)],
) -> Result<Vec<Option<usize>>, String> {
    if edges.is_empty() {
        return Ok(vec![None; vertices]);
    }
    if let Some(&(i, j, _)) = edges.iter().find(|&&(i, j, _)| i == j || i.max(j) >= vertices) {
        return Err(format!("edge ({}, {}) is not valid for {} vertices", i, j, vertices));
    }

    let mut state = Blossoms::new(vertices, edges);
    state.run()?;
    Ok(state
        .mate
        .iter()
        .map(|&p| (p != NONE).then(|| state.endpoint[p]))
        .collect())
}

struct Blossoms<'a> {
    n: usize,
    edges: &'a [(usize, usize, i64)],
    endpoint: Vec<usize>,
    neighbours: Vec<Vec<usize>>,
    mate: Vec<usize>,
    label: Vec<i8>,
    label_end: Vec<usize>,
    in_blossom: Vec<usize>,
    parent: Vec<usize>,
    children: Vec<Vec<usize>>,
    base: Vec<usize>,
    child_endpoints: Vec<Vec<usize>>,
    best_edge: Vec<usize>,
    best_edges: Vec<Option<Vec<usize>>>,
    unused: Vec<usize>,
    dual: Vec<i64>,
    allowed: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a> Blossoms<'a> {
    fn new(n: usize, edges: &'a [(usize, usize, i64)]) -> Self {
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * edges.len());
        let mut neighbours = vec![Vec::new(); n];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            endpoint.push(i);
            endpoint.push(j);
            neighbours[i].push(2 * k + 1);
            neighbours[j].push(2 * k);
        }

        let mut dual = vec![max_weight; n];
        dual.resize(2 * n, 0);
        let mut base: Vec<usize> = (0..n).collect();
        base.resize(2 * n, NONE);

        Self {
            n,
            edges,
            endpoint,
            neighbours,
            mate: vec![NONE; n],
            label: vec![FREE; 2 * n],
            label_end: vec![NONE; 2 * n],
            in_blossom: (0..n).collect(),
            parent: vec![NONE; 2 * n],
            children: vec![Vec::new(); 2 * n],
            base,
            child_endpoints: vec![Vec::new(); 2 * n],
            best_edge: vec![NONE; 2 * n],
            best_edges: vec![None; 2 * n],
            unused: (n..2 * n).collect(),
            dual,
            allowed: vec![false; edges.len()],
            queue: Vec::new(),
        }
    }

    fn slack(&self, k: usize) -> i64 {
        let (i, j, w) = self.edges[k];
        self.dual[i] + self.dual[j] - 2 * w
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(b, &mut out);
        out
    }

    fn collect_leaves(&self, b: usize, out: &mut Vec<usize>) {
        if b < self.n {
            out.push(b);
        } else {
            for &child in &self.children[b] {
                self.collect_leaves(child, out);
            }
        }
    }

    /// Index into a blossom's child cycle; negative positions count from the end
    fn wrap(&self, b: usize, j: isize) -> usize {
        j.rem_euclid(self.children[b].len() as isize) as usize
    }

    fn assign_label(&mut self, w: usize, t: i8, p: usize) {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NONE;
        self.best_edge[b] = NONE;
        if t == OUTER {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == INNER {
            let m = self.mate[self.base[b]];
            let next = self.endpoint[m];
            self.assign_label(next, OUTER, m ^ 1);
        }
    }

    /// Walk both tree paths back; the first shared blossom is the new base,
    /// `NONE` means the roots differ and the edge completes an augmenting path
    fn scan_blossom(&mut self, mut v: usize, mut w: usize) -> usize {
        let mut path = Vec::new();
        let mut found = NONE;
        while v != NONE || w != NONE {
            let b = self.in_blossom[v];
            if self.label[b] == SCANNED {
                found = self.base[b];
                break;
            }
            path.push(b);
            self.label[b] = SCANNED;
            if self.label_end[b] == NONE {
                v = NONE;
            } else {
                let t = self.endpoint[self.label_end[b]];
                let bt = self.in_blossom[t];
                v = self.endpoint[self.label_end[bt]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = OUTER;
        }
        found
    }

    fn add_blossom(&mut self, base: usize, k: usize) -> Result<(), String> {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];
        let b = self.unused.pop().ok_or("no blossom slots left")?;

        self.base[b] = base;
        self.parent[b] = NONE;
        self.parent[bb] = b;

        let mut path = Vec::new();
        let mut ends = Vec::new();
        while bv != bb {
            self.parent[bv] = b;
            path.push(bv);
            ends.push(self.label_end[bv]);
            bv = self.in_blossom[self.endpoint[self.label_end[bv]]];
        }
        path.push(bb);
        path.reverse();
        ends.reverse();
        ends.push(2 * k);
        while bw != bb {
            self.parent[bw] = b;
            path.push(bw);
            ends.push(self.label_end[bw] ^ 1);
            bw = self.in_blossom[self.endpoint[self.label_end[bw]]];
        }

        self.children[b] = path.clone();
        self.child_endpoints[b] = ends;
        self.label[b] = OUTER;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;

        for leaf in self.leaves(b) {
            if self.label[self.in_blossom[leaf]] == INNER {
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Cheapest edge from the new blossom to each neighbouring outer blossom
        let mut best_to = vec![NONE; 2 * self.n];
        for &child in &path {
            let lists: Vec<Vec<usize>> = match self.best_edges[child].take() {
                Some(list) => vec![list],
                None => self
                    .leaves(child)
                    .iter()
                    .map(|&leaf| self.neighbours[leaf].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for k in lists.into_iter().flatten() {
                let (i, j, _) = self.edges[k];
                let far = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[far];
                if bj != b
                    && self.label[bj] == OUTER
                    && (best_to[bj] == NONE || self.slack(k) < self.slack(best_to[bj]))
                {
                    best_to[bj] = k;
                }
            }
            self.best_edge[child] = NONE;
        }

        let best: Vec<usize> = best_to.into_iter().filter(|&k| k != NONE).collect();
        self.best_edge[b] = NONE;
        for &k in &best {
            if self.best_edge[b] == NONE || self.slack(k) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = k;
            }
        }
        self.best_edges[b] = Some(best);
        Ok(())
    }

    fn expand_blossom(&mut self, b: usize, end_stage: bool) -> Result<(), String> {
        let children = self.children[b].clone();
        for &s in &children {
            self.parent[s] = NONE;
            if s < self.n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage)?;
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_stage && self.label[b] == INNER {
            // Relabel the even-length path from the entry child to the base
            let entry = self.in_blossom[self.endpoint[self.label_end[b] ^ 1]];
            let position = children
                .iter()
                .position(|&c| c == entry)
                .ok_or("entry child missing from blossom")?;
            let mut j = position as isize;
            let (step, trick) = if position & 1 == 1 {
                j -= children.len() as isize;
                (1isize, 0usize)
            } else {
                (-1, 1)
            };

            let mut p = self.label_end[b];
            while j != 0 {
                let q = self.child_endpoints[b][self.wrap(b, j - trick as isize)];
                let reached = self.endpoint[p ^ 1];
                self.label[reached] = FREE;
                self.label[self.endpoint[q ^ trick ^ 1]] = FREE;
                self.assign_label(reached, INNER, p);
                self.allowed[q / 2] = true;
                j += step;
                p = self.child_endpoints[b][self.wrap(b, j - trick as isize)] ^ trick;
                self.allowed[p / 2] = true;
                j += step;
            }

            let bv = children[self.wrap(b, j)];
            let reached = self.endpoint[p ^ 1];
            self.label[reached] = INNER;
            self.label[bv] = INNER;
            self.label_end[reached] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NONE;
            j += step;

            while children[self.wrap(b, j)] != entry {
                let bv = children[self.wrap(b, j)];
                j += step;
                if self.label[bv] == OUTER {
                    continue;
                }
                let labelled = self
                    .leaves(bv)
                    .into_iter()
                    .find(|&leaf| self.label[leaf] != FREE);
                if let Some(v) = labelled {
                    self.label[v] = FREE;
                    let m = self.mate[self.base[bv]];
                    self.label[self.endpoint[m]] = FREE;
                    let end = self.label_end[v];
                    self.assign_label(v, INNER, end);
                }
            }
        }

        self.label[b] = FREE;
        self.label_end[b] = NONE;
        self.children[b].clear();
        self.child_endpoints[b].clear();
        self.base[b] = NONE;
        self.best_edges[b] = None;
        self.best_edge[b] = NONE;
        self.unused.push(b);
        Ok(())
    }

    /// Flip matched edges along the path inside `b` so that `v` becomes its base
    fn augment_blossom(&mut self, b: usize, v: usize) -> Result<(), String> {
        let mut t = v;
        while self.parent[t] != b {
            t = self.parent[t];
            if t == NONE {
                return Err(format!("vertex {} is not inside blossom {}", v, b));
            }
        }
        if t >= self.n {
            self.augment_blossom(t, v)?;
        }

        let children = self.children[b].clone();
        let i = children
            .iter()
            .position(|&c| c == t)
            .ok_or("sub-blossom missing from parent")?;
        let mut j = i as isize;
        let (step, trick) = if i & 1 == 1 {
            j -= children.len() as isize;
            (1isize, 0usize)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = children[self.wrap(b, j)];
            let p = self.child_endpoints[b][self.wrap(b, j - trick as isize)] ^ trick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p])?;
            }
            j += step;
            let t = children[self.wrap(b, j)];
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1])?;
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        self.children[b].rotate_left(i);
        self.child_endpoints[b].rotate_left(i);
        self.base[b] = self.base[self.children[b][0]];
        Ok(())
    }

    fn augment_matching(&mut self, k: usize) -> Result<(), String> {
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.n {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = p;
                if self.label_end[bs] == NONE {
                    break;
                }
                let t = self.endpoint[self.label_end[bs]];
                let bt = self.in_blossom[t];
                s = self.endpoint[self.label_end[bt]];
                let j = self.endpoint[self.label_end[bt] ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = self.label_end[bt];
                p = self.label_end[bt] ^ 1;
            }
        }
        Ok(())
    }

    /// Scan the queue of outer vertices; true once the matching grew
    fn grow_trees(&mut self) -> Result<bool, String> {
        while let Some(v) = self.queue.pop() {
            for idx in 0..self.neighbours[v].len() {
                let p = self.neighbours[v][idx];
                let k = p / 2;
                let w = self.endpoint[p];
                if self.in_blossom[v] == self.in_blossom[w] {
                    continue;
                }

                let mut k_slack = 0;
                if !self.allowed[k] {
                    k_slack = self.slack(k);
                    if k_slack <= 0 {
                        self.allowed[k] = true;
                    }
                }

                let bw = self.in_blossom[w];
                if self.allowed[k] {
                    if self.label[bw] == FREE {
                        self.assign_label(w, INNER, p ^ 1);
                    } else if self.label[bw] == OUTER {
                        let base = self.scan_blossom(v, w);
                        if base != NONE {
                            self.add_blossom(base, k)?;
                        } else {
                            self.augment_matching(k)?;
                            return Ok(true);
                        }
                    } else if self.label[w] == FREE {
                        self.label[w] = INNER;
                        self.label_end[w] = p ^ 1;
                    }
                } else if self.label[bw] == OUTER {
                    let b = self.in_blossom[v];
                    if self.best_edge[b] == NONE || k_slack < self.slack(self.best_edge[b]) {
                        self.best_edge[b] = k;
                    }
                } else if self.label[w] == FREE
                    && (self.best_edge[w] == NONE || k_slack < self.slack(self.best_edge[w]))
                {
                    self.best_edge[w] = k;
                }
            }
        }
        Ok(false)
    }

    /// Apply the smallest dual change that makes progress; false ends the stage
    fn adjust_duals(&mut self) -> Result<bool, String> {
        enum Delta {
            Stop,
            FreeEdge(usize),
            OuterEdge(usize),
            Expand(usize),
        }
        let mut choice: Option<(i64, Delta)> = None;
        let better = |choice: &Option<(i64, Delta)>, d: i64| match choice {
            Some((best, _)) => d < *best,
            None => true,
        };

        for v in 0..self.n {
            let k = self.best_edge[v];
            if self.label[self.in_blossom[v]] == FREE && k != NONE {
                let d = self.slack(k);
                if better(&choice, d) {
                    choice = Some((d, Delta::FreeEdge(k)));
                }
            }
        }
        for b in 0..2 * self.n {
            let k = self.best_edge[b];
            if self.parent[b] == NONE && self.label[b] == OUTER && k != NONE {
                let d = self.slack(k) / 2;
                if better(&choice, d) {
                    choice = Some((d, Delta::OuterEdge(k)));
                }
            }
        }
        for b in self.n..2 * self.n {
            if self.base[b] != NONE
                && self.parent[b] == NONE
                && self.label[b] == INNER
                && better(&choice, self.dual[b])
            {
                choice = Some((self.dual[b], Delta::Expand(b)));
            }
        }
        let (delta, action) = choice.unwrap_or_else(|| {
            let lowest = self.dual[..self.n].iter().copied().min().unwrap_or(0);
            (lowest.max(0), Delta::Stop)
        });

        for v in 0..self.n {
            match self.label[self.in_blossom[v]] {
                OUTER => self.dual[v] -= delta,
                INNER => self.dual[v] += delta,
                _ => {}
            }
        }
        for b in self.n..2 * self.n {
            if self.base[b] != NONE && self.parent[b] == NONE {
                match self.label[b] {
                    OUTER => self.dual[b] += delta,
                    INNER => self.dual[b] -= delta,
                    _ => {}
                }
            }
        }

        match action {
            Delta::Stop => return Ok(false),
            Delta::FreeEdge(k) => {
                self.allowed[k] = true;
                let (i, j, _) = self.edges[k];
                let outer = if self.label[self.in_blossom[i]] == FREE { j } else { i };
                self.queue.push(outer);
            }
            Delta::OuterEdge(k) => {
                self.allowed[k] = true;
                self.queue.push(self.edges[k].0);
            }
            Delta::Expand(b) => self.expand_blossom(b, false)?,
        }
        Ok(true)
    }

    fn run(&mut self) -> Result<(), String> {
        for _ in 0..self.n {
            self.label.fill(FREE);
            self.best_edge.fill(NONE);
            for b in self.n..2 * self.n {
                self.best_edges[b] = None;
            }
            self.allowed.fill(false);
            self.queue.clear();

            for v in 0..self.n {
                if self.mate[v] == NONE && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, OUTER, NONE);
                }
            }

            let mut augmented = false;
            loop {
                if self.grow_trees()? {
                    augmented = true;
                    break;
                }
                if !self.adjust_duals()? {
                    break;
                }
            }
            if !augmented {
                break;
            }

            for b in self.n..2 * self.n {
                if self.parent[b] == NONE
                    && self.base[b] != NONE
                    && self.label[b] == OUTER
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(mates: &[Option<usize>], edges: &[(usize, usize, i64)]) -> i64 {
        edges
            .iter()
            .filter(|&&(i, j, _)| mates[i] == Some(j))
            .map(|e| e.2)
            .sum()
    }

    #[test]
    fn test_empty_and_single_edge() {
        assert_eq!(max_weight_matching(3, &[]).unwrap(), vec![None, None, None]);
        assert_eq!(
            max_weight_matching(2, &[(0, 1, 1)]).unwrap(),
            vec![Some(1), Some(0)]
        );
    }

    #[test]
    fn test_prefers_heavier_edge_on_path() {
        let edges = [(1, 2, 10), (2, 3, 11)];
        let mates = max_weight_matching(4, &edges).unwrap();
        assert_eq!(mates, vec![None, None, Some(3), Some(2)]);
    }

    #[test]
    fn test_maximum_cardinality_beats_single_heavy_edge() {
        // The heavy middle edge alone would leave two vertices unmatched
        let edges = [(0, 1, 2), (1, 2, 10), (2, 3, 2)];
        let mates = max_weight_matching(4, &edges).unwrap();
        assert_eq!(mates, vec![Some(1), Some(0), Some(3), Some(2)]);
    }

    #[test]
    fn test_odd_cycle_forms_blossom() {
        // Triangle 0-1-2 with a stem to 3; only augmenting through the blossom covers all four
        let edges = [(0, 1, 8), (1, 2, 9), (0, 2, 10), (2, 3, 7)];
        let mates = max_weight_matching(4, &edges).unwrap();
        assert_eq!(mates, vec![Some(1), Some(0), Some(3), Some(2)]);
    }

    #[test]
    fn test_nested_blossoms_are_expanded() {
        let edges = [
            (1, 2, 19),
            (1, 3, 20),
            (1, 8, 8),
            (2, 3, 25),
            (2, 4, 18),
            (3, 5, 18),
            (4, 5, 13),
            (4, 7, 7),
            (5, 6, 7),
        ];
        let mates = max_weight_matching(9, &edges).unwrap();
        assert_eq!(
            mates,
            vec![None, Some(8), Some(3), Some(2), Some(7), Some(6), Some(5), Some(4), Some(1)]
        );
        assert_eq!(weight(&mates, &edges), 8 + 25 + 7 + 7);
    }

    #[test]
    fn test_relabels_inner_blossom_on_expand() {
        let edges = [
            (1, 2, 45),
            (1, 5, 45),
            (2, 3, 50),
            (3, 4, 45),
            (4, 5, 50),
            (1, 6, 30),
            (3, 9, 35),
            (4, 8, 35),
            (5, 7, 26),
            (9, 10, 5),
        ];
        let mates = max_weight_matching(11, &edges).unwrap();
        assert_eq!(
            mates,
            vec![
                None,
                Some(6),
                Some(3),
                Some(2),
                Some(8),
                Some(7),
                Some(1),
                Some(5),
                Some(4),
                Some(10),
                Some(9)
            ]
        );
    }

    #[test]
    fn test_rejects_self_loop() {
        assert!(max_weight_matching(2, &[(1, 1, 3)]).is_err());
        assert!(max_weight_matching(2, &[(0, 2, 3)]).is_err());
    }
}
