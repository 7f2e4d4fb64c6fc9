use broadcast_challenges::{
    station_network::{Challenge, Edge},
    UnionFind,
};
use std::{cmp::Reverse, collections::BinaryHeap};

#[derive(Debug, Clone, Copy)]
struct Arc {
    to: usize,
    edge: usize,
    weight: i64,
}

/// Chooses which edges to activate so that every station with nonzero
/// strength is connected to station 0.
#[derive(Debug, Clone)]
pub struct BackboneBuilder {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Arc>>,
    spanning_tree: Vec<bool>,
}

impl BackboneBuilder {
    pub fn new(challenge: &Challenge) -> Self {
        let num_stations = challenge.stations.len();
        let edges = challenge.edges.clone();
        let mut adjacency = vec![Vec::new(); num_stations];
        for (i, e) in edges.iter().enumerate() {
            adjacency[e.a].push(Arc {
                to: e.b,
                edge: i,
                weight: e.weight,
            });
            adjacency[e.b].push(Arc {
                to: e.a,
                edge: i,
                weight: e.weight,
            });
        }

        // Kruskal; the stable sort keeps input order among equal weights
        let mut sorted_edges: Vec<usize> = (0..edges.len()).collect();
        sorted_edges.sort_by_key(|&e| edges[e].weight);
        let mut spanning_tree = vec![false; edges.len()];
        let mut uf = UnionFind::new(num_stations);
        for e in sorted_edges {
            spanning_tree[e] = uf.union(edges[e].a, edges[e].b);
        }

        Self {
            edges,
            adjacency,
            spanning_tree,
        }
    }

    /// Minimum spanning forest over all stations, regardless of strength.
    pub fn spanning_tree(&self) -> &[bool] {
        &self.spanning_tree
    }

    pub fn tree_weight(&self) -> i64 {
        self.activation_cost(&self.spanning_tree)
    }

    pub fn activation_cost(&self, activations: &[bool]) -> i64 {
        self.edges
            .iter()
            .zip(activations.iter())
            .filter(|(_, &on)| on)
            .map(|(e, _)| e.weight)
            .sum()
    }

    /// Spanning tree with every branch that leads to no active station cut off.
    pub fn kruskal(&self, strengths: &[i64]) -> Vec<bool> {
        let mut activations = self.spanning_tree.clone();
        self.prune(strengths, &mut activations);
        activations
    }

    pub fn pruned_cost(&self, strengths: &[i64]) -> i64 {
        self.activation_cost(&self.kruskal(strengths))
    }

    /// Prim from station 0 that only steps onto stations with nonzero
    /// strength. `None` if some active station cannot be reached that way.
    pub fn prim(&self, strengths: &[i64]) -> Option<Vec<bool>> {
        let mut activations = vec![false; self.edges.len()];
        if self.adjacency.is_empty() {
            return Some(activations);
        }
        let mut in_tree = vec![false; self.adjacency.len()];
        let mut heap = BinaryHeap::new();
        in_tree[0] = true;
        self.push_frontier(0, strengths, &in_tree, &mut heap);
        while let Some(Reverse((_, edge, v))) = heap.pop() {
            if in_tree[v] {
                continue;
            }
            in_tree[v] = true;
            activations[edge] = true;
            self.push_frontier(v, strengths, &in_tree, &mut heap);
        }
        strengths
            .iter()
            .zip(in_tree.iter())
            .all(|(&p, &reached)| p == 0 || reached)
            .then_some(activations)
    }

    fn push_frontier(
        &self,
        v: usize,
        strengths: &[i64],
        in_tree: &[bool],
        heap: &mut BinaryHeap<Reverse<(i64, usize, usize)>>,
    ) {
        for arc in &self.adjacency[v] {
            if strengths[arc.to] > 0 && !in_tree[arc.to] {
                heap.push(Reverse((arc.weight, arc.edge, arc.to)));
            }
        }
    }

    /// The cheaper of the pruned spanning tree and the active-only Prim tree.
    pub fn build(&self, strengths: &[i64]) -> Vec<bool> {
        let kruskal = self.kruskal(strengths);
        match self.prim(strengths) {
            Some(prim) if self.activation_cost(&prim) < self.activation_cost(&kruskal) => prim,
            _ => kruskal,
        }
    }

    /// Post-order walk from station 0 over active edges. A subtree is needed
    /// when it holds a station with nonzero strength; the parent edge of every
    /// other subtree is deactivated, as are edges the walk never reaches.
    fn prune(&self, strengths: &[i64], activations: &mut [bool]) {
        let n = self.adjacency.len();
        if n == 0 {
            return;
        }
        let mut parent_edge: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut stack = vec![0];
        visited[0] = true;
        while let Some(v) = stack.pop() {
            order.push(v);
            for arc in &self.adjacency[v] {
                if activations[arc.edge] && !visited[arc.to] {
                    visited[arc.to] = true;
                    parent_edge[arc.to] = Some(arc.edge);
                    stack.push(arc.to);
                }
            }
        }

        let mut needed: Vec<bool> = strengths.iter().map(|&p| p > 0).collect();
        for &v in order.iter().rev() {
            if let Some(e) = parent_edge[v] {
                if needed[v] {
                    needed[self.edges[e].other(v)] = true;
                } else {
                    activations[e] = false;
                }
            }
        }

        for (e, on) in activations.iter_mut().enumerate() {
            if *on && !visited[self.edges[e].a] {
                *on = false;
            }
        }
    }
}
