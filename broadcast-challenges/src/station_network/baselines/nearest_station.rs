use crate::station_network::{required_strength, Challenge, Solution, P_MAX};
use crate::UnionFind;
use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

pub fn solve_challenge(
    challenge: &Challenge,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    _hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let n = challenge.stations.len();
    let mut solution = Solution::new(n, challenge.edges.len());

    // Every resident counts on its nearest station
    for (r, resident) in challenge.residents.iter().enumerate() {
        let (station, d2) = challenge
            .stations
            .iter()
            .enumerate()
            .map(|(s, p)| (s, p.dist2(resident)))
            .min_by_key(|&(s, d2)| (d2, s))
            .ok_or_else(|| anyhow!("Instance has no stations"))?;
        if d2 > P_MAX * P_MAX {
            return Err(anyhow!("Resident {} has no station within {}", r, P_MAX));
        }
        let strength = &mut solution.station_strengths[station];
        *strength = (*strength).max(required_strength(d2));
    }

    // Unpruned spanning tree over every station
    let mut order: Vec<usize> = (0..challenge.edges.len()).collect();
    order.sort_by_key(|&e| challenge.edges[e].weight);
    let mut uf = UnionFind::new(n);
    let mut num_tree_edges = 0;
    for e in order {
        let edge = &challenge.edges[e];
        if uf.union(edge.a, edge.b) {
            solution.edge_activations[e] = true;
            num_tree_edges += 1;
        }
    }
    if num_tree_edges + 1 != n {
        return Err(anyhow!("Station graph is disconnected"));
    }

    save_solution(&solution)
}
