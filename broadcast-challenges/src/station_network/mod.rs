use crate::{UnionFind, QUALITY_PRECISION};
mod baselines;
use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::HashSet, fmt::Write, str::FromStr};

/// Upper bound on the number of stations.
pub const N: usize = 100;
pub const M_MAX: usize = 300;
pub const K_MAX: usize = 5000;
/// Largest radius a station may broadcast with.
pub const P_MAX: i64 = 5000;

const COORD_LIMIT: i32 = 10_000;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn dist2(&self, other: &Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

/// Smallest `r >= 0` with `r * r >= d2`.
pub fn ceil_sqrt(d2: i64) -> i64 {
    if d2 <= 0 {
        return 0;
    }
    let mut r = (d2 as f64).sqrt().ceil() as i64;
    while r * r < d2 {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= d2 {
        r -= 1;
    }
    r
}

/// Smallest nonzero strength whose radius reaches squared distance `d2`.
pub fn required_strength(d2: i64) -> i64 {
    ceil_sqrt(d2).max(1)
}

/// A station with zero strength is switched off and covers nobody, not even
/// a resident standing on it.
pub fn covers(strength: i64, d2: i64) -> bool {
    strength > 0 && d2 <= strength * strength
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: i64,
}

impl Edge {
    pub fn other(&self, v: usize) -> usize {
        if self.a == v {
            self.b
        } else {
            self.a
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct Track {
    pub num_stations: usize,
    pub num_edges: usize,
    pub num_residents: usize,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            num_stations: N,
            num_edges: M_MAX,
            num_residents: K_MAX,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub station_strengths: Vec<i64>,
    pub edge_activations: Vec<bool>,
}

impl Solution {
    pub fn new(num_stations: usize, num_edges: usize) -> Self {
        Self {
            station_strengths: vec![0; num_stations],
            edge_activations: vec![false; num_edges],
        }
    }

    /// Two lines: station strengths, then edge activations as `0`/`1`.
    pub fn to_output_string(&self) -> String {
        let strengths = self
            .station_strengths
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let activations = self
            .edge_activations
            .iter()
            .map(|&on| if on { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}\n{}\n", strengths, activations)
    }

    pub fn from_output_text(text: &str, num_stations: usize, num_edges: usize) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let mut solution = Solution::new(num_stations, num_edges);
        for (i, strength) in solution.station_strengths.iter_mut().enumerate() {
            *strength = next_token(&mut tokens, || format!("strength of station {}", i))?;
        }
        for (i, on) in solution.edge_activations.iter_mut().enumerate() {
            *on = match next_token::<u8>(&mut tokens, || format!("activation of edge {}", i))? {
                0 => false,
                1 => true,
                v => return Err(anyhow!("Activation of edge {} must be 0 or 1, got {}", i, v)),
            };
        }
        if tokens.next().is_some() {
            return Err(anyhow!("Unexpected trailing tokens in solution"));
        }
        Ok(solution)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Challenge {
    pub seed: [u8; 32],
    pub stations: Vec<Point>,
    pub edges: Vec<Edge>,
    pub residents: Vec<Point>,
}

fn next_token<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: impl Fn() -> String,
) -> Result<T> {
    let token = tokens
        .next()
        .ok_or_else(|| anyhow!("Unexpected end of input while reading {}", what()))?;
    token
        .parse::<T>()
        .map_err(|_| anyhow!("Invalid token '{}' while reading {}", token, what()))
}

/// Reads an `x y` pair and checks it lies within `[-COORD_LIMIT, COORD_LIMIT]`.
fn read_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
    i: usize,
) -> Result<Point> {
    let x: i32 = next_token(tokens, || format!("x of {} {}", what, i))?;
    let y: i32 = next_token(tokens, || format!("y of {} {}", what, i))?;
    let range = -COORD_LIMIT..=COORD_LIMIT;
    if !range.contains(&x) || !range.contains(&y) {
        return Err(anyhow!(
            "{} {} at ({}, {}) is outside [{}, {}]",
            what,
            i,
            x,
            y,
            -COORD_LIMIT,
            COORD_LIMIT
        ));
    }
    Ok(Point { x, y })
}

impl Challenge {
    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    /// Parses `n m k`, then `n` station lines, `m` edge lines with 1-indexed
    /// endpoints and `k` resident lines.
    pub fn from_text(text: &str, seed: [u8; 32]) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let n: usize = next_token(&mut tokens, || "number of stations".to_string())?;
        let m: usize = next_token(&mut tokens, || "number of edges".to_string())?;
        let k: usize = next_token(&mut tokens, || "number of residents".to_string())?;
        if n == 0 || n > N {
            return Err(anyhow!("Number of stations ({}) must be in [1, {}]", n, N));
        }
        if m > M_MAX {
            return Err(anyhow!("Number of edges ({}) exceeds {}", m, M_MAX));
        }
        if k > K_MAX {
            return Err(anyhow!("Number of residents ({}) exceeds {}", k, K_MAX));
        }

        let stations = (0..n)
            .map(|i| read_point(&mut tokens, "station", i))
            .collect::<Result<Vec<_>>>()?;

        let mut edges = Vec::with_capacity(m);
        for i in 0..m {
            let a: usize = next_token(&mut tokens, || format!("endpoint a of edge {}", i))?;
            let b: usize = next_token(&mut tokens, || format!("endpoint b of edge {}", i))?;
            let weight: i64 = next_token(&mut tokens, || format!("weight of edge {}", i))?;
            if a == 0 || a > n || b == 0 || b > n {
                return Err(anyhow!(
                    "Edge {} has endpoint out of range ({}, {}), expected 1..={}",
                    i,
                    a,
                    b,
                    n
                ));
            }
            if weight < 0 {
                return Err(anyhow!("Edge {} has negative weight {}", i, weight));
            }
            edges.push(Edge {
                a: a - 1,
                b: b - 1,
                weight,
            });
        }

        let residents = (0..k)
            .map(|i| read_point(&mut tokens, "resident", i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            seed,
            stations,
            edges,
            residents,
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} {}",
            self.stations.len(),
            self.edges.len(),
            self.residents.len()
        );
        for s in &self.stations {
            let _ = writeln!(out, "{} {}", s.x, s.y);
        }
        for e in &self.edges {
            let _ = writeln!(out, "{} {} {}", e.a + 1, e.b + 1, e.weight);
        }
        for r in &self.residents {
            let _ = writeln!(out, "{} {}", r.x, r.y);
        }
        out
    }

    pub fn generate_instance(seed: &[u8; 32], track: &Track) -> Result<Self> {
        let num_stations = track.num_stations;
        if num_stations == 0 || num_stations > N {
            return Err(anyhow!(
                "Number of stations ({}) must be in [1, {}]",
                num_stations,
                N
            ));
        }
        let num_pairs = num_stations * (num_stations - 1) / 2;
        let max_edges = M_MAX.min(num_pairs);
        if track.num_edges + 1 < num_stations || track.num_edges > max_edges {
            return Err(anyhow!(
                "Number of edges ({}) must be in [{}, {}]",
                track.num_edges,
                num_stations - 1,
                max_edges
            ));
        }
        if track.num_residents > K_MAX {
            return Err(anyhow!(
                "Number of residents ({}) exceeds {}",
                track.num_residents,
                K_MAX
            ));
        }
        let mut rng = SmallRng::from_seed(*seed);

        let mut stations: Vec<Point> = Vec::with_capacity(num_stations);
        let mut stations_set: HashSet<Point> = HashSet::with_capacity(num_stations);
        while stations.len() < num_stations {
            let pos = Point::new(
                rng.gen_range(-COORD_LIMIT..=COORD_LIMIT),
                rng.gen_range(-COORD_LIMIT..=COORD_LIMIT),
            );
            if stations_set.insert(pos) {
                stations.push(pos);
            }
        }

        // Shortest pairs first: the Euclidean spanning tree keeps the graph
        // connected, the remaining budget goes to the next shortest pairs.
        let mut pairs: Vec<(i64, usize, usize)> = Vec::with_capacity(num_pairs);
        for a in 0..num_stations {
            for b in (a + 1)..num_stations {
                pairs.push((stations[a].dist2(&stations[b]), a, b));
            }
        }
        pairs.sort();
        let mut uf = UnionFind::new(num_stations);
        let mut chosen = vec![false; pairs.len()];
        let mut num_chosen = 0;
        for (i, &(_, a, b)) in pairs.iter().enumerate() {
            if uf.set_size(0) == num_stations {
                break;
            }
            if uf.union(a, b) {
                chosen[i] = true;
                num_chosen += 1;
            }
        }
        for flag in chosen.iter_mut() {
            if num_chosen >= track.num_edges {
                break;
            }
            if !*flag {
                *flag = true;
                num_chosen += 1;
            }
        }
        let mut edges: Vec<Edge> = pairs
            .iter()
            .zip(chosen.iter())
            .filter(|(_, &c)| c)
            .map(|(&(d2, a, b), _)| {
                let factor: f64 = rng.gen_range(1.0..=2.5);
                Edge {
                    a,
                    b,
                    weight: ((d2 as f64).sqrt() * factor).round().max(1.0) as i64,
                }
            })
            .collect();
        edges.sort_by_key(|e| (e.a, e.b));

        let max_d2 = P_MAX * P_MAX;
        let mut residents = Vec::with_capacity(track.num_residents);
        while residents.len() < track.num_residents {
            let pos = Point::new(
                rng.gen_range(-COORD_LIMIT..=COORD_LIMIT),
                rng.gen_range(-COORD_LIMIT..=COORD_LIMIT),
            );
            if stations.iter().any(|s| s.dist2(&pos) <= max_d2) {
                residents.push(pos);
            }
        }

        Ok(Self {
            seed: *seed,
            stations,
            edges,
            residents,
        })
    }

    /// Cost of a solution, or the first constraint it violates.
    pub fn evaluate_cost(&self, solution: &Solution) -> Result<i64> {
        let n = self.num_stations();
        if solution.station_strengths.len() != n {
            return Err(anyhow!(
                "Number of station strengths ({}) does not match number of stations ({})",
                solution.station_strengths.len(),
                n
            ));
        }
        if solution.edge_activations.len() != self.edges.len() {
            return Err(anyhow!(
                "Number of edge activations ({}) does not match number of edges ({})",
                solution.edge_activations.len(),
                self.edges.len()
            ));
        }
        if let Some((i, p)) = solution
            .station_strengths
            .iter()
            .enumerate()
            .find(|(_, &p)| p < 0 || p > P_MAX)
        {
            return Err(anyhow!(
                "Strength of station {} ({}) must be in [0, {}]",
                i,
                p,
                P_MAX
            ));
        }

        let mut uf = UnionFind::new(n);
        for (edge, _) in self
            .edges
            .iter()
            .zip(solution.edge_activations.iter())
            .filter(|(_, &on)| on)
        {
            uf.union(edge.a, edge.b);
        }
        for (i, &p) in solution.station_strengths.iter().enumerate() {
            if p > 0 && !uf.same(i, 0) {
                return Err(anyhow!(
                    "Station {} has nonzero strength but is not connected to station 0",
                    i
                ));
            }
        }

        for (r, resident) in self.residents.iter().enumerate() {
            let covered = self
                .stations
                .iter()
                .zip(solution.station_strengths.iter())
                .any(|(s, &p)| covers(p, s.dist2(resident)));
            if !covered {
                return Err(anyhow!("Resident {} is not covered by any station", r));
            }
        }

        Ok(calc_cost(&self.edges, solution))
    }

    pub fn compute_greedy_baseline(&self) -> Result<Solution> {
        let solution = RefCell::new(Solution::new(self.num_stations(), self.edges.len()));
        let save_solution_fn = |s: &Solution| -> Result<()> {
            *solution.borrow_mut() = s.clone();
            Ok(())
        };
        baselines::nearest_station::solve_challenge(self, &save_solution_fn, &None)?;
        Ok(solution.into_inner())
    }

    /// Quality relative to the greedy baseline: positive when cheaper.
    pub fn evaluate_solution(&self, solution: &Solution) -> Result<i32> {
        let cost = self.evaluate_cost(solution)?;
        let greedy_solution = self.compute_greedy_baseline()?;
        let greedy_cost = self.evaluate_cost(&greedy_solution)?;
        if greedy_cost == 0 {
            return Ok(0);
        }
        let quality = (greedy_cost as f64 - cost as f64) / greedy_cost as f64;
        let quality = quality.clamp(-10.0, 10.0) * QUALITY_PRECISION as f64;
        let quality = quality.round() as i32;
        Ok(quality)
    }
}

/// Sum of squared strengths plus the weight of every activated edge. Does not
/// check feasibility.
pub fn calc_cost(edges: &[Edge], solution: &Solution) -> i64 {
    let strength_cost: i64 = solution.station_strengths.iter().map(|p| p * p).sum();
    let edge_cost: i64 = edges
        .iter()
        .zip(solution.edge_activations.iter())
        .filter(|(_, &on)| on)
        .map(|(e, _)| e.weight)
        .sum();
    strength_cost + edge_cost
}
