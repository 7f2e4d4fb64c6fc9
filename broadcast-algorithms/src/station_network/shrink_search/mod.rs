//! Greedy radius assignment, shrink refinement and a time-boxed random walk
//! over resident reassignments, finished with a pruned spanning-tree backbone.

use anyhow::{anyhow, Result};
use broadcast_challenges::station_network::*;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

pub mod backbone;
pub mod candidates;
pub mod optimizer;

pub use backbone::BackboneBuilder;
pub use candidates::{CandidateIndex, Matching};
pub use optimizer::{SearchStats, StrengthOptimizer};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Hyperparameters {
    pub time_limit_ms: u64,
    pub max_iterations: Option<u64>,
    pub verbose: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            time_limit_ms: 1500,
            max_iterations: None,
            verbose: false,
        }
    }
}

impl Hyperparameters {
    pub fn from_map(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        match hyperparameters {
            Some(hyperparameters) => {
                serde_json::from_value::<Hyperparameters>(Value::Object(hyperparameters.clone()))
                    .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))
            }
            None => Ok(Hyperparameters::default()),
        }
    }
}

pub fn help() {
    println!("Greedy station radii, shrunk to uniquely covered residents, then improved by");
    println!("random resident reassignments until the time limit.");
    println!("Hyperparameters:");
    println!("  time_limit_ms: wall-clock budget of the random search (default: 1500)");
    println!("  max_iterations: optional cap on random search iterations (default: none)");
    println!("  verbose: print phase costs to stderr (default: false)");
}

pub fn solve_challenge(
    challenge: &Challenge,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let hyperparameters = Hyperparameters::from_map(hyperparameters)?;
    let start = Instant::now();
    let deadline = start + Duration::from_millis(hyperparameters.time_limit_ms);
    let mut rng = SmallRng::from_seed(challenge.seed);

    let index = CandidateIndex::build(challenge)?;
    let backbone = BackboneBuilder::new(challenge);
    let mut optimizer = StrengthOptimizer::new(&index);

    optimizer.greedy_assign();
    if hyperparameters.verbose {
        eprintln!(
            "[{:.3}] greedy_assign: strength cost {}",
            start.elapsed().as_secs_f64(),
            optimizer.strength_cost()
        );
    }

    optimizer.shrink();
    let shrunk = Solution {
        station_strengths: optimizer.strengths().to_vec(),
        edge_activations: backbone.build(optimizer.strengths()),
    };
    if hyperparameters.verbose {
        eprintln!(
            "[{:.3}] shrink: cost {}",
            start.elapsed().as_secs_f64(),
            calc_cost(&challenge.edges, &shrunk)
        );
    }
    save_solution(&shrunk)?;

    let stats = optimizer.local_search(
        &mut rng,
        &backbone,
        deadline,
        hyperparameters.max_iterations,
    );
    let searched = Solution {
        station_strengths: optimizer.best_strengths().to_vec(),
        edge_activations: backbone.build(optimizer.best_strengths()),
    };
    // the search scores candidates by the pruned tree alone, so a Prim
    // backbone found after shrinking can still be the cheaper answer
    let solution = if calc_cost(&challenge.edges, &searched)
        <= calc_cost(&challenge.edges, &shrunk)
    {
        searched
    } else {
        shrunk
    };
    if hyperparameters.verbose {
        eprintln!(
            "[{:.3}] local_search: iterations {}, improvements {}, cost {}",
            start.elapsed().as_secs_f64(),
            stats.iterations,
            stats.improvements,
            calc_cost(&challenge.edges, &solution)
        );
    }
    save_solution(&solution)
}
