use anyhow::{anyhow, Result};
use broadcast_algorithms::station_network;
use broadcast_challenges::station_network::{Challenge, Solution, Track};
use clap::{arg, Command};
use serde_json::{Map, Value};
use std::{cell::RefCell, fs, io::Read, path::PathBuf};

fn cli() -> Command {
    Command::new("broadcast-runtime")
        .about("Computes, verifies or generates station network instances")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compute_solution")
                .about("Computes station strengths and edge activations for an instance")
                .arg(
                    arg!([INPUT] "Path to the instance file, or '-' for stdin")
                        .default_value("-")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for the random search")
                        .default_value("0")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the solution will also be saved to this file path as json")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("verify_solution")
                .about("Verifies a solution and reports its cost")
                .arg(
                    arg!(<INPUT> "Path to the instance file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Path to the solution file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate_instance")
                .about("Generates a random instance")
                .arg(arg!(<SEED> "Seed value").value_parser(clap::value_parser!(u64)))
                .arg(
                    arg!(--stations [STATIONS] "Number of stations")
                        .default_value("100")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--edges [EDGES] "Number of edges")
                        .default_value("300")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--residents [RESIDENTS] "Number of residents")
                        .default_value("5000")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("compute_solution", sub_m)) => compute_solution(
            sub_m.get_one::<String>("INPUT").unwrap().clone(),
            sub_m.get_one::<String>("hyperparameters").cloned(),
            *sub_m.get_one::<u64>("seed").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        Some(("verify_solution", sub_m)) => verify_solution(
            sub_m.get_one::<String>("INPUT").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
        ),
        Some(("generate_instance", sub_m)) => generate_instance(
            *sub_m.get_one::<u64>("SEED").unwrap(),
            Track {
                num_stations: *sub_m.get_one::<usize>("stations").unwrap(),
                num_edges: *sub_m.get_one::<usize>("edges").unwrap(),
                num_residents: *sub_m.get_one::<usize>("residents").unwrap(),
            },
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn compute_solution(
    input: String,
    hyperparameters: Option<String>,
    seed: u64,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let challenge = Challenge::from_text(&read_input(&input)?, seed_bytes(seed))?;
    let hyperparameters = hyperparameters
        .map(|h| load_hyperparameters(&h))
        .transpose()?;

    let solution = RefCell::new(None);
    let save_solution_fn = |s: &Solution| -> Result<()> {
        *solution.borrow_mut() = Some(s.clone());
        Ok(())
    };
    station_network::solve_challenge(&challenge, &save_solution_fn, &hyperparameters)?;
    let solution = solution
        .into_inner()
        .ok_or_else(|| anyhow!("Algorithm did not save a solution"))?;

    if let Some(path) = output_file {
        fs::write(&path, serde_json::to_string(&solution)?)
            .map_err(|e| anyhow!("Failed to write output file {}: {}", path.display(), e))?;
    }
    print!("{}", solution.to_output_string());
    Ok(())
}

pub fn verify_solution(input: String, solution: String) -> Result<()> {
    let challenge = Challenge::from_text(&read_input(&input)?, [0; 32])?;
    let solution = Solution::from_output_text(
        &read_input(&solution)?,
        challenge.num_stations(),
        challenge.edges.len(),
    )?;
    let cost = challenge
        .evaluate_cost(&solution)
        .map_err(|e| anyhow!("Invalid solution: {}", e))?;
    let quality = challenge.evaluate_solution(&solution)?;
    println!("Solution is valid");
    println!("Cost: {}", cost);
    println!("Quality: {}", quality);
    Ok(())
}

pub fn generate_instance(seed: u64, track: Track) -> Result<()> {
    let challenge = Challenge::generate_instance(&seed_bytes(seed), &track)?;
    print!("{}", challenge.to_text());
    Ok(())
}

fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    bytes
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).map_err(|e| anyhow!("Failed to read file {}: {}", path, e))
    }
}

fn load_hyperparameters(hyperparameters: &str) -> Result<Map<String, Value>> {
    let hyperparameters = if hyperparameters.ends_with(".json") {
        fs::read_to_string(hyperparameters)
            .map_err(|e| anyhow!("Failed to read hyperparameters file: {}", e))?
    } else {
        hyperparameters.to_string()
    };

    serde_json::from_str::<Map<String, Value>>(&hyperparameters)
        .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))
}
