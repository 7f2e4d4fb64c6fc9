use broadcast_challenges::station_network::{
    calc_cost, ceil_sqrt, covers, required_strength, Challenge, Edge, Point, Solution, Track,
    P_MAX,
};

const SMALL_INSTANCE: &str = "3 3 4
0 0
1000 0
0 1000
1 2 700
2 3 1500
1 3 900
10 0
990 0
0 1300
0 -20
";

#[test]
fn test_ceil_sqrt() {
    assert_eq!(ceil_sqrt(0), 0);
    assert_eq!(ceil_sqrt(1), 1);
    assert_eq!(ceil_sqrt(2), 2);
    assert_eq!(ceil_sqrt(25), 5);
    assert_eq!(ceil_sqrt(26), 6);
    assert_eq!(ceil_sqrt(P_MAX * P_MAX), P_MAX);
    assert_eq!(ceil_sqrt(P_MAX * P_MAX + 1), P_MAX + 1);
    let far = Point::new(-10_000, -10_000).dist2(&Point::new(10_000, 10_000));
    assert_eq!(far, 800_000_000);
    assert_eq!(ceil_sqrt(far), 28285);
}

#[test]
fn test_strength_and_coverage() {
    assert_eq!(required_strength(0), 1);
    assert_eq!(required_strength(25), 5);
    assert!(covers(5, 25));
    assert!(!covers(5, 26));
    assert!(!covers(0, 0));
    assert!(covers(1, 0));
}

#[test]
fn test_from_text() {
    let challenge = Challenge::from_text(SMALL_INSTANCE, [7; 32]).unwrap();
    assert_eq!(challenge.seed, [7; 32]);
    assert_eq!(challenge.stations.len(), 3);
    assert_eq!(challenge.stations[1], Point::new(1000, 0));
    assert_eq!(
        challenge.edges[1],
        Edge {
            a: 1,
            b: 2,
            weight: 1500
        }
    );
    assert_eq!(challenge.residents.len(), 4);
    assert_eq!(challenge.residents[3], Point::new(0, -20));

    let reparsed = Challenge::from_text(&challenge.to_text(), [7; 32]).unwrap();
    assert_eq!(reparsed.stations, challenge.stations);
    assert_eq!(reparsed.edges, challenge.edges);
    assert_eq!(reparsed.residents, challenge.residents);
}

#[test]
fn test_from_text_rejects_malformed_input() {
    assert!(Challenge::from_text("2 1 0\n0 0\n1 1\n1 3 5\n", [0; 32]).is_err());
    assert!(Challenge::from_text("2 1 0\n0 0\n1 1\n1 2 -5\n", [0; 32]).is_err());
    assert!(Challenge::from_text("2 1 1\n0 0\n1 1\n1 2 5\n", [0; 32]).is_err());
    assert!(Challenge::from_text("101 0 0\n", [0; 32]).is_err());
    assert!(Challenge::from_text("0 0 0\n", [0; 32]).is_err());
    assert!(Challenge::from_text("1 0 1\n0 0\nx 1\n", [0; 32]).is_err());
    assert!(Challenge::from_text("1 0 1\n-2000000000 0\n2000000000 0\n", [0; 32]).is_err());
    assert!(Challenge::from_text("1 0 0\n10001 0\n", [0; 32]).is_err());
    assert!(Challenge::from_text("1 0 1\n-10000 10000\n10000 -10000\n", [0; 32]).is_ok());
}

#[test]
fn test_solution_output_format() {
    let solution = Solution {
        station_strengths: vec![20, 10, 0],
        edge_activations: vec![true, false, false],
    };
    assert_eq!(solution.to_output_string(), "20 10 0\n1 0 0\n");
    assert_eq!(
        Solution::from_output_text("20 10 0\n1 0 0\n", 3, 3).unwrap(),
        solution
    );
    assert!(Solution::from_output_text("20 10 0\n1 2 0\n", 3, 3).is_err());
    assert!(Solution::from_output_text("20 10\n", 3, 3).is_err());
    assert!(Solution::from_output_text("20 10 0\n1 0 0 1\n", 3, 3).is_err());
}

#[test]
fn test_evaluate_cost() {
    let challenge = Challenge::from_text(SMALL_INSTANCE, [0; 32]).unwrap();
    let solution = Solution {
        station_strengths: vec![20, 10, 300],
        edge_activations: vec![true, false, true],
    };
    assert_eq!(challenge.evaluate_cost(&solution).unwrap(), 400 + 100 + 90_000 + 700 + 900);
    assert_eq!(calc_cost(&challenge.edges, &solution), 92_100);
}

#[test]
fn test_evaluate_cost_rejects_invalid_solutions() {
    let challenge = Challenge::from_text(SMALL_INSTANCE, [0; 32]).unwrap();

    let uncovered = Solution {
        station_strengths: vec![19, 10, 300],
        edge_activations: vec![true, false, true],
    };
    assert!(challenge.evaluate_cost(&uncovered).is_err());

    let disconnected = Solution {
        station_strengths: vec![20, 10, 300],
        edge_activations: vec![true, false, false],
    };
    assert!(challenge.evaluate_cost(&disconnected).is_err());

    let too_strong = Solution {
        station_strengths: vec![P_MAX + 1, 10, 300],
        edge_activations: vec![true, false, true],
    };
    assert!(challenge.evaluate_cost(&too_strong).is_err());

    let wrong_length = Solution::new(2, 3);
    assert!(challenge.evaluate_cost(&wrong_length).is_err());
}

#[test]
fn test_greedy_baseline_is_valid() {
    let challenge = Challenge::from_text(SMALL_INSTANCE, [0; 32]).unwrap();
    let baseline = challenge.compute_greedy_baseline().unwrap();
    assert_eq!(baseline.station_strengths, vec![20, 10, 300]);
    assert_eq!(baseline.edge_activations, vec![true, false, true]);
    assert_eq!(challenge.evaluate_solution(&baseline).unwrap(), 0);
}

#[test]
fn test_evaluate_solution_penalizes_costlier_solutions() {
    let challenge = Challenge::from_text(SMALL_INSTANCE, [0; 32]).unwrap();
    let single_station = Solution {
        station_strengths: vec![1301, 0, 0],
        edge_activations: vec![false, false, false],
    };
    let cost = challenge.evaluate_cost(&single_station).unwrap();
    assert_eq!(cost, 1301 * 1301);
    assert!(challenge.evaluate_solution(&single_station).unwrap() < 0);
}

#[test]
fn test_generate_instance() {
    let track = Track {
        num_stations: 30,
        num_edges: 60,
        num_residents: 500,
    };
    let seed = [3; 32];
    let challenge = Challenge::generate_instance(&seed, &track).unwrap();
    assert_eq!(challenge.stations.len(), 30);
    assert_eq!(challenge.edges.len(), 60);
    assert_eq!(challenge.residents.len(), 500);
    for resident in &challenge.residents {
        assert!(challenge
            .stations
            .iter()
            .any(|s| s.dist2(resident) <= P_MAX * P_MAX));
    }
    for edge in &challenge.edges {
        assert!(edge.a < edge.b);
        assert!(edge.weight >= 1);
    }
    assert!(challenge.compute_greedy_baseline().is_ok());

    let again = Challenge::generate_instance(&seed, &track).unwrap();
    assert_eq!(again.stations, challenge.stations);
    assert_eq!(again.edges, challenge.edges);
    assert_eq!(again.residents, challenge.residents);
}

#[test]
fn test_generate_instance_rejects_bad_tracks() {
    let seed = [0; 32];
    let too_few_edges = Track {
        num_stations: 10,
        num_edges: 8,
        num_residents: 10,
    };
    assert!(Challenge::generate_instance(&seed, &too_few_edges).is_err());
    let too_many_edges = Track {
        num_stations: 4,
        num_edges: 7,
        num_residents: 10,
    };
    assert!(Challenge::generate_instance(&seed, &too_many_edges).is_err());
    let no_stations = Track {
        num_stations: 0,
        num_edges: 0,
        num_residents: 0,
    };
    assert!(Challenge::generate_instance(&seed, &no_stations).is_err());
}
