use super::{backbone::BackboneBuilder, candidates::CandidateIndex};
use broadcast_challenges::station_network::{covers, required_strength};
use rand::Rng;
use std::{cmp::Reverse, time::Instant};

const UNASSIGNED: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: u64,
    pub improvements: u64,
    pub best_cost: i64,
}

/// Station strengths plus the station each resident counts on.
///
/// Phases run in order: `greedy_assign`, `shrink`, `local_search`. Every
/// resident is covered by its assigned station after each phase, and each
/// station is at least as strong as its farthest assigned resident requires.
pub struct StrengthOptimizer<'a> {
    index: &'a CandidateIndex,
    strengths: Vec<i64>,
    assignment: Vec<usize>,
    // Stations covering each resident, kept current through `shrink` only
    coverage: Vec<u32>,
    best_strengths: Vec<i64>,
}

impl<'a> StrengthOptimizer<'a> {
    pub fn new(index: &'a CandidateIndex) -> Self {
        let num_stations = index.station_residents.len();
        let num_residents = index.num_residents();
        Self {
            index,
            strengths: vec![0; num_stations],
            assignment: vec![UNASSIGNED; num_residents],
            coverage: vec![0; num_residents],
            best_strengths: vec![0; num_stations],
        }
    }

    pub fn strengths(&self) -> &[i64] {
        &self.strengths
    }

    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    pub fn coverage(&self) -> &[u32] {
        &self.coverage
    }

    /// Lowest-cost strengths seen by `local_search`.
    pub fn best_strengths(&self) -> &[i64] {
        &self.best_strengths
    }

    pub fn strength_cost(&self) -> i64 {
        self.strengths.iter().map(|p| p * p).sum()
    }

    /// Each resident in turn takes the candidate whose radius is cheapest to
    /// extend to it; the nearest candidate wins ties.
    pub fn greedy_assign(&mut self) {
        let index = self.index;
        for (r, matchings) in index.resident_matchings.iter().enumerate() {
            let mut best: Option<(i64, usize, i64)> = None;
            for m in matchings {
                let radius = self.strengths[m.station];
                let extension = (required_strength(m.dist2) - radius).max(0);
                let marginal = (2 * radius + extension) * extension;
                if best.map_or(true, |(best_marginal, _, _)| marginal < best_marginal) {
                    best = Some((marginal, m.station, extension));
                }
            }
            if let Some((marginal, station, extension)) = best {
                if marginal > 0 {
                    self.strengths[station] += extension;
                }
                self.assignment[r] = station;
            }
        }
    }

    /// Coverage counts computed from scratch.
    pub fn recount_coverage(&self) -> Vec<u32> {
        let mut coverage = vec![0; self.assignment.len()];
        for (s, residents) in self.index.station_residents.iter().enumerate() {
            let strength = self.strengths[s];
            for &(r, _) in residents
                .iter()
                .take_while(|&&(_, d2)| covers(strength, d2))
            {
                coverage[r] += 1;
            }
        }
        coverage
    }

    /// One pass over the stations from strongest to weakest, shrinking each
    /// to its farthest uniquely covered resident.
    pub fn shrink(&mut self) {
        self.refresh_coverage();
        for s in self.shrink_order() {
            self.shrink_station(s);
        }
        self.assign_nearest_cover();
    }

    pub fn refresh_coverage(&mut self) {
        self.coverage = self.recount_coverage();
    }

    /// Stations by descending strength, ties by index.
    pub fn shrink_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.strengths.len()).collect();
        order.sort_by_key(|&s| Reverse(self.strengths[s]));
        order
    }

    pub fn shrink_station(&mut self, station: usize) {
        let old = self.strengths[station];
        if old == 0 {
            return;
        }
        let index = self.index;
        let residents = &index.station_residents[station];
        let farthest_unique = residents
            .iter()
            .take_while(|&&(_, d2)| covers(old, d2))
            .filter(|&&(r, _)| self.coverage[r] == 1)
            .map(|&(_, d2)| d2)
            .last();
        let new = farthest_unique.map_or(0, required_strength);
        for &(r, d2) in residents.iter().take_while(|&&(_, d2)| covers(old, d2)) {
            if !covers(new, d2) {
                self.coverage[r] -= 1;
            }
        }
        self.strengths[station] = new;
    }

    /// Points every resident at its nearest covering station.
    pub fn assign_nearest_cover(&mut self) {
        let index = self.index;
        for (r, matchings) in index.resident_matchings.iter().enumerate() {
            if let Some(m) = matchings
                .iter()
                .find(|m| covers(self.strengths[m.station], m.dist2))
            {
                self.assignment[r] = m.station;
            }
        }
    }

    /// Strength needed by the residents currently assigned to `station`.
    fn assigned_requirement(&self, station: usize) -> i64 {
        self.index.station_residents[station]
            .iter()
            .rev()
            .find(|&&(r, _)| self.assignment[r] == station)
            .map_or(0, |&(_, d2)| required_strength(d2))
    }

    /// Random walk over single-resident reassignments until `deadline` or
    /// `max_iterations`. Moves are never rolled back; strictly cheaper states
    /// are snapshotted into `best_strengths`.
    pub fn local_search<R: Rng>(
        &mut self,
        rng: &mut R,
        backbone: &BackboneBuilder,
        deadline: Instant,
        max_iterations: Option<u64>,
    ) -> SearchStats {
        let index = self.index;
        let num_residents = index.num_residents();
        let mut strength_cost = self.strength_cost();
        let mut edge_cost = backbone.pruned_cost(&self.strengths);
        let mut best_cost = strength_cost + edge_cost;
        self.best_strengths.clone_from(&self.strengths);

        let mut stats = SearchStats {
            iterations: 0,
            improvements: 0,
            best_cost,
        };
        if num_residents == 0 {
            return stats;
        }

        while max_iterations.map_or(true, |max| stats.iterations < max)
            && Instant::now() < deadline
        {
            stats.iterations += 1;
            let r = rng.gen_range(0..num_residents);
            let matchings = &index.resident_matchings[r];
            if matchings.len() < 2 {
                continue;
            }
            let candidate = matchings[rng.gen_range(0..matchings.len())];
            let old_station = self.assignment[r];
            if candidate.station == old_station {
                continue;
            }

            let old_before = self.strengths[old_station];
            let new_before = self.strengths[candidate.station];
            self.assignment[r] = candidate.station;
            let old_after = self.assigned_requirement(old_station);
            let new_after = new_before.max(required_strength(candidate.dist2));
            self.strengths[old_station] = old_after;
            self.strengths[candidate.station] = new_after;

            strength_cost += old_after * old_after - old_before * old_before;
            strength_cost += new_after * new_after - new_before * new_before;
            // the backbone only depends on which stations are on
            if (old_before > 0) != (old_after > 0) || (new_before > 0) != (new_after > 0) {
                edge_cost = backbone.pruned_cost(&self.strengths);
            }

            let cost = strength_cost + edge_cost;
            if cost < best_cost {
                best_cost = cost;
                stats.improvements += 1;
                self.best_strengths.clone_from(&self.strengths);
            }
        }

        stats.best_cost = best_cost;
        stats
    }
}
