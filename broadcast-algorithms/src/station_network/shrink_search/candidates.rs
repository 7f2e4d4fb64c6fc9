use anyhow::{anyhow, Result};
use broadcast_challenges::station_network::{Challenge, P_MAX};

#[derive(Debug, Clone, Copy)]
pub struct Matching {
    pub station: usize,
    pub dist2: i64,
}

/// Station/resident pairs within `P_MAX`, indexed from both sides.
#[derive(Debug, Clone)]
pub struct CandidateIndex {
    /// Per resident, stations in range by ascending distance.
    pub resident_matchings: Vec<Vec<Matching>>,
    /// Per station, `(resident, dist2)` in range by ascending `dist2`.
    pub station_residents: Vec<Vec<(usize, i64)>>,
}

impl CandidateIndex {
    pub fn build(challenge: &Challenge) -> Result<Self> {
        let max_d2 = P_MAX * P_MAX;
        let mut resident_matchings = Vec::with_capacity(challenge.residents.len());
        let mut station_residents = vec![Vec::new(); challenge.stations.len()];

        for (r, resident) in challenge.residents.iter().enumerate() {
            let mut matchings: Vec<Matching> = challenge
                .stations
                .iter()
                .enumerate()
                .filter_map(|(s, station)| {
                    let dist2 = station.dist2(resident);
                    (dist2 <= max_d2).then_some(Matching { station: s, dist2 })
                })
                .collect();
            if matchings.is_empty() {
                return Err(anyhow!(
                    "Resident {} at ({}, {}) has no station within {}",
                    r,
                    resident.x,
                    resident.y,
                    P_MAX
                ));
            }
            matchings.sort_by_key(|m| m.dist2);
            for m in &matchings {
                station_residents[m.station].push((r, m.dist2));
            }
            resident_matchings.push(matchings);
        }
        for residents in station_residents.iter_mut() {
            residents.sort_by_key(|&(_, dist2)| dist2);
        }

        Ok(Self {
            resident_matchings,
            station_residents,
        })
    }

    pub fn num_residents(&self) -> usize {
        self.resident_matchings.len()
    }
}
