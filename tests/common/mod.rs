//! Shared helpers for integration tests.
//!
//! `FakeGrid` maps a sample to the cell numbered by its integer longitude and
//! answers corridor queries from an explicit table, so tests control exactly
//! which corridors exist.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use hextrail::{
    CellId, CellSequenceRecord, CorridorLookupError, GridError, Sample, SpatialGridIndex,
    TaskFields, Trajectory,
};

#[derive(Default)]
pub struct FakeGrid {
    corridors: HashMap<(u64, u64), Vec<u64>>,
    /// Answer unknown pairs with the straight run of ids between them
    linear: bool,
    /// Pairs whose lookup fails with a grid error instead of unreachability
    broken: Vec<(u64, u64)>,
}

impl FakeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linear() -> Self {
        Self {
            linear: true,
            ..Self::default()
        }
    }

    pub fn with_corridor(mut self, from: u64, to: u64, path: &[u64]) -> Self {
        self.corridors.insert((from, to), path.to_vec());
        self
    }

    pub fn with_broken_pair(mut self, from: u64, to: u64) -> Self {
        self.broken.push((from, to));
        self
    }
}

impl SpatialGridIndex for FakeGrid {
    fn cell_for(&self, sample: &Sample, _resolution: u8) -> Result<CellId, GridError> {
        if !sample.is_valid() || sample.longitude < 0.0 {
            return Err(GridError::InvalidCoordinate {
                latitude: sample.latitude,
                longitude: sample.longitude,
            });
        }
        Ok(CellId(sample.longitude.floor() as u64))
    }

    fn corridor(&self, from: CellId, to: CellId) -> Result<Vec<CellId>, CorridorLookupError> {
        if self.broken.contains(&(from.0, to.0)) {
            return Err(GridError::InvalidCell(from.0).into());
        }
        if let Some(path) = self.corridors.get(&(from.0, to.0)) {
            return Ok(path.iter().copied().map(CellId).collect());
        }
        if self.linear {
            let path: Vec<u64> = if from.0 <= to.0 {
                (from.0..=to.0).collect()
            } else {
                (to.0..=from.0).rev().collect()
            };
            return Ok(path.into_iter().map(CellId).collect());
        }
        Err(CorridorLookupError::Unreachable {
            from: from.0,
            to: to.0,
            reason: "no corridor in table".to_string(),
        })
    }
}

pub fn cells(ids: &[u64]) -> Vec<CellId> {
    ids.iter().copied().map(CellId).collect()
}

/// Samples at the given longitudes (latitude 0), with per-sample speeds and timestamps.
pub fn samples(lons: &[f64], speeds: &[f64], timestamps: &[i64]) -> Vec<Sample> {
    lons.iter()
        .zip(speeds)
        .zip(timestamps)
        .map(|((&lon, &speed), &ts)| Sample::new(lon, 0.0, speed, ts))
        .collect()
}

/// A trajectory along latitude 0 through the given longitudes, sampled every 10 seconds.
pub fn trajectory(id: &str, lons: &[f64]) -> Trajectory {
    let speeds: Vec<f64> = (0..lons.len()).map(|i| 10.0 + i as f64).collect();
    let timestamps: Vec<i64> = (0..lons.len()).map(|i| 1_000 + i as i64 * 10).collect();
    Trajectory::new(id, samples(lons, &speeds, &timestamps), BTreeMap::new()).unwrap()
}

/// A raw record whose geometry is a straight segment of the given planar length.
pub fn record_with_length(id: &str, length: f64) -> CellSequenceRecord {
    CellSequenceRecord {
        trip_id: id.to_string(),
        task: TaskFields::Raw {
            h3_sequence: cells(&[1, 2]),
        },
        avg_speed_per_hex: vec![1.0, 1.0],
        timestamp_per_hex: vec![0, 0],
        attributes: BTreeMap::new(),
        geometry: vec![(0.0, 0.0), (length, 0.0)].into(),
    }
}

pub fn assert_no_consecutive_repeats(sequence: &[CellId]) {
    for pair in sequence.windows(2) {
        assert_ne!(pair[0], pair[1], "consecutive repeat in {:?}", sequence);
    }
}
