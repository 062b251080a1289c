//! Grouping of raw point rows into trajectories.
//!
//! Rows are grouped by trip id (in order of first appearance), points with
//! invalid coordinates are discarded, and each trip's samples are ordered by
//! timestamp. Categorical attributes are taken from the trip's earliest point.

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{Sample, Trajectory};

/// One row of the raw point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub trip_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub speed: f64,
    /// Unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// Categorical columns (call_type, day_type, taxi_id, ...)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl RawPoint {
    fn sample(&self) -> Sample {
        Sample::new(self.longitude, self.latitude, self.speed, self.timestamp)
    }
}

/// Group raw points into time-ordered trajectories.
///
/// Trips left without any valid point are skipped.
pub fn normalize_points(points: Vec<RawPoint>) -> Vec<Trajectory> {
    let total_points = points.len();
    let mut order: Vec<String> = Vec::new();
    let mut by_trip: HashMap<String, Vec<RawPoint>> = HashMap::new();
    let mut invalid = 0usize;

    for point in points {
        if !point.sample().is_valid() {
            invalid += 1;
            continue;
        }
        by_trip
            .entry(point.trip_id.clone())
            .or_insert_with(|| {
                order.push(point.trip_id.clone());
                Vec::new()
            })
            .push(point);
    }

    if invalid > 0 {
        warn!(
            "[Normalize] Discarded {} of {} points with invalid coordinates",
            invalid, total_points
        );
    }

    let trajectories: Vec<Trajectory> = order
        .into_iter()
        .filter_map(|trip_id| {
            let mut rows = by_trip.remove(&trip_id)?;
            // Stable: rows sharing a timestamp keep their input order
            rows.sort_by_key(|row| row.timestamp);

            let attributes = rows.first()?.attributes.clone();
            let samples = rows.iter().map(RawPoint::sample).collect();
            Trajectory::new(trip_id, samples, attributes).ok()
        })
        .collect();

    info!(
        "[Normalize] Grouped {} points into {} trajectories",
        total_points,
        trajectories.len()
    );

    trajectories
}
