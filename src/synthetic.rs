//! Synthetic taxi trajectory generator for benchmarking and tests.
//!
//! Produces raw point rows shaped like the Porto taxi dataset: one sample every
//! 15 seconds, a per-sample speed, and the categorical trip columns. Some trips
//! are degenerate on purpose (a single GPS fix) so the filtering paths get
//! exercised.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use hextrail::synthetic::SyntheticScenario;
//!
//! let dataset = SyntheticScenario::porto_taxis(50).generate();
//! assert_eq!(dataset.metadata.trip_count, 50);
//! assert_eq!(dataset.trajectories().len(), 50);
//! ```

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::normalize::{RawPoint, normalize_points};
use crate::{Sample, Trajectory};

// ============================================================================
// Types
// ============================================================================

/// Scenario configuration for generating synthetic trips.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Origin of the area trips start around.
    pub origin: Sample,
    /// Number of trips to generate.
    pub trip_count: usize,
    /// Trip length range in meters.
    pub length_range_meters: (f64, f64),
    /// Cruising speed range in km/h.
    pub speed_range_kmh: (f64, f64),
    /// Seconds between consecutive samples.
    pub sample_interval_secs: i64,
    /// Fraction of trips made of a single GPS fix (0.0-1.0).
    pub single_fix_fraction: f64,
    /// GPS noise standard deviation in meters.
    pub gps_noise_sigma_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// Metadata about a generated dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    pub trip_count: usize,
    /// Total rows across all trips.
    pub total_points: usize,
    /// Trips generated as a single fix.
    pub single_fix_trips: usize,
}

/// A generated set of raw point rows.
pub struct SyntheticDataset {
    pub points: Vec<RawPoint>,
    pub metadata: DatasetMetadata,
}

impl SyntheticDataset {
    /// Group the rows into trajectories.
    pub fn trajectories(&self) -> Vec<Trajectory> {
        normalize_points(self.points.clone())
    }
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// Gaussian pair via Box-Muller.
fn gaussian_pair(rng: &mut StdRng) -> (f64, f64) {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let r = (-2.0 * u1.ln()).sqrt();
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

// ============================================================================
// Trip Generation
// ============================================================================

const CALL_TYPES: [&str; 3] = ["A", "B", "C"];

/// Porto taxi data starts on 2013-07-01.
const START_TIMESTAMP: i64 = 1_372_636_800;

fn trip_attributes(trip_idx: usize, rng: &mut StdRng) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    let call_type = CALL_TYPES[rng.gen_range(0..CALL_TYPES.len())];
    attributes.insert("call_type".to_string(), call_type.to_string());
    attributes.insert("day_type".to_string(), "A".to_string());
    attributes.insert(
        "taxi_id".to_string(),
        format!("{}", 20_000_000 + trip_idx % 450),
    );
    attributes
}

impl SyntheticScenario {
    fn generate_trip(&self, trip_idx: usize, rng: &mut StdRng) -> Vec<RawPoint> {
        let trip_id = format!("synth_{:05}", trip_idx);
        let attributes = trip_attributes(trip_idx, rng);
        let start_time = START_TIMESTAMP + rng.gen_range(0..86_400);

        // Scatter trip starts within ~3km of the origin
        let (dx, dy) = gaussian_pair(rng);
        let mut latitude = self.origin.latitude + meters_to_deg_lat(dy * 1_500.0);
        let mut longitude = self.origin.longitude + meters_to_deg_lng(dx * 1_500.0, latitude);

        let single_fix: f64 = rng.r#gen();
        let point_count = if single_fix < self.single_fix_fraction {
            1
        } else {
            let length = rng.gen_range(self.length_range_meters.0..self.length_range_meters.1);
            let avg_speed = (self.speed_range_kmh.0 + self.speed_range_kmh.1) / 2.0;
            let step = avg_speed / 3.6 * self.sample_interval_secs as f64;
            ((length / step).ceil() as usize).max(2)
        };

        let mut heading: f64 = rng.gen_range(0.0..(2.0 * PI));
        let mut points = Vec::with_capacity(point_count);

        for i in 0..point_count {
            let speed = rng.gen_range(self.speed_range_kmh.0..self.speed_range_kmh.1);
            let (nx, ny) = gaussian_pair(rng);

            points.push(RawPoint {
                trip_id: trip_id.clone(),
                longitude: longitude
                    + meters_to_deg_lng(nx * self.gps_noise_sigma_meters, latitude),
                latitude: latitude + meters_to_deg_lat(ny * self.gps_noise_sigma_meters),
                speed,
                timestamp: start_time + i as i64 * self.sample_interval_secs,
                attributes: attributes.clone(),
            });

            // City driving: frequent moderate turns
            heading += rng.gen_range(-0.4..0.4);
            let step = speed / 3.6 * self.sample_interval_secs as f64;
            latitude += meters_to_deg_lat(step * heading.sin());
            longitude += meters_to_deg_lng(step * heading.cos(), latitude);
        }

        points
    }

    /// Generate the rows for this scenario.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::new();
        let mut single_fix_trips = 0;

        for trip_idx in 0..self.trip_count {
            let trip = self.generate_trip(trip_idx, &mut rng);
            if trip.len() == 1 {
                single_fix_trips += 1;
            }
            points.extend(trip);
        }

        SyntheticDataset {
            metadata: DatasetMetadata {
                trip_count: self.trip_count,
                total_points: points.len(),
                single_fix_trips,
            },
            points,
        }
    }
}

// ============================================================================
// Predefined Scenarios
// ============================================================================

/// Porto city centre.
const PORTO: Sample = Sample {
    longitude: -8.6109,
    latitude: 41.1496,
    speed: 0.0,
    timestamp: START_TIMESTAMP,
};

impl SyntheticScenario {
    /// City taxi trips of 1-8km around Porto, 5% single-fix trips.
    pub fn porto_taxis(trip_count: usize) -> Self {
        Self {
            origin: PORTO,
            trip_count,
            length_range_meters: (1_000.0, 8_000.0),
            speed_range_kmh: (10.0, 50.0),
            sample_interval_secs: 15,
            single_fix_fraction: 0.05,
            gps_noise_sigma_meters: 4.0,
            seed: trip_count as u64 * 7919,
        }
    }

    /// Long suburban trips with sparse sampling, so consecutive samples
    /// usually skip several cells.
    pub fn sparse_highway(trip_count: usize) -> Self {
        Self {
            origin: PORTO,
            trip_count,
            length_range_meters: (10_000.0, 40_000.0),
            speed_range_kmh: (60.0, 110.0),
            sample_interval_secs: 60,
            single_fix_fraction: 0.0,
            gps_noise_sigma_meters: 6.0,
            seed: trip_count as u64 * 104_729,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
