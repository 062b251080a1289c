//! # hextrail
//!
//! Aggregates GPS trajectories into sequences of H3 cells, ready to use as
//! training pairs for travel-time estimation and human mobility prediction.
//!
//! This library provides:
//! - Grouping of raw point rows into time-ordered trajectories
//! - Mapping of samples to grid cells with visit collapsing
//! - Corridor interpolation between non-adjacent cells with forward-filled speed/time
//! - Task-specific record fields (trip duration, or prefix/suffix split)
//! - Corpus-wide path length outlier filtering
//! - Seeded train/test splitting
//!
//! ## Features
//!
//! - **`parallel`** - Process trajectories in parallel with rayon (default)
//! - **`synthetic`** - Seeded synthetic taxi trajectory generator
//! - **`cli`** - Build the `hextrail-cli` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use hextrail::{aggregate, AggregationConfig, H3Grid, NoopProgress, Sample, TaskVariant, Trajectory};
//!
//! let samples: Vec<Sample> = (0..20)
//!     .map(|i| Sample::new(-8.61 + i as f64 * 0.001, 41.14, 8.0, 1_372_636_800 + i * 15))
//!     .collect();
//! let trajectory = Trajectory::new("trip-1", samples, Default::default()).unwrap();
//!
//! let config = AggregationConfig::new(TaskVariant::Estimation, Some(9)).unwrap();
//! let output = aggregate(&[trajectory], &config, &H3Grid, &NoopProgress).unwrap();
//!
//! assert_eq!(output.records.len(), 1);
//! assert_eq!(output.records[0].duration(), Some(285.0));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use geo::{Coord, EuclideanLength, LineString};
use serde::{Deserialize, Serialize, Serializer};

// Unified error handling
pub mod error;
pub use error::{CorridorLookupError, Error, GridError, OptionExt, Result};

// Task variants and aggregation configuration
pub mod config;
pub use config::{AggregationConfig, DEFAULT_RESOLUTION, TaskVariant};

// Spatial grid primitive (cell lookup, corridors)
pub mod grid;
pub use grid::{H3Grid, SpatialGridIndex};

// Raw point rows -> trajectories
pub mod normalize;
pub use normalize::{RawPoint, normalize_points};

// Trajectory -> cell sequence
pub mod builder;
pub use builder::{CellSequence, VisitEvent, build_cell_sequence, collapse_visits};

// Cell sequence -> task record
pub mod variant;
pub use variant::{PREDICTION_SPLIT_RATIO, apply_variant, prediction_split_index};

// Corpus-wide length percentile filter
pub mod outlier;
pub use outlier::{LengthBand, filter_by_length, percentile};

// Run observers
pub mod progress;
pub use progress::{
    AggregationProgress, AtomicProgressTracker, NoopProgress, TrajectoryOutcome, TrajectoryReport,
};

// Orchestration
pub mod pipeline;
pub use pipeline::{AggregationOutput, AggregationStats, aggregate, aggregate_points};

// Named dataset splits
pub mod splits;
pub use splits::{DatasetSplits, TEST_SPLIT, TRAIN_SPLIT, train_test_split};

// Synthetic data generation for benchmarks and tests
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A single GPS observation along a trajectory.
///
/// # Example
/// ```
/// use hextrail::Sample;
/// let sample = Sample::new(-8.6109, 41.1496, 12.5, 1_372_636_858); // Porto
/// assert!(sample.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub longitude: f64,
    pub latitude: f64,
    /// Speed at this sample (dataset units, km/h for the Porto taxi data)
    pub speed: f64,
    /// Unix timestamp (seconds since epoch)
    pub timestamp: i64,
}

impl Sample {
    pub fn new(longitude: f64, latitude: f64, speed: f64, timestamp: i64) -> Self {
        Self {
            longitude,
            latitude,
            speed,
            timestamp,
        }
    }

    /// Check if the sample has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    pub fn coord(&self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// A time-ordered trip with its categorical attributes and path geometry.
#[derive(Debug, Clone)]
pub struct Trajectory {
    trip_id: String,
    samples: Vec<Sample>,
    attributes: BTreeMap<String, String>,
    geometry: LineString,
}

impl Trajectory {
    /// Build a trajectory from samples that are already ordered by timestamp.
    ///
    /// The path geometry is the polyline through the sample coordinates.
    /// Returns an error if there are no samples.
    pub fn new(
        trip_id: impl Into<String>,
        samples: Vec<Sample>,
        attributes: BTreeMap<String, String>,
    ) -> Result<Self> {
        let trip_id = trip_id.into();
        samples
            .first()
            .ok_or_insufficient_samples(&trip_id, samples.len(), 1)?;

        let geometry: LineString = samples.iter().map(Sample::coord).collect();

        Ok(Self {
            trip_id,
            samples,
            attributes,
            geometry,
        })
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn geometry(&self) -> &LineString {
        &self.geometry
    }

    /// Seconds between the first and the last sample.
    ///
    /// Computed in `i128`, so extreme timestamps cannot overflow.
    pub fn duration_seconds(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                (i128::from(last.timestamp) - i128::from(first.timestamp)) as f64
            }
            _ => 0.0,
        }
    }
}

/// Opaque identifier of a grid cell.
///
/// Displays (and serializes) as the lowercase hexadecimal H3 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<h3o::CellIndex> for CellId {
    fn from(cell: h3o::CellIndex) -> Self {
        CellId(u64::from(cell))
    }
}

/// Why a trajectory produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The built cell sequence was empty
    EmptySequence,
    /// Last timestamp is not after the first one
    NonPositiveDuration,
    /// Fewer than two cells, nothing to split
    TooShortToSplit,
    /// One side of the prediction split came out empty
    EmptyPartition,
}

impl DropReason {
    pub const ALL: [DropReason; 4] = [
        DropReason::EmptySequence,
        DropReason::NonPositiveDuration,
        DropReason::TooShortToSplit,
        DropReason::EmptyPartition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::EmptySequence => "empty_sequence",
            DropReason::NonPositiveDuration => "non_positive_duration",
            DropReason::TooShortToSplit => "too_short_to_split",
            DropReason::EmptyPartition => "empty_partition",
        }
    }
}

/// Task-specific fields carried by a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskFields {
    Raw {
        h3_sequence: Vec<CellId>,
    },
    Estimation {
        h3_sequence: Vec<CellId>,
        /// Trip duration in seconds, always > 0
        duration: f64,
    },
    Prediction {
        /// Observed prefix
        h3_sequence_x: Vec<CellId>,
        /// Suffix to predict
        h3_sequence_y: Vec<CellId>,
    },
}

/// One trajectory expressed as a sequence of grid cells.
///
/// `avg_speed_per_hex` and `timestamp_per_hex` are aligned with the full cell
/// sequence (for prediction records, with `h3_sequence_x` followed by
/// `h3_sequence_y`).
#[derive(Debug, Clone, Serialize)]
pub struct CellSequenceRecord {
    pub trip_id: String,
    #[serde(flatten)]
    pub task: TaskFields,
    pub avg_speed_per_hex: Vec<f64>,
    pub timestamp_per_hex: Vec<i64>,
    pub attributes: BTreeMap<String, String>,
    pub geometry: LineString,
}

impl CellSequenceRecord {
    /// The unified cell sequence, absent for prediction records.
    pub fn h3_sequence(&self) -> Option<&[CellId]> {
        match &self.task {
            TaskFields::Raw { h3_sequence } | TaskFields::Estimation { h3_sequence, .. } => {
                Some(h3_sequence)
            }
            TaskFields::Prediction { .. } => None,
        }
    }

    /// All cells in order, rejoining the prediction split if needed.
    pub fn cells(&self) -> Vec<CellId> {
        match &self.task {
            TaskFields::Raw { h3_sequence } | TaskFields::Estimation { h3_sequence, .. } => {
                h3_sequence.clone()
            }
            TaskFields::Prediction {
                h3_sequence_x,
                h3_sequence_y,
            } => h3_sequence_x
                .iter()
                .chain(h3_sequence_y.iter())
                .copied()
                .collect(),
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self.task {
            TaskFields::Estimation { duration, .. } => Some(duration),
            _ => None,
        }
    }

    /// Planar length of the path geometry, in coordinate units (degrees).
    pub fn path_length(&self) -> f64 {
        self.geometry.euclidean_length()
    }
}
