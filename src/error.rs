//! Unified error handling for hextrail.
//!
//! Fatal conditions (bad configuration, an empty corpus, grid failures that are
//! not plain unreachability) surface as [`Error`]. Per-trajectory drops are not
//! errors; see [`crate::DropReason`].

use thiserror::Error;

use crate::TaskVariant;

/// Errors raised by the spatial grid that are unrelated to corridor reachability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("invalid coordinate (lat {latitude}, lng {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid grid resolution {0}")]
    InvalidResolution(u8),

    #[error("invalid cell id {0:#x}")]
    InvalidCell(u64),
}

/// Failure of a corridor lookup between two cells.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorridorLookupError {
    /// No path exists between the cells at their resolution. Recoverable.
    #[error("no corridor from {from:x} to {to:x}: {reason}")]
    Unreachable { from: u64, to: u64, reason: String },

    /// The lookup itself could not run.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Main error type for hextrail operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("resolution is required for the {variant} variant")]
    MissingResolution { variant: TaskVariant },

    #[error("unknown task variant '{0}' (expected TTE, HMP or all)")]
    UnknownVariant(String),

    #[error("resolution {0} is out of range (0..=15)")]
    InvalidResolution(u8),

    #[error("corpus is empty after per-trajectory filtering; length percentiles are undefined")]
    EmptyCorpus,

    #[error("test fraction {0} must lie within [0, 1]")]
    InvalidSplitFraction(f64),

    #[error("trajectory '{trip_id}' has {sample_count} samples, need at least {minimum_required}")]
    InsufficientSamples {
        trip_id: String,
        sample_count: usize,
        minimum_required: usize,
    },

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for hextrail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for converting Options into hextrail errors.
pub trait OptionExt<T> {
    /// Convert `None` into [`Error::InsufficientSamples`].
    fn ok_or_insufficient_samples(
        self,
        trip_id: &str,
        sample_count: usize,
        minimum_required: usize,
    ) -> Result<T>;

    /// Convert `None` into [`Error::MissingResolution`].
    fn ok_or_missing_resolution(self, variant: TaskVariant) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_samples(
        self,
        trip_id: &str,
        sample_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| Error::InsufficientSamples {
            trip_id: trip_id.to_string(),
            sample_count,
            minimum_required,
        })
    }

    fn ok_or_missing_resolution(self, variant: TaskVariant) -> Result<T> {
        self.ok_or(Error::MissingResolution { variant })
    }
}
