//! Spatial grid primitive.
//!
//! The aggregation core only needs two operations from a grid: locating the
//! cell that contains a sample, and walking a corridor of adjacent cells
//! between two cells. [`H3Grid`] provides both on top of `h3o`.

use h3o::{CellIndex, LatLng, Resolution};

use crate::error::{CorridorLookupError, GridError};
use crate::{CellId, Sample};

/// A hierarchical grid usable for cell-sequence aggregation.
///
/// Implementations are read-only and shared across worker threads.
pub trait SpatialGridIndex: Send + Sync {
    /// Cell containing the sample's coordinate at `resolution`. Deterministic.
    fn cell_for(&self, sample: &Sample, resolution: u8) -> Result<CellId, GridError>;

    /// Inclusive path of adjacent cells from `from` to `to`.
    ///
    /// Returns [`CorridorLookupError::Unreachable`] when no path exists. The
    /// choice among equally short corridors is up to the implementation.
    fn corridor(&self, from: CellId, to: CellId) -> Result<Vec<CellId>, CorridorLookupError>;
}

/// H3 grid backed by `h3o`.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl H3Grid {
    fn cell_index(cell: CellId) -> Result<CellIndex, GridError> {
        CellIndex::try_from(cell.0).map_err(|_| GridError::InvalidCell(cell.0))
    }
}

impl SpatialGridIndex for H3Grid {
    fn cell_for(&self, sample: &Sample, resolution: u8) -> Result<CellId, GridError> {
        let resolution =
            Resolution::try_from(resolution).map_err(|_| GridError::InvalidResolution(resolution))?;
        let coord = LatLng::new(sample.latitude, sample.longitude).map_err(|_| {
            GridError::InvalidCoordinate {
                latitude: sample.latitude,
                longitude: sample.longitude,
            }
        })?;

        Ok(coord.to_cell(resolution).into())
    }

    fn corridor(&self, from: CellId, to: CellId) -> Result<Vec<CellId>, CorridorLookupError> {
        let start = Self::cell_index(from)?;
        let end = Self::cell_index(to)?;

        let unreachable = |reason: String| CorridorLookupError::Unreachable {
            from: from.0,
            to: to.0,
            reason,
        };

        start
            .grid_path_cells(end)
            .map_err(|e| unreachable(e.to_string()))?
            .map(|cell| cell.map(CellId::from).map_err(|e| unreachable(e.to_string())))
            .collect()
    }
}
