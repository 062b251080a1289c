//! Cell sequence construction.
//!
//! Turns a trajectory's samples into a gap-free sequence of grid cells:
//!
//! 1. Every sample is mapped to its cell.
//! 2. Runs of consecutive samples in the same cell collapse into one
//!    [`VisitEvent`] carrying the run's first speed and timestamp.
//! 3. Consecutive visits are joined with the grid corridor between their cells.
//!    Interpolated cells inherit the speed and timestamp of the visit the
//!    corridor starts from.
//! 4. When no corridor exists the visit's own cell is emitted alone and the
//!    gap is left as a direct edge.

use log::debug;

use crate::error::{CorridorLookupError, GridError};
use crate::grid::SpatialGridIndex;
use crate::{CellId, Sample};

/// One maximal run of consecutive samples inside the same cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitEvent {
    pub cell: CellId,
    /// Speed of the first sample of the run
    pub speed: f64,
    /// Timestamp of the first sample of the run
    pub timestamp: i64,
}

/// A built cell sequence with per-cell attributes.
///
/// The three vectors always have the same length, and no two consecutive
/// cells are equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSequence {
    pub cells: Vec<CellId>,
    pub speeds: Vec<f64>,
    pub timestamps: Vec<i64>,
    /// Number of visit pairs joined by a direct edge because no corridor existed
    pub corridor_fallbacks: u32,
}

impl CellSequence {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Append a cell unless it repeats the last one.
    fn push(&mut self, cell: CellId, speed: f64, timestamp: i64) {
        if self.cells.last() == Some(&cell) {
            return;
        }
        self.cells.push(cell);
        self.speeds.push(speed);
        self.timestamps.push(timestamp);
    }
}

/// Collapse per-sample cells into visit events.
///
/// `cells` must be aligned 1:1 with `samples`.
pub fn collapse_visits(cells: &[CellId], samples: &[Sample]) -> Vec<VisitEvent> {
    let mut visits: Vec<VisitEvent> = Vec::new();

    for (cell, sample) in cells.iter().zip(samples) {
        if visits.last().map(|v| v.cell) == Some(*cell) {
            continue;
        }
        visits.push(VisitEvent {
            cell: *cell,
            speed: sample.speed,
            timestamp: sample.timestamp,
        });
    }

    visits
}

/// Build the interpolated cell sequence for a trajectory's samples.
///
/// Returns `Ok(None)` when the result is empty (no samples). Corridor
/// unreachability is recovered locally and counted in
/// [`CellSequence::corridor_fallbacks`]; any other grid failure is returned.
pub fn build_cell_sequence<G: SpatialGridIndex + ?Sized>(
    samples: &[Sample],
    resolution: u8,
    grid: &G,
) -> Result<Option<CellSequence>, GridError> {
    let cells = samples
        .iter()
        .map(|sample| grid.cell_for(sample, resolution))
        .collect::<Result<Vec<CellId>, GridError>>()?;

    let visits = collapse_visits(&cells, samples);
    let mut sequence = CellSequence::default();

    for pair in visits.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);

        match grid.corridor(start.cell, end.cell) {
            Ok(path) if !path.is_empty() => {
                // `push` skips the leading cell when it repeats the sequence tail
                for cell in path {
                    sequence.push(cell, start.speed, start.timestamp);
                }
            }
            Ok(_) => {
                sequence.corridor_fallbacks += 1;
                sequence.push(start.cell, start.speed, start.timestamp);
            }
            Err(CorridorLookupError::Unreachable { reason, .. }) => {
                debug!(
                    "[Build] No corridor {} -> {} ({}), using direct edge",
                    start.cell, end.cell, reason
                );
                sequence.corridor_fallbacks += 1;
                sequence.push(start.cell, start.speed, start.timestamp);
            }
            Err(CorridorLookupError::Grid(e)) => return Err(e),
        }
    }

    if let Some(last) = visits.last() {
        sequence.push(last.cell, last.speed, last.timestamp);
    }

    if sequence.is_empty() {
        return Ok(None);
    }

    Ok(Some(sequence))
}
