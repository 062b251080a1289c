//! Aggregation pipeline.
//!
//! Runs the per-trajectory stages (cell sequence build, task fields) over every
//! trajectory, in parallel when the `parallel` feature is enabled, then applies
//! the corpus-wide length filter once all results are in.

use log::{debug, info};
use serde::Serialize;

use crate::builder::build_cell_sequence;
use crate::config::AggregationConfig;
use crate::error::{GridError, Result};
use crate::grid::SpatialGridIndex;
use crate::normalize::{RawPoint, normalize_points};
use crate::outlier::{LengthBand, filter_by_length};
use crate::progress::{AggregationProgress, TrajectoryOutcome, TrajectoryReport};
use crate::variant::apply_variant;
use crate::{CellSequenceRecord, DropReason, Trajectory};

/// Summary counters for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Trajectories given to the run
    pub trajectories: usize,
    /// Records that survived the per-trajectory stages
    pub built: usize,
    pub dropped_empty_sequence: usize,
    pub dropped_non_positive_duration: usize,
    pub dropped_too_short_to_split: usize,
    pub dropped_empty_partition: usize,
    /// Visit pairs joined by a direct edge because no corridor existed
    pub corridor_fallbacks: u64,
    /// Trajectories with at least one direct-edge fallback
    pub trajectories_with_fallbacks: usize,
    /// Records removed by the length percentile filter
    pub outliers_removed: usize,
    /// Records in the final corpus
    pub retained: usize,
}

impl AggregationStats {
    fn tally(&mut self, outcome: TrajectoryOutcome, corridor_fallbacks: u32) {
        if corridor_fallbacks > 0 {
            self.corridor_fallbacks += u64::from(corridor_fallbacks);
            self.trajectories_with_fallbacks += 1;
        }
        if let TrajectoryOutcome::Dropped(reason) = outcome {
            match reason {
                DropReason::EmptySequence => self.dropped_empty_sequence += 1,
                DropReason::NonPositiveDuration => self.dropped_non_positive_duration += 1,
                DropReason::TooShortToSplit => self.dropped_too_short_to_split += 1,
                DropReason::EmptyPartition => self.dropped_empty_partition += 1,
            }
        }
    }

    /// Trajectories dropped for `reason`.
    pub fn dropped_by(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::EmptySequence => self.dropped_empty_sequence,
            DropReason::NonPositiveDuration => self.dropped_non_positive_duration,
            DropReason::TooShortToSplit => self.dropped_too_short_to_split,
            DropReason::EmptyPartition => self.dropped_empty_partition,
        }
    }

    /// Trajectories dropped by the per-trajectory stages.
    pub fn dropped(&self) -> usize {
        DropReason::ALL
            .iter()
            .map(|reason| self.dropped_by(*reason))
            .sum()
    }
}

/// Result of an aggregation run.
#[derive(Debug, Clone)]
pub struct AggregationOutput {
    /// Final records, in input order
    pub records: Vec<CellSequenceRecord>,
    pub stats: AggregationStats,
    /// Length band used by the outlier filter
    pub length_band: LengthBand,
}

/// Per-trajectory result before the corpus-wide filter.
struct ProcessedTrajectory {
    result: std::result::Result<CellSequenceRecord, DropReason>,
    corridor_fallbacks: u32,
}

impl ProcessedTrajectory {
    fn outcome(&self) -> TrajectoryOutcome {
        match &self.result {
            Ok(_) => TrajectoryOutcome::Built,
            Err(reason) => TrajectoryOutcome::Dropped(*reason),
        }
    }
}

fn process_trajectory<G: SpatialGridIndex + ?Sized>(
    trajectory: &Trajectory,
    config: &AggregationConfig,
    grid: &G,
) -> std::result::Result<ProcessedTrajectory, GridError> {
    let Some(sequence) = build_cell_sequence(trajectory.samples(), config.resolution, grid)? else {
        return Ok(ProcessedTrajectory {
            result: Err(DropReason::EmptySequence),
            corridor_fallbacks: 0,
        });
    };

    let corridor_fallbacks = sequence.corridor_fallbacks;
    if corridor_fallbacks > 0 {
        debug!(
            "[Aggregate] Trip {}: {} direct-edge fallbacks",
            trajectory.trip_id(),
            corridor_fallbacks
        );
    }

    let result = apply_variant(trajectory, sequence, config.variant);
    if let Err(reason) = &result {
        debug!(
            "[Aggregate] Trip {} dropped: {}",
            trajectory.trip_id(),
            reason.as_str()
        );
    }

    Ok(ProcessedTrajectory {
        result,
        corridor_fallbacks,
    })
}

/// Aggregate trajectories into a filtered corpus of cell sequence records.
///
/// Trajectories are independent and processed in parallel (with the `parallel`
/// feature); the output keeps input order. The length percentile filter runs
/// after every trajectory has been processed.
///
/// Returns [`crate::Error::EmptyCorpus`] when no trajectory survives the
/// per-trajectory stages.
pub fn aggregate<G: SpatialGridIndex + ?Sized>(
    trajectories: &[Trajectory],
    config: &AggregationConfig,
    grid: &G,
    progress: &dyn AggregationProgress,
) -> Result<AggregationOutput> {
    let start = std::time::Instant::now();
    info!(
        "[Aggregate] Building {} sequences for {} at resolution {}",
        trajectories.len(),
        config.variant,
        config.resolution
    );

    progress.on_start(config, trajectories.len());

    let process = |trajectory: &Trajectory| -> std::result::Result<ProcessedTrajectory, GridError> {
        let processed = process_trajectory(trajectory, config, grid)?;
        progress.on_trajectory(&TrajectoryReport {
            trip_id: trajectory.trip_id(),
            outcome: processed.outcome(),
            corridor_fallbacks: processed.corridor_fallbacks,
        });
        Ok(processed)
    };

    #[cfg(feature = "parallel")]
    let processed: Vec<ProcessedTrajectory> = {
        use rayon::prelude::*;
        trajectories
            .par_iter()
            .map(process)
            .collect::<std::result::Result<_, GridError>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let processed: Vec<ProcessedTrajectory> = trajectories
        .iter()
        .map(process)
        .collect::<std::result::Result<_, GridError>>()?;

    let mut stats = AggregationStats {
        trajectories: trajectories.len(),
        ..Default::default()
    };
    let mut corpus = Vec::with_capacity(processed.len());

    for item in processed {
        stats.tally(item.outcome(), item.corridor_fallbacks);
        if let Ok(record) = item.result {
            corpus.push(record);
        }
    }
    stats.built = corpus.len();

    info!(
        "[Aggregate] Built {} records, dropped {}, {} direct-edge fallbacks in {} trajectories ({}ms)",
        stats.built,
        stats.dropped(),
        stats.corridor_fallbacks,
        stats.trajectories_with_fallbacks,
        start.elapsed().as_millis()
    );

    let (records, length_band) = filter_by_length(corpus)?;
    progress.on_filtered(&length_band, records.len());

    stats.retained = records.len();
    stats.outliers_removed = stats.built - stats.retained;

    info!(
        "[Aggregate] Kept {} of {} records with path length in [{:.5}, {:.5}]",
        stats.retained, stats.built, length_band.lower, length_band.upper
    );

    Ok(AggregationOutput {
        records,
        stats,
        length_band,
    })
}

/// Group raw points into trajectories and aggregate them.
pub fn aggregate_points<G: SpatialGridIndex + ?Sized>(
    points: Vec<RawPoint>,
    config: &AggregationConfig,
    grid: &G,
    progress: &dyn AggregationProgress,
) -> Result<AggregationOutput> {
    let trajectories = normalize_points(points);
    aggregate(&trajectories, config, grid, progress)
}
