//! Observation of aggregation runs.
//!
//! The pipeline reports every trajectory as soon as a worker has finished it,
//! then reports the outlier filter once. Reports arrive from rayon worker
//! threads in completion order, not in input order.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::DropReason;
use crate::config::AggregationConfig;
use crate::outlier::LengthBand;
use crate::pipeline::AggregationStats;

/// Result of the per-trajectory stages for one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryOutcome {
    /// A record was produced and goes on to the length filter
    Built,
    Dropped(DropReason),
}

/// One finished trajectory.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryReport<'a> {
    pub trip_id: &'a str,
    pub outcome: TrajectoryOutcome,
    /// Visit pairs joined by a direct edge
    pub corridor_fallbacks: u32,
}

/// Receives reports while [`crate::aggregate`] runs.
///
/// Must be `Send + Sync`: `on_trajectory` is called concurrently.
pub trait AggregationProgress: Send + Sync {
    /// Called once before any trajectory is processed.
    fn on_start(&self, _config: &AggregationConfig, _trajectories: usize) {}

    fn on_trajectory(&self, report: &TrajectoryReport<'_>);

    /// Called once the length band is known. `retained` records survived it.
    fn on_filtered(&self, _band: &LengthBand, _retained: usize) {}
}

/// Ignores every report.
pub struct NoopProgress;

impl AggregationProgress for NoopProgress {
    fn on_trajectory(&self, _report: &TrajectoryReport<'_>) {}
}

/// Lock-free running totals of a run, readable from another thread.
///
/// After the run finishes, [`AtomicProgressTracker::snapshot`] equals the
/// [`AggregationStats`] returned by the pipeline.
#[derive(Debug, Default)]
pub struct AtomicProgressTracker {
    total: AtomicUsize,
    finished: AtomicUsize,
    built: AtomicUsize,
    dropped: [AtomicUsize; 4],
    corridor_fallbacks: AtomicU64,
    trajectories_with_fallbacks: AtomicUsize,
    retained: AtomicUsize,
    filtered: AtomicBool,
}

fn drop_slot(reason: DropReason) -> usize {
    match reason {
        DropReason::EmptySequence => 0,
        DropReason::NonPositiveDuration => 1,
        DropReason::TooShortToSplit => 2,
        DropReason::EmptyPartition => 3,
    }
}

impl AtomicProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trajectories in the current run.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Trajectories reported so far.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::Relaxed)
    }

    /// Whether the length filter has run.
    pub fn is_filtered(&self) -> bool {
        self.filtered.load(Ordering::Acquire)
    }

    /// Counters seen so far. Filter fields stay zero until the filter has run.
    pub fn snapshot(&self) -> AggregationStats {
        let dropped = |reason| self.dropped[drop_slot(reason)].load(Ordering::Relaxed);
        let built = self.built.load(Ordering::Relaxed);
        let (retained, outliers_removed) = if self.is_filtered() {
            let retained = self.retained.load(Ordering::Relaxed);
            (retained, built.saturating_sub(retained))
        } else {
            (0, 0)
        };

        AggregationStats {
            trajectories: self.total(),
            built,
            dropped_empty_sequence: dropped(DropReason::EmptySequence),
            dropped_non_positive_duration: dropped(DropReason::NonPositiveDuration),
            dropped_too_short_to_split: dropped(DropReason::TooShortToSplit),
            dropped_empty_partition: dropped(DropReason::EmptyPartition),
            corridor_fallbacks: self.corridor_fallbacks.load(Ordering::Relaxed),
            trajectories_with_fallbacks: self.trajectories_with_fallbacks.load(Ordering::Relaxed),
            outliers_removed,
            retained,
        }
    }
}

impl AggregationProgress for AtomicProgressTracker {
    fn on_start(&self, _config: &AggregationConfig, trajectories: usize) {
        self.total.store(trajectories, Ordering::Relaxed);
        self.finished.store(0, Ordering::Relaxed);
        self.built.store(0, Ordering::Relaxed);
        for slot in &self.dropped {
            slot.store(0, Ordering::Relaxed);
        }
        self.corridor_fallbacks.store(0, Ordering::Relaxed);
        self.trajectories_with_fallbacks.store(0, Ordering::Relaxed);
        self.retained.store(0, Ordering::Relaxed);
        self.filtered.store(false, Ordering::Release);
    }

    fn on_trajectory(&self, report: &TrajectoryReport<'_>) {
        match report.outcome {
            TrajectoryOutcome::Built => self.built.fetch_add(1, Ordering::Relaxed),
            TrajectoryOutcome::Dropped(reason) => {
                self.dropped[drop_slot(reason)].fetch_add(1, Ordering::Relaxed)
            }
        };
        if report.corridor_fallbacks > 0 {
            self.corridor_fallbacks
                .fetch_add(u64::from(report.corridor_fallbacks), Ordering::Relaxed);
            self.trajectories_with_fallbacks
                .fetch_add(1, Ordering::Relaxed);
        }
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    fn on_filtered(&self, _band: &LengthBand, retained: usize) {
        self.retained.store(retained, Ordering::Relaxed);
        self.filtered.store(true, Ordering::Release);
    }
}
