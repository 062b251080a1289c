//! Task-specific record fields.
//!
//! - Estimation records carry the trip duration, measured on the original
//!   sample timeline.
//! - Prediction records split the cell sequence into an observed prefix
//!   (`h3_sequence_x`) and a suffix to predict (`h3_sequence_y`).
//! - Raw records carry the sequence unchanged.

use crate::builder::CellSequence;
use crate::config::TaskVariant;
use crate::{CellSequenceRecord, DropReason, TaskFields, Trajectory};

/// Fraction of the sequence used as the observed prefix.
pub const PREDICTION_SPLIT_RATIO: f64 = 0.85;

/// Index where the prediction prefix ends, or `None` for sequences too short
/// to split.
///
/// `floor(0.85 * len)`, pulled back by one when it would leave the suffix empty.
pub fn prediction_split_index(len: usize) -> Option<usize> {
    if len < 2 {
        return None;
    }
    let split_idx = (len as f64 * PREDICTION_SPLIT_RATIO).floor() as usize;
    Some(if split_idx == len { len - 1 } else { split_idx })
}

/// Turn a built sequence into a record for `variant`, or say why it is dropped.
pub fn apply_variant(
    trajectory: &Trajectory,
    sequence: CellSequence,
    variant: TaskVariant,
) -> Result<CellSequenceRecord, DropReason> {
    if sequence.is_empty() {
        return Err(DropReason::EmptySequence);
    }

    let CellSequence {
        cells,
        speeds,
        timestamps,
        ..
    } = sequence;

    let task = match variant {
        TaskVariant::Raw => TaskFields::Raw { h3_sequence: cells },
        TaskVariant::Estimation => {
            let duration = trajectory.duration_seconds();
            if duration <= 0.0 {
                return Err(DropReason::NonPositiveDuration);
            }
            TaskFields::Estimation {
                h3_sequence: cells,
                duration,
            }
        }
        TaskVariant::Prediction => {
            let split_idx =
                prediction_split_index(cells.len()).ok_or(DropReason::TooShortToSplit)?;
            let mut h3_sequence_x = cells;
            let h3_sequence_y = h3_sequence_x.split_off(split_idx);
            if h3_sequence_x.is_empty() || h3_sequence_y.is_empty() {
                return Err(DropReason::EmptyPartition);
            }
            TaskFields::Prediction {
                h3_sequence_x,
                h3_sequence_y,
            }
        }
    };

    Ok(CellSequenceRecord {
        trip_id: trajectory.trip_id().to_string(),
        task,
        avg_speed_per_hex: speeds,
        timestamp_per_hex: timestamps,
        attributes: trajectory.attributes().clone(),
        geometry: trajectory.geometry().clone(),
    })
}
