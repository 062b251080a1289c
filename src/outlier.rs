//! Corpus-wide path length outlier filter.
//!
//! Keeps the records whose planar path length lies between the 5th and 95th
//! percentile of the whole corpus. The thresholds need every record, so this
//! runs once after all trajectories have been processed.

use serde::Serialize;

use crate::CellSequenceRecord;
use crate::error::{Error, Result};

/// Lower percentile of the retained band.
pub const LOWER_PERCENTILE: f64 = 5.0;
/// Upper percentile of the retained band.
pub const UPPER_PERCENTILE: f64 = 95.0;

/// Inclusive path length band computed over a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthBand {
    pub lower: f64,
    pub upper: f64,
}

impl LengthBand {
    pub fn contains(&self, length: f64) -> bool {
        length >= self.lower && length <= self.upper
    }
}

/// Percentile `p` (0-100) of `values`, interpolating linearly between the two
/// closest ranks. Returns `None` for an empty slice.
///
/// # Example
/// ```
/// use hextrail::percentile;
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), Some(3.0));
/// assert_eq!(percentile(&[0.0, 10.0], 5.0), Some(0.5));
/// ```
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Drop records whose path length falls outside the corpus 5th-95th percentile band.
///
/// Order of the retained records is preserved. An empty corpus is an error:
/// the band is undefined.
pub fn filter_by_length(
    corpus: Vec<CellSequenceRecord>,
) -> Result<(Vec<CellSequenceRecord>, LengthBand)> {
    let lengths: Vec<f64> = corpus.iter().map(|r| r.path_length()).collect();

    let (Some(lower), Some(upper)) = (
        percentile(&lengths, LOWER_PERCENTILE),
        percentile(&lengths, UPPER_PERCENTILE),
    ) else {
        return Err(Error::EmptyCorpus);
    };
    let band = LengthBand { lower, upper };

    let retained = corpus
        .into_iter()
        .zip(lengths)
        .filter(|(_, length)| band.contains(*length))
        .map(|(record, _)| record)
        .collect();

    Ok((retained, band))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.5], 5.0), Some(7.5));
        assert_eq!(percentile(&[7.5], 95.0), Some(7.5));
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert_eq!(percentile(&values, 25.0), Some(2.0));
    }

    #[test]
    fn test_percentile_interpolates() {
        // 21 values 0..=20: rank for p95 is 19.0, p5 is 1.0
        let values: Vec<f64> = (0..=20).map(|i| i as f64).collect();
        assert!((percentile(&values, 5.0).unwrap() - 1.0).abs() < 1e-9);
        assert!((percentile(&values, 95.0).unwrap() - 19.0).abs() < 1e-9);

        // 10 values 0..10: p95 rank is 8.55
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let p95 = percentile(&values, 95.0).unwrap();
        assert!((p95 - 8.55).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_band_is_inclusive() {
        let band = LengthBand {
            lower: 1.0,
            upper: 2.0,
        };
        assert!(band.contains(1.0));
        assert!(band.contains(2.0));
        assert!(!band.contains(0.999));
        assert!(!band.contains(2.001));
    }
}
